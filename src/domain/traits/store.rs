use crate::application::errors::StorageError;
use crate::domain::entities::GuildSettings;

/// Read access to guild settings
pub trait SettingsReader: Send + Sync {
    /// Settings of a guild; an unknown guild yields empty settings
    fn guild_settings(&self, guild_id: &str) -> Result<GuildSettings, StorageError>;
}

/// Write access to guild settings
pub trait SettingsWriter: Send + Sync {
    fn set_setting(&self, guild_id: &str, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Identifies what a watermark tracks
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WatermarkKey {
    pub region: String,
    pub server: String,
    /// `None` for a server-wide watermark
    pub entity: Option<String>,
}

impl WatermarkKey {
    pub fn member(region: impl Into<String>, server: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            server: server.into(),
            entity: Some(name.into()),
        }
    }

    pub fn server(region: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            server: server.into(),
            entity: None,
        }
    }
}

/// Last processed timestamp per tracked entity. Values only move forward.
pub trait WatermarkStore: Send + Sync {
    fn get(&self, key: &WatermarkKey) -> Result<Option<i64>, StorageError>;

    /// Store `timestamp` if it is newer than the current value, as one atomic
    /// step per key. Returns whether the watermark moved.
    fn advance(&self, key: &WatermarkKey, timestamp: i64) -> Result<bool, StorageError>;
}
