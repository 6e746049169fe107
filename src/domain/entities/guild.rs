use std::collections::HashMap;

pub const SERVER_NAME_KEY: &str = "wow_server_name";
pub const REGION_KEY: &str = "region_name";
pub const GUILD_NAME_KEY: &str = "guild_name";

/// Per-guild configuration as stored by the settings collaborator.
///
/// Every field is optional: a guild that never ran `setserversetting` simply
/// has an empty map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuildSettings {
    pub guild_id: String,
    values: HashMap<String, String>,
}

impl GuildSettings {
    pub fn new(guild_id: impl Into<String>) -> Self {
        Self {
            guild_id: guild_id.into(),
            values: HashMap::new(),
        }
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn setting(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn server_name(&self) -> Option<&str> {
        self.setting(SERVER_NAME_KEY)
    }

    pub fn region(&self) -> Option<&str> {
        self.setting(REGION_KEY)
    }

    pub fn guild_name(&self) -> Option<&str> {
        self.setting(GUILD_NAME_KEY)
    }
}
