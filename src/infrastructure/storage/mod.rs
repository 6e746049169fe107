//! In-memory stores, used by the console transport and tests

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::application::errors::StorageError;
use crate::domain::entities::GuildSettings;
use crate::domain::traits::{SettingsReader, SettingsWriter, WatermarkKey, WatermarkStore};

#[derive(Default)]
pub struct MemorySettings {
    guilds: RwLock<HashMap<String, GuildSettings>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_guild(self, settings: GuildSettings) -> Self {
        self.guilds
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(settings.guild_id.clone(), settings);
        self
    }
}

impl SettingsReader for MemorySettings {
    fn guild_settings(&self, guild_id: &str) -> Result<GuildSettings, StorageError> {
        let guilds = self.guilds.read().unwrap_or_else(PoisonError::into_inner);
        Ok(guilds
            .get(guild_id)
            .cloned()
            .unwrap_or_else(|| GuildSettings::new(guild_id)))
    }
}

impl SettingsWriter for MemorySettings {
    fn set_setting(&self, guild_id: &str, key: &str, value: &str) -> Result<(), StorageError> {
        self.guilds
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(guild_id.to_string())
            .or_insert_with(|| GuildSettings::new(guild_id))
            .insert(key, value);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryWatermarks {
    marks: RwLock<HashMap<WatermarkKey, i64>>,
}

impl MemoryWatermarks {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WatermarkStore for MemoryWatermarks {
    fn get(&self, key: &WatermarkKey) -> Result<Option<i64>, StorageError> {
        Ok(self.marks.read().unwrap_or_else(PoisonError::into_inner).get(key).copied())
    }

    fn advance(&self, key: &WatermarkKey, timestamp: i64) -> Result<bool, StorageError> {
        let mut marks = self.marks.write().unwrap_or_else(PoisonError::into_inner);
        match marks.get(key) {
            Some(&current) if current >= timestamp => Ok(false),
            _ => {
                marks.insert(key.clone(), timestamp);
                Ok(true)
            }
        }
    }
}
