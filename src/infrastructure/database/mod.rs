//! SQLite persistence for guild settings and watermarks

use rusqlite::{Connection, OptionalExtension, Result as SqliteResult};
use std::path::Path;
use std::sync::Mutex;

use crate::application::errors::StorageError;
use crate::domain::entities::GuildSettings;
use crate::domain::traits::{SettingsReader, SettingsWriter, WatermarkKey, WatermarkStore};

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        init_tables(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }
}

fn init_tables(conn: &Connection) -> SqliteResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS guild_settings (
            guild_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (guild_id, key)
        )",
        [],
    )?;

    // An empty entity is the server-wide watermark
    conn.execute(
        "CREATE TABLE IF NOT EXISTS watermarks (
            region TEXT NOT NULL,
            server TEXT NOT NULL,
            entity TEXT NOT NULL DEFAULT '',
            last_modified INTEGER NOT NULL,
            PRIMARY KEY (region, server, entity)
        )",
        [],
    )?;

    Ok(())
}

impl SettingsReader for Database {
    fn guild_settings(&self, guild_id: &str) -> Result<GuildSettings, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM guild_settings WHERE guild_id = ?1")?;
        let rows = stmt.query_map([guild_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut settings = GuildSettings::new(guild_id);
        for row in rows {
            let (key, value) = row?;
            settings.insert(key, value);
        }
        Ok(settings)
    }
}

impl SettingsWriter for Database {
    fn set_setting(&self, guild_id: &str, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn()?.execute(
            "INSERT OR REPLACE INTO guild_settings (guild_id, key, value, updated_at)
             VALUES (?1, ?2, ?3, datetime('now'))",
            rusqlite::params![guild_id, key, value],
        )?;
        Ok(())
    }
}

impl WatermarkStore for Database {
    fn get(&self, key: &WatermarkKey) -> Result<Option<i64>, StorageError> {
        let value = self
            .conn()?
            .query_row(
                "SELECT last_modified FROM watermarks WHERE region = ?1 AND server = ?2 AND entity = ?3",
                rusqlite::params![key.region, key.server, key.entity.as_deref().unwrap_or("")],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn advance(&self, key: &WatermarkKey, timestamp: i64) -> Result<bool, StorageError> {
        let rows = self.conn()?.execute(
            "INSERT INTO watermarks (region, server, entity, last_modified) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (region, server, entity) DO UPDATE SET last_modified = excluded.last_modified
             WHERE excluded.last_modified > watermarks.last_modified",
            rusqlite::params![key.region, key.server, key.entity.as_deref().unwrap_or(""), timestamp],
        )?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_roundtrip() {
        let db = Database::in_memory().unwrap();
        db.set_setting("g1", "wow_server_name", "Archimonde").unwrap();
        db.set_setting("g1", "region_name", "eu").unwrap();
        db.set_setting("g1", "region_name", "us").unwrap();
        db.set_setting("g2", "guild_name", "Other").unwrap();

        let settings = db.guild_settings("g1").unwrap();
        assert_eq!(settings.server_name(), Some("Archimonde"));
        assert_eq!(settings.region(), Some("us"));
        assert_eq!(settings.guild_name(), None);
    }

    #[test]
    fn test_unknown_guild_has_empty_settings() {
        let db = Database::in_memory().unwrap();
        let settings = db.guild_settings("nobody").unwrap();
        assert_eq!(settings.guild_id, "nobody");
        assert_eq!(settings.server_name(), None);
    }

    #[test]
    fn test_watermarks_keyed_by_granularity() {
        let db = Database::in_memory().unwrap();
        let member = WatermarkKey::member("us", "Archimonde", "Arthas");
        let server = WatermarkKey::server("us", "Archimonde");

        assert_eq!(db.get(&member).unwrap(), None);
        assert!(db.advance(&member, 1_500_000).unwrap());
        assert!(db.advance(&server, 42).unwrap());
        assert!(db.advance(&member, 1_600_000).unwrap());

        assert_eq!(db.get(&member).unwrap(), Some(1_600_000));
        assert_eq!(db.get(&server).unwrap(), Some(42));
    }

    #[test]
    fn test_watermark_never_moves_back() {
        let db = Database::in_memory().unwrap();
        let key = WatermarkKey::member("us", "Archimonde", "Arthas");

        assert!(db.advance(&key, 100).unwrap());
        assert!(!db.advance(&key, 100).unwrap());
        assert!(!db.advance(&key, 50).unwrap());
        assert_eq!(db.get(&key).unwrap(), Some(100));
    }

    #[test]
    fn test_file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bot.db");
        let key = WatermarkKey::member("eu", "Ysondre", "Jaina");

        Database::new(&path).unwrap().advance(&key, 7).unwrap();
        assert_eq!(Database::new(&path).unwrap().get(&key).unwrap(), Some(7));
    }
}
