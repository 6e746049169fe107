//! Configuration management

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::application::errors::ConfigError;
use crate::application::services::PollerConfig;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub plugins: PluginConfig,
    pub database: DatabaseConfig,
    pub battlenet: BattleNetConfig,
    pub wowprogress: WowProgressConfig,
    pub legendary: LegendaryConfig,
    pub invasion: InvasionConfig,
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
    /// Member id allowed to run owner-only commands
    pub owner_id: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "legendary-bot".to_string(),
            prefix: "!".to_string(),
            owner_id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PluginConfig {
    pub directory: PathBuf,
    /// Discover plugins from manifests instead of the built-in registry
    pub use_manifests: bool,
    /// Registry entries to load when not using manifests; empty means all
    pub enabled: Vec<String>,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./plugins"),
            use_manifests: false,
            enabled: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/legendary-bot.db"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BattleNetConfig {
    pub api_key: Option<String>,
    pub host_suffix: String,
    pub locale: String,
}

impl Default for BattleNetConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            host_suffix: "api.battle.net".to_string(),
            locale: "en_US".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct WowProgressConfig {
    pub base_url: String,
}

impl Default for WowProgressConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.wowprogress.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LegendaryConfig {
    pub initial_delay_secs: u64,
    /// Added to the initial delay of each further guild
    pub stagger_secs: u64,
    pub period_secs: u64,
    pub tracked_level: u32,
    pub ignored_items: Vec<u64>,
    /// Guild setting holding the announcement channel name
    pub channel_setting: String,
}

impl Default for LegendaryConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: 0,
            stagger_secs: 60,
            period_secs: 1200,
            tracked_level: 110,
            ignored_items: vec![147451, 151462, 152626, 154880],
            channel_setting: "legendary_channel".to_string(),
        }
    }
}

impl LegendaryConfig {
    /// Poller tuning for the `index`-th guild
    pub fn poller_config(&self, index: usize) -> PollerConfig {
        let stagger = self.stagger_secs.saturating_mul(index as u64);
        PollerConfig {
            initial_delay: Duration::from_secs(self.initial_delay_secs.saturating_add(stagger)),
            period: Duration::from_secs(self.period_secs),
            tracked_level: self.tracked_level,
            ignored_items: self.ignored_items.clone(),
            channel_setting: self.channel_setting.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct InvasionConfig {
    pub anchor: DateTime<Utc>,
    pub on_minutes: i64,
    pub off_minutes: i64,
    /// IANA zone the boundary times are displayed in
    pub display_timezone: String,
}

impl Default for InvasionConfig {
    fn default() -> Self {
        Self {
            anchor: Utc
                .with_ymd_and_hms(2017, 4, 14, 21, 0, 0)
                .single()
                .unwrap_or_default(),
            on_minutes: 360,
            off_minutes: 750,
            display_timezone: "America/Montreal".to_string(),
        }
    }
}

/// Identities the console transport speaks as
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConsoleConfig {
    pub guild_id: String,
    pub channel: String,
    pub user_id: String,
    pub admin: bool,
    /// Text channels the console guild pretends to have
    pub channels: Vec<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            guild_id: "console".to_string(),
            channel: "general".to_string(),
            user_id: "console-user".to_string(),
            admin: true,
            channels: vec!["general".to_string(), "legendary".to_string()],
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Environment variables win over file values
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("BATTLENET_KEY") {
            self.battlenet.api_key = Some(key);
        }

        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }

        if let Ok(owner) = std::env::var("BOT_OWNER") {
            self.bot.owner_id = Some(owner);
        }

        if let Ok(path) = std::env::var("DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefix.is_empty() {
            return Err(ConfigError::InvalidValue("bot.prefix must not be empty".to_string()));
        }
        if self.legendary.period_secs == 0 {
            return Err(ConfigError::InvalidValue("legendary.period-secs must be positive".to_string()));
        }
        if self.invasion.on_minutes <= 0 || self.invasion.off_minutes <= 0 {
            return Err(ConfigError::InvalidValue(
                "invasion durations must be positive".to_string(),
            ));
        }
        if self.invasion.display_timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(ConfigError::InvalidValue(format!(
                "invasion.display-timezone: unknown zone '{}'",
                self.invasion.display_timezone
            )));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
