//! Shared fakes for the integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use legendary_bot::application::errors::{BotError, RemoteFetchError};
use legendary_bot::application::services::{ItemCache, PollerDeps};
use legendary_bot::domain::entities::guild::{GUILD_NAME_KEY, REGION_KEY, SERVER_NAME_KEY};
use legendary_bot::domain::entities::{
    CharacterFeed, CommandTable, FeedEvent, GuildRank, GuildSettings, ItemInfo, Roster, RosterMember,
};
use legendary_bot::domain::traits::{Bot, BotInfo, Diagnostics, GameApi, RankApi};
use legendary_bot::infrastructure::config::Config;
use legendary_bot::infrastructure::storage::{MemorySettings, MemoryWatermarks};
use legendary_bot::plugins::Services;

pub const CHANNEL_SETTING: &str = "legendary_channel";

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

/// Game API serving canned data and counting calls
#[derive(Default)]
pub struct FakeGameApi {
    roster: Mutex<Option<Roster>>,
    roster_error: Mutex<bool>,
    feeds: Mutex<HashMap<String, CharacterFeed>>,
    failing_feeds: Mutex<Vec<String>>,
    items: Mutex<HashMap<u64, ItemInfo>>,
    cancel_on_feed: Mutex<Option<(String, CancellationToken)>>,
    cancel_on_item: Mutex<Option<(u64, CancellationToken)>>,
    pub roster_calls: AtomicUsize,
    pub feed_calls: AtomicUsize,
    pub item_calls: AtomicUsize,
}

impl FakeGameApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(self, name: &str, level: u32) -> Self {
        self.roster
            .lock()
            .unwrap()
            .get_or_insert_with(Roster::default)
            .members
            .push(RosterMember {
                name: name.to_string(),
                realm: "Archimonde".to_string(),
                level,
            });
        self
    }

    pub fn with_item(self, id: u64, name: &str, quality: u32) -> Self {
        self.items.lock().unwrap().insert(
            id,
            ItemInfo {
                id,
                name: name.to_string(),
                quality,
            },
        );
        self
    }

    pub fn failing_roster(self) -> Self {
        *self.roster_error.lock().unwrap() = true;
        self
    }

    pub fn failing_feed(self, name: &str) -> Self {
        self.failing_feeds.lock().unwrap().push(name.to_string());
        self
    }

    /// Cancel `token` while the named member's feed is being fetched
    pub fn cancel_on_feed(self, name: &str, token: CancellationToken) -> Self {
        *self.cancel_on_feed.lock().unwrap() = Some((name.to_string(), token));
        self
    }

    /// Cancel `token` while the given item is being looked up
    pub fn cancel_on_item(self, item_id: u64, token: CancellationToken) -> Self {
        *self.cancel_on_item.lock().unwrap() = Some((item_id, token));
        self
    }

    /// Replace a member's feed with `(item id, timestamp)` loot events
    pub fn set_feed(&self, name: &str, last_modified: i64, loot: &[(u64, i64)]) {
        let feed = loot
            .iter()
            .map(|&(item_id, timestamp)| FeedEvent {
                kind: "LOOT".to_string(),
                item_id: Some(item_id),
                timestamp,
            })
            .collect();
        self.feeds.lock().unwrap().insert(
            name.to_string(),
            CharacterFeed {
                last_modified,
                feed,
            },
        );
    }

    pub fn push_event(&self, name: &str, event: FeedEvent) {
        if let Some(feed) = self.feeds.lock().unwrap().get_mut(name) {
            feed.feed.push(event);
        }
    }

    pub fn roster_calls(&self) -> usize {
        self.roster_calls.load(Ordering::SeqCst)
    }

    pub fn feed_calls(&self) -> usize {
        self.feed_calls.load(Ordering::SeqCst)
    }

    pub fn item_calls(&self) -> usize {
        self.item_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GameApi for FakeGameApi {
    async fn guild_roster(
        &self,
        _region: &str,
        _server: &str,
        _guild: &str,
    ) -> Result<Option<Roster>, RemoteFetchError> {
        self.roster_calls.fetch_add(1, Ordering::SeqCst);
        if *self.roster_error.lock().unwrap() {
            return Err(RemoteFetchError::Status(503));
        }
        Ok(self.roster.lock().unwrap().clone())
    }

    async fn character_feed(
        &self,
        _region: &str,
        _realm: &str,
        name: &str,
    ) -> Result<Option<CharacterFeed>, RemoteFetchError> {
        self.feed_calls.fetch_add(1, Ordering::SeqCst);
        if let Some((target, token)) = self.cancel_on_feed.lock().unwrap().as_ref() {
            if target == name {
                token.cancel();
            }
        }
        if self.failing_feeds.lock().unwrap().iter().any(|n| n == name) {
            return Err(RemoteFetchError::Request("connection reset".to_string()));
        }
        Ok(self.feeds.lock().unwrap().get(name).cloned())
    }

    async fn item(&self, _region: &str, item_id: u64) -> Result<Option<ItemInfo>, RemoteFetchError> {
        self.item_calls.fetch_add(1, Ordering::SeqCst);
        if let Some((target, token)) = self.cancel_on_item.lock().unwrap().as_ref() {
            if *target == item_id {
                token.cancel();
            }
        }
        Ok(self.items.lock().unwrap().get(&item_id).cloned())
    }
}

/// Rank source with a single fixed answer
pub struct FakeRanks(pub Option<GuildRank>);

#[async_trait]
impl RankApi for FakeRanks {
    async fn guild_rank(
        &self,
        _region: &str,
        _server: &str,
        _guild: &str,
    ) -> Result<Option<GuildRank>, RemoteFetchError> {
        Ok(self.0.clone())
    }
}

/// Transport recording every outbound message
#[derive(Default)]
pub struct RecordingBot {
    guilds: Vec<String>,
    channels: HashMap<(String, String), String>,
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingBot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_guild(mut self, guild_id: &str) -> Self {
        self.guilds.push(guild_id.to_string());
        self
    }

    pub fn with_channel(mut self, guild_id: &str, name: &str, channel_id: &str) -> Self {
        self.channels
            .insert((guild_id.to_string(), name.to_lowercase()), channel_id.to_string());
        self
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, text)| text).collect()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<(), BotError> {
        self.sent
            .lock()
            .unwrap()
            .push((channel_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn find_text_channel(&self, guild_id: &str, name: &str) -> Option<String> {
        self.channels
            .get(&(guild_id.to_string(), name.to_lowercase()))
            .cloned()
    }

    fn guilds(&self) -> Vec<String> {
        self.guilds.clone()
    }

    fn bot_info(&self) -> BotInfo {
        BotInfo {
            id: "test-bot".to_string(),
            name: "Test Bot".to_string(),
        }
    }
}

/// Diagnostics sink keeping the rendered errors
#[derive(Default)]
pub struct RecordingDiagnostics {
    reports: Mutex<Vec<String>>,
}

impl RecordingDiagnostics {
    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().unwrap().clone()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&self, error: &(dyn std::error::Error + 'static), _context: &[(&str, String)]) {
        self.reports.lock().unwrap().push(error.to_string());
    }
}

/// Settings of a guild with every field the poller needs
pub fn configured_guild(guild_id: &str, channel: &str) -> GuildSettings {
    GuildSettings::new(guild_id)
        .with_setting(SERVER_NAME_KEY, "Archimonde")
        .with_setting(REGION_KEY, "us")
        .with_setting(GUILD_NAME_KEY, "Exodus")
        .with_setting(CHANNEL_SETTING, channel)
}

pub struct Harness {
    pub api: Arc<FakeGameApi>,
    pub bot: Arc<RecordingBot>,
    pub settings: Arc<MemorySettings>,
    pub watermarks: Arc<MemoryWatermarks>,
    pub diagnostics: Arc<RecordingDiagnostics>,
    pub items: Arc<ItemCache>,
}

impl Harness {
    pub fn new(api: FakeGameApi, bot: RecordingBot, settings: MemorySettings) -> Self {
        init_tracing();
        let api = Arc::new(api);
        Self {
            items: Arc::new(ItemCache::for_api(api.clone())),
            api,
            bot: Arc::new(bot),
            settings: Arc::new(settings),
            watermarks: Arc::new(MemoryWatermarks::new()),
            diagnostics: Arc::new(RecordingDiagnostics::default()),
        }
    }

    pub fn poller_deps(&self) -> PollerDeps {
        PollerDeps {
            bot: self.bot.clone(),
            settings: self.settings.clone(),
            api: self.api.clone(),
            watermarks: self.watermarks.clone(),
            items: self.items.clone(),
            diagnostics: self.diagnostics.clone(),
        }
    }

    pub fn services(&self, commands: Arc<CommandTable>, config: Config) -> Services {
        Services {
            commands,
            bot: self.bot.clone(),
            settings: self.settings.clone(),
            api: self.api.clone(),
            ranks: Arc::new(FakeRanks(None)),
            watermarks: self.watermarks.clone(),
            items: self.items.clone(),
            diagnostics: self.diagnostics.clone(),
            config: Arc::new(config),
        }
    }
}
