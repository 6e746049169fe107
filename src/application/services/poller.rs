//! Per-guild legendary loot poller
//!
//! One [`GuildPoller`] runs per monitored guild on its own task. Each tick
//! walks the guild roster, compares every tracked member's feed against the
//! stored watermark and announces newly looted legendaries in the guild's
//! configured channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::application::errors::PollerError;
use crate::application::services::cache::ItemCache;
use crate::domain::entities::game::LOOT_EVENT;
use crate::domain::entities::{GuildSettings, ItemKey, RosterMember};
use crate::domain::traits::{
    Bot, Diagnostics, GameApi, SettingsReader, WatermarkKey, WatermarkStore,
};

/// Tuning of a poller
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay before the first tick
    pub initial_delay: Duration,
    /// Delay between tick starts
    pub period: Duration,
    /// Only members at this level are checked
    pub tracked_level: u32,
    /// Items never announced
    pub ignored_items: Vec<u64>,
    /// Guild setting naming the announcement channel
    pub channel_setting: String,
}

/// Collaborators a poller talks to
#[derive(Clone)]
pub struct PollerDeps {
    pub bot: Arc<dyn Bot>,
    pub settings: Arc<dyn SettingsReader>,
    pub api: Arc<dyn GameApi>,
    pub watermarks: Arc<dyn WatermarkStore>,
    pub items: Arc<ItemCache>,
    pub diagnostics: Arc<dyn Diagnostics>,
}

/// Summary of one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub roster_found: bool,
    pub members_checked: usize,
    pub members_updated: usize,
    pub notifications: usize,
    /// Shutdown was observed before the roster was exhausted
    pub cancelled: bool,
}

/// Resolved guild configuration needed for a tick
struct GuildTarget<'a> {
    server: &'a str,
    region: &'a str,
    guild_name: &'a str,
    channel: &'a str,
}

impl<'a> GuildTarget<'a> {
    fn resolve(settings: &'a GuildSettings, channel_setting: &str) -> Result<Self, PollerError> {
        Ok(Self {
            server: settings
                .server_name()
                .ok_or(PollerError::ConfigurationIncomplete("server name"))?,
            region: settings
                .region()
                .ok_or(PollerError::ConfigurationIncomplete("region"))?,
            guild_name: settings
                .guild_name()
                .ok_or(PollerError::ConfigurationIncomplete("guild name"))?,
            channel: settings
                .setting(channel_setting)
                .ok_or(PollerError::ConfigurationIncomplete("announcement channel"))?,
        })
    }
}

pub struct GuildPoller {
    guild_id: String,
    deps: PollerDeps,
    config: Arc<PollerConfig>,
    cancel: CancellationToken,
}

impl GuildPoller {
    pub fn new(guild_id: impl Into<String>, deps: PollerDeps, config: Arc<PollerConfig>) -> Self {
        Self {
            guild_id: guild_id.into(),
            deps,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Tie the poller to an outer token, e.g. the owning plugin's
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn guild_id(&self) -> &str {
        &self.guild_id
    }

    /// Start the recurring schedule on its own task
    pub fn spawn(self) -> PollerHandle {
        let guild_id = self.guild_id.clone();
        let cancel = self.cancel.clone();
        let task = tokio::spawn(Arc::new(self).run());
        PollerHandle {
            guild_id,
            cancel,
            task,
        }
    }

    async fn run(self: Arc<Self>) {
        tokio::select! {
            _ = self.cancel.cancelled() => return,
            _ = tokio::time::sleep(self.config.initial_delay) => {}
        }

        let period = self.config.period.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = interval.tick() => {}
            }
            // A running tick is not interrupted, it observes the token itself
            if !self.run_tick().await {
                break;
            }
        }
        tracing::info!(guild_id = %self.guild_id, "Guild poller stopped");
    }

    /// Run one tick on its own task and classify the outcome.
    /// Returns `false` when the poller must be torn down.
    async fn run_tick(self: &Arc<Self>) -> bool {
        let poller = Arc::clone(self);
        let result = match tokio::spawn(async move { poller.tick().await }).await {
            Ok(result) => result,
            Err(e) => Err(PollerError::Panicked(e.to_string())),
        };

        match result {
            Ok(report) => {
                tracing::debug!(guild_id = %self.guild_id, ?report, "Legendary check tick done");
                true
            }
            Err(PollerError::ConfigurationIncomplete(missing)) => {
                tracing::debug!(guild_id = %self.guild_id, missing, "Guild not configured, skipping tick");
                true
            }
            Err(PollerError::ChannelResolution(channel)) => {
                tracing::warn!(
                    guild_id = %self.guild_id,
                    channel = %channel,
                    "Invalid announcement channel, removing legendary check"
                );
                self.cancel.cancel();
                false
            }
            Err(PollerError::Remote(e)) => {
                tracing::warn!(guild_id = %self.guild_id, error = %e, "Legendary check tick abandoned");
                true
            }
            Err(e) => {
                let context = self.diagnostic_context();
                tracing::error!(guild_id = %self.guild_id, error = %e, "Legendary check crashed");
                self.deps.diagnostics.report(&e, &context);
                true
            }
        }
    }

    fn diagnostic_context(&self) -> Vec<(&'static str, String)> {
        let mut context = vec![("guildId", self.guild_id.clone())];
        if let Ok(settings) = self.deps.settings.guild_settings(&self.guild_id) {
            for (label, value) in [
                ("region", settings.region()),
                ("serverName", settings.server_name()),
                ("wowGuild", settings.guild_name()),
            ] {
                if let Some(value) = value {
                    context.push((label, value.to_string()));
                }
            }
        }
        context
    }

    /// One full scan of the guild roster
    pub async fn tick(&self) -> Result<TickReport, PollerError> {
        let settings = self.deps.settings.guild_settings(&self.guild_id)?;
        let target = GuildTarget::resolve(&settings, &self.config.channel_setting)?;
        let mut report = TickReport::default();
        if self.cancel.is_cancelled() {
            report.cancelled = true;
            return Ok(report);
        }

        let Some(roster) = self
            .deps
            .api
            .guild_roster(target.region, target.server, target.guild_name)
            .await?
        else {
            tracing::debug!(guild_id = %self.guild_id, guild = target.guild_name, "Guild not found upstream");
            return Ok(report);
        };
        report.roster_found = true;

        tracing::info!(guild_id = %self.guild_id, region = target.region, server = target.server, "Starting legendary check");

        for member in roster
            .members
            .iter()
            .filter(|m| m.level == self.config.tracked_level)
        {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                return Ok(report);
            }
            report.members_checked += 1;
            self.check_member(&target, member, &mut report).await?;
            if report.cancelled {
                return Ok(report);
            }
        }

        tracing::info!(guild_id = %self.guild_id, notifications = report.notifications, "Went through legendary check");
        Ok(report)
    }

    async fn check_member(
        &self,
        target: &GuildTarget<'_>,
        member: &RosterMember,
        report: &mut TickReport,
    ) -> Result<(), PollerError> {
        let feed = match self
            .deps
            .api
            .character_feed(target.region, &member.realm, &member.name)
            .await
        {
            Ok(Some(feed)) => feed,
            Ok(None) => {
                tracing::warn!(
                    guild_id = %self.guild_id,
                    member = %member.name,
                    realm = %member.realm,
                    guild = target.guild_name,
                    region = target.region,
                    "Member not found upstream"
                );
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(guild_id = %self.guild_id, member = %member.name, error = %e, "Member feed fetch failed");
                return Ok(());
            }
        };

        let key = WatermarkKey::member(target.region, target.server, &member.name);
        let previous = self.deps.watermarks.get(&key)?.unwrap_or(0);
        if feed.last_modified <= previous {
            return Ok(());
        }

        // Advanced before the events are walked: a crash mid-feed drops the
        // rest of this batch instead of announcing it twice. Losing the race
        // to another poller on the same key means that poller announces.
        if !self.deps.watermarks.advance(&key, feed.last_modified)? {
            return Ok(());
        }
        report.members_updated += 1;

        for event in &feed.feed {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                return Ok(());
            }
            if event.kind != LOOT_EVENT || event.timestamp <= previous {
                continue;
            }
            let Some(item_id) = event.item_id else {
                continue;
            };
            if self.config.ignored_items.contains(&item_id) {
                continue;
            }

            let Some(item) = self.deps.items.get(&ItemKey::new(target.region, item_id)).await else {
                continue;
            };
            if !item.is_legendary() {
                continue;
            }

            tracing::info!(guild_id = %self.guild_id, member = %member.name, item_id, "Member looted a legendary");
            let channel_id = self
                .deps
                .bot
                .find_text_channel(&self.guild_id, target.channel)
                .await
                .ok_or_else(|| PollerError::ChannelResolution(target.channel.to_string()))?;

            let text = format!(
                "{} just looted a legendary! {} http://www.wowhead.com/item={}",
                member.name, item.name, item_id
            );
            match self.deps.bot.send_message(&channel_id, &text).await {
                Ok(()) => report.notifications += 1,
                Err(e) => {
                    tracing::warn!(guild_id = %self.guild_id, channel = %channel_id, error = %e, "Announcement failed")
                }
            }
        }
        Ok(())
    }
}

/// Running poller
pub struct PollerHandle {
    guild_id: String,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn guild_id(&self) -> &str {
        &self.guild_id
    }

    /// Cancel the schedule. An in-flight tick stops at its next member or
    /// feed event boundary.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// True once the schedule has ended, including self teardown
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Shut down and wait for the task to exit
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::warn!(guild_id = %self.guild_id, error = %e, "Poller task ended abnormally");
        }
    }
}
