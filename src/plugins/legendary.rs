//! Legendary check - announces looted legendaries per guild

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::application::errors::LifecycleError;
use crate::application::services::{GuildPoller, PollerHandle};
use super::trait_def::{Plugin, PluginContext};

/// Runs one [`GuildPoller`] per guild the bot is in
#[derive(Default)]
pub struct LegendaryCheckPlugin {
    pollers: Mutex<HashMap<String, PollerHandle>>,
}

impl LegendaryCheckPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guilds whose poller is still scheduled
    pub fn active_guilds(&self) -> Vec<String> {
        let pollers = self.pollers.lock().unwrap_or_else(PoisonError::into_inner);
        let mut guilds: Vec<String> = pollers
            .values()
            .filter(|handle| !handle.is_finished())
            .map(|handle| handle.guild_id().to_string())
            .collect();
        guilds.sort();
        guilds
    }
}

#[async_trait]
impl Plugin for LegendaryCheckPlugin {
    fn name(&self) -> &str {
        "legendarycheck"
    }

    fn description(&self) -> &str {
        "Announces legendary loot of guild members"
    }

    async fn start(&self, ctx: &PluginContext) -> Result<(), LifecycleError> {
        let config = &ctx.config().legendary;
        let deps = ctx.services().poller_deps();
        let guilds = ctx.services().bot.guilds();

        let mut pollers = self.pollers.lock().unwrap_or_else(PoisonError::into_inner);
        for (index, guild_id) in guilds.into_iter().enumerate() {
            if pollers.contains_key(&guild_id) {
                continue;
            }
            let handle = GuildPoller::new(guild_id.clone(), deps.clone(), Arc::new(config.poller_config(index)))
                .spawn();
            ctx.track_poller(&guild_id);
            pollers.insert(guild_id, handle);
        }

        tracing::info!(guilds = pollers.len(), "Legendary check started");
        Ok(())
    }

    async fn stop(&self, ctx: &PluginContext) -> Result<(), LifecycleError> {
        let pollers = std::mem::take(&mut *self.pollers.lock().unwrap_or_else(PoisonError::into_inner));

        for (guild_id, handle) in pollers {
            handle.stop().await;
            ctx.release_poller(&guild_id);
        }
        tracing::info!("Legendary check stopped");
        Ok(())
    }
}
