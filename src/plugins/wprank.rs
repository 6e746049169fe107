//! `!wprank` - Guild ranking from WowProgress

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::errors::{CommandError, LifecycleError};
use crate::domain::entities::{Command, CommandContext, GuildRank};
use crate::domain::traits::{RankApi, SettingsReader};
use super::trait_def::{Plugin, PluginContext};

pub const COMMAND_NAME: &str = "wprank";

pub struct WpRankCommand {
    settings: Arc<dyn SettingsReader>,
    ranks: Arc<dyn RankApi>,
}

impl WpRankCommand {
    pub fn new(settings: Arc<dyn SettingsReader>, ranks: Arc<dyn RankApi>) -> Self {
        Self { settings, ranks }
    }
}

fn format_rank(guild: &str, rank: &GuildRank) -> String {
    let show = |value: Option<u64>| value.map_or_else(|| "-".to_string(), |v| v.to_string());
    format!(
        "Guild **{}** | World: **{}** | Region Rank: **{}** | Realm rank: **{}**",
        guild,
        show(rank.world_rank),
        show(rank.area_rank),
        show(rank.realm_rank)
    )
}

#[async_trait]
impl Command for WpRankCommand {
    async fn execute(&self, ctx: &CommandContext, _args: &[String]) -> Result<(), CommandError> {
        let settings = self.settings.guild_settings(ctx.guild_id())?;
        let (Some(server), Some(region), Some(guild)) =
            (settings.server_name(), settings.region(), settings.guild_name())
        else {
            ctx.reply("The server name, the region and the guild must be configured for this command to work!")
                .await?;
            return Ok(());
        };

        match self.ranks.guild_rank(region, server, guild).await? {
            Some(rank) => ctx.reply(&format_rank(guild, &rank)).await?,
            None => ctx.reply("Guild not found on WowProgress!").await?,
        }
        Ok(())
    }

    fn help(&self) -> &str {
        "!wprank - Retrieve the guild's rank on WowProgress"
    }
}

#[derive(Default)]
pub struct WpRankPlugin;

impl WpRankPlugin {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Plugin for WpRankPlugin {
    fn name(&self) -> &str {
        "wprank"
    }

    fn description(&self) -> &str {
        "WowProgress guild rank command"
    }

    async fn start(&self, ctx: &PluginContext) -> Result<(), LifecycleError> {
        let services = ctx.services();
        let command = WpRankCommand::new(services.settings.clone(), services.ranks.clone());
        ctx.register_command(COMMAND_NAME, Arc::new(command))?;
        tracing::info!("Command !wprank loaded!");
        Ok(())
    }

    async fn stop(&self, ctx: &PluginContext) -> Result<(), LifecycleError> {
        ctx.unregister_command(COMMAND_NAME);
        tracing::info!("Command !wprank unloaded!");
        Ok(())
    }
}
