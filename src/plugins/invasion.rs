//! `!invasion` - Broken Isles invasion timer

use async_trait::async_trait;
use chrono::{DateTime, Duration, Timelike, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

use crate::application::errors::{CommandError, LifecycleError};
use crate::domain::entities::{Command, CommandContext, IntervalSchedule};
use crate::infrastructure::config::InvasionConfig;
use super::trait_def::{Plugin, PluginContext};

pub const COMMAND_NAME: &str = "invasion";

/// Reports whether an invasion is running and when the phase ends
pub struct InvasionCommand {
    schedule: IntervalSchedule,
    timezone: Tz,
}

impl InvasionCommand {
    pub fn from_config(config: &InvasionConfig) -> Result<Self, LifecycleError> {
        let schedule = IntervalSchedule::new(
            config.anchor,
            Duration::minutes(config.on_minutes),
            Duration::minutes(config.off_minutes),
        )
        .map_err(|e| LifecycleError::Hook(e.to_string()))?;

        let timezone = config.display_timezone.parse::<Tz>().map_err(|e| {
            LifecycleError::Hook(format!("unknown invasion display timezone: {}", e))
        })?;

        Ok(Self { schedule, timezone })
    }

    pub fn message_at(&self, now: DateTime<Utc>) -> String {
        let phase = self.schedule.phase(now);
        let boundary = phase.next_boundary.with_timezone(&self.timezone);
        let times = format!(
            "{:02}:{:02} ({:02}:{:02})",
            phase.hours_left(),
            phase.minutes_left(),
            boundary.hour(),
            boundary.minute()
        );

        if phase.active {
            format!("There is currently an invasion active on the Broken Isles! End of the invasion in {}", times)
        } else {
            format!("There is no invasions currently active on the Broken Isle. Next invasion in {}", times)
        }
    }
}

#[async_trait]
impl Command for InvasionCommand {
    async fn execute(&self, ctx: &CommandContext, _args: &[String]) -> Result<(), CommandError> {
        ctx.reply(&self.message_at(Utc::now())).await?;
        Ok(())
    }

    fn help(&self) -> &str {
        "!invasion - Say if there's currently an invasion running on WoW US!"
    }
}

#[derive(Default)]
pub struct InvasionPlugin;

impl InvasionPlugin {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Plugin for InvasionPlugin {
    fn name(&self) -> &str {
        "invasion"
    }

    fn description(&self) -> &str {
        "Invasion timer command"
    }

    async fn start(&self, ctx: &PluginContext) -> Result<(), LifecycleError> {
        let command = InvasionCommand::from_config(&ctx.config().invasion)?;
        ctx.register_command(COMMAND_NAME, Arc::new(command))?;
        tracing::info!("Command !invasion loaded.");
        Ok(())
    }

    async fn stop(&self, ctx: &PluginContext) -> Result<(), LifecycleError> {
        ctx.unregister_command(COMMAND_NAME);
        tracing::info!("Command !invasion disabled.");
        Ok(())
    }
}
