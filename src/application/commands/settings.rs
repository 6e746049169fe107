use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::CommandError;
use crate::domain::entities::{Command, CommandContext, Member};
use crate::domain::traits::SettingsWriter;

/// `!setserversetting <key> <value...>`, guild administrators only
pub struct SetServerSettingCommand {
    settings: Arc<dyn SettingsWriter>,
}

impl SetServerSettingCommand {
    pub fn new(settings: Arc<dyn SettingsWriter>) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Command for SetServerSettingCommand {
    async fn execute(&self, ctx: &CommandContext, args: &[String]) -> Result<(), CommandError> {
        let key = &args[0];
        let value = args[1..].join(" ");

        self.settings.set_setting(ctx.guild_id(), key, &value)?;
        tracing::info!(guild_id = %ctx.guild_id(), key = %key, "Guild setting changed");

        ctx.reply(&format!("Setting {} set to {}", key, value)).await?;
        Ok(())
    }

    fn min_args(&self) -> usize {
        2
    }

    fn max_args(&self) -> usize {
        usize::MAX
    }

    fn can_execute(&self, member: &Member) -> bool {
        member.is_admin
    }

    fn help(&self) -> &str {
        "!setserversetting <key> <value> - Change a server setting (admin only)"
    }
}
