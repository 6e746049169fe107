use std::sync::Weak;

use async_trait::async_trait;

use crate::application::errors::CommandError;
use crate::domain::entities::{Command, CommandContext, Member};
use crate::plugins::PluginManager;

/// Owner-only hot reload of every plugin.
///
/// Holds the manager weakly: the manager owns the command table this command
/// lives in.
pub struct ReloadCommand {
    manager: Weak<PluginManager>,
    owner_id: Option<String>,
}

impl ReloadCommand {
    pub fn new(manager: Weak<PluginManager>, owner_id: Option<String>) -> Self {
        Self { manager, owner_id }
    }
}

#[async_trait]
impl Command for ReloadCommand {
    async fn execute(&self, ctx: &CommandContext, _args: &[String]) -> Result<(), CommandError> {
        let manager = self
            .manager
            .upgrade()
            .ok_or_else(|| CommandError::ExecutionFailed("plugin manager is gone".to_string()))?;

        let (load, start) = manager.reload().await;
        let failed = load.failures.len() + start.failures.len();

        let text = if failed == 0 {
            format!("Reloaded {} plugins.", start.started.len())
        } else {
            format!(
                "Reloaded {} plugins, {} failed. Check the logs.",
                start.started.len(),
                failed
            )
        };
        ctx.reply(&text).await?;
        Ok(())
    }

    fn can_execute(&self, member: &Member) -> bool {
        self.owner_id.as_deref() == Some(member.id.as_str())
    }

    fn help(&self) -> &str {
        "!reload - Reload all plugins (owner only)"
    }
}
