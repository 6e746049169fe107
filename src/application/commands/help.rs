use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::CommandError;
use crate::domain::entities::{Command, CommandContext, CommandTable};

/// Lists the help line of every registered command
pub struct HelpCommand {
    commands: Arc<CommandTable>,
}

impl HelpCommand {
    pub fn new(commands: Arc<CommandTable>) -> Self {
        Self { commands }
    }

    pub fn render(&self) -> String {
        let mut text = String::from("Commands:");
        for line in self.commands.help_lines() {
            text.push('\n');
            text.push_str(&line);
        }
        text
    }
}

#[async_trait]
impl Command for HelpCommand {
    async fn execute(&self, ctx: &CommandContext, _args: &[String]) -> Result<(), CommandError> {
        ctx.reply(&self.render()).await?;
        Ok(())
    }

    fn help(&self) -> &str {
        "!help - Show this list"
    }
}
