//! Message dispatcher - Routes chat messages to registered commands

use std::sync::Arc;

use crate::domain::entities::{CommandContext, CommandTable, IncomingMessage};
use crate::domain::traits::{Bot, Diagnostics};
use super::parser::MessageParser;

/// What happened to a dispatched message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// No command prefix
    NotACommand,
    /// Prefixed, but no command by that name
    UnknownCommand,
    /// Sender failed the command's permission check
    PermissionDenied,
    /// Argument count outside the command's bounds
    ArgumentCount,
    Executed,
    /// Handler returned an error or panicked
    Failed,
}

/// Message dispatcher - parses messages and runs the matching command.
///
/// Rejections are silent towards the sender: an unknown command, a missing
/// permission and a wrong argument count all look like ordinary chat.
pub struct MessageDispatcher {
    parser: MessageParser,
    commands: Arc<CommandTable>,
    bot: Arc<dyn Bot>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl MessageDispatcher {
    pub fn new(
        prefix: impl Into<String>,
        commands: Arc<CommandTable>,
        bot: Arc<dyn Bot>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            parser: MessageParser::new(prefix),
            commands,
            bot,
            diagnostics,
        }
    }

    pub fn commands(&self) -> &Arc<CommandTable> {
        &self.commands
    }

    /// Process a message through the dispatcher
    pub async fn dispatch(&self, message: IncomingMessage) -> DispatchOutcome {
        let Some(parsed) = self.parser.parse(&message.text) else {
            return DispatchOutcome::NotACommand;
        };

        let Some(command) = self.commands.get(&parsed.name) else {
            return DispatchOutcome::UnknownCommand;
        };

        if !command.can_execute(&message.sender) {
            tracing::debug!(command = %parsed.name, user = %message.sender.id, "Permission denied");
            return DispatchOutcome::PermissionDenied;
        }

        let arg_count = parsed.args.len();
        if arg_count < command.min_args() || arg_count > command.max_args() {
            tracing::debug!(command = %parsed.name, arg_count, "Argument count out of range");
            return DispatchOutcome::ArgumentCount;
        }

        let guild_id = message.guild_id.clone();
        let name = parsed.name;
        let args = parsed.args;
        let ctx = CommandContext::new(message, self.bot.clone());

        // Own task so a panicking handler cannot take the inbound loop down
        let handle = tokio::spawn(async move { command.execute(&ctx, &args).await });

        match handle.await {
            Ok(Ok(())) => DispatchOutcome::Executed,
            Ok(Err(e)) => {
                tracing::warn!(command = %name, guild_id = %guild_id, error = %e, "Command failed");
                DispatchOutcome::Failed
            }
            Err(e) => {
                tracing::error!(command = %name, guild_id = %guild_id, error = %e, "Command crashed");
                self.diagnostics.report(
                    &e,
                    &[("command", name.clone()), ("guildId", guild_id.clone())],
                );
                DispatchOutcome::Failed
            }
        }
    }
}
