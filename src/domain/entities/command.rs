use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::application::errors::{BotError, CommandError, DuplicateCommandError};
use crate::domain::entities::{IncomingMessage, Member};
use crate::domain::traits::Bot;

/// A chat command handler.
///
/// The dispatcher checks `can_execute` and the argument bounds before calling
/// `execute`, so handlers can index `args` within `min_args()` freely.
#[async_trait]
pub trait Command: Send + Sync {
    async fn execute(&self, ctx: &CommandContext, args: &[String]) -> Result<(), CommandError>;

    fn min_args(&self) -> usize {
        0
    }

    fn max_args(&self) -> usize {
        0
    }

    /// Public by default
    fn can_execute(&self, _member: &Member) -> bool {
        true
    }

    fn help(&self) -> &str;
}

/// What a command sees of the message that triggered it
#[derive(Clone)]
pub struct CommandContext {
    pub message: IncomingMessage,
    bot: Arc<dyn Bot>,
}

impl CommandContext {
    pub fn new(message: IncomingMessage, bot: Arc<dyn Bot>) -> Self {
        Self { message, bot }
    }

    pub fn guild_id(&self) -> &str {
        &self.message.guild_id
    }

    pub fn bot(&self) -> &Arc<dyn Bot> {
        &self.bot
    }

    /// Send a message back to the channel the command came from
    pub async fn reply(&self, text: &str) -> Result<(), BotError> {
        self.bot.send_message(&self.message.channel_id, text).await
    }
}

/// Name to handler table consulted by the dispatcher.
///
/// Lookups hand out a clone of the handler `Arc`, so the lock is never held
/// while a command runs.
#[derive(Default)]
pub struct CommandTable {
    commands: RwLock<HashMap<String, Arc<dyn Command>>>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        name: impl Into<String>,
        command: Arc<dyn Command>,
    ) -> Result<(), DuplicateCommandError> {
        let name = name.into();
        let mut commands = self.commands.write().unwrap_or_else(PoisonError::into_inner);

        if commands.contains_key(&name) {
            return Err(DuplicateCommandError(name));
        }

        tracing::debug!(command = %name, "Registered command");
        commands.insert(name, command);
        Ok(())
    }

    /// Returns whether a command was removed
    pub fn unregister(&self, name: &str) -> bool {
        let removed = self
            .commands
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some();
        if removed {
            tracing::debug!(command = %name, "Unregistered command");
        }
        removed
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Help text of every command, sorted by command name
    pub fn help_lines(&self) -> Vec<String> {
        let commands = self.commands.read().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<(&String, &Arc<dyn Command>)> = commands.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(_, cmd)| cmd.help().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
