//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::application::errors::BotError;
use crate::domain::entities::{IncomingMessage, Member};
use crate::domain::traits::{Bot, BotInfo};
use crate::infrastructure::config::ConsoleConfig;

/// Console bot adapter for local development.
///
/// Pretends to be a single guild whose text channels come from the config.
pub struct ConsoleAdapter {
    info: BotInfo,
    config: ConsoleConfig,
}

impl ConsoleAdapter {
    pub fn new(name: impl Into<String>, config: ConsoleConfig) -> Self {
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: name.into(),
            },
            config,
        }
    }

    /// Wrap a typed line as a message from the configured user
    pub fn incoming(&self, text: impl Into<String>) -> IncomingMessage {
        let sender = Member::new(&self.config.user_id).with_admin(self.config.admin);
        IncomingMessage::new(&self.config.guild_id, &self.config.channel, sender, text)
    }

    pub fn stdin_lines() -> Lines<BufReader<Stdin>> {
        BufReader::new(tokio::io::stdin()).lines()
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<(), BotError> {
        println!("[#{}] {}", channel_id, text);
        Ok(())
    }

    async fn find_text_channel(&self, guild_id: &str, name: &str) -> Option<String> {
        if guild_id != self.config.guild_id {
            return None;
        }
        self.config
            .channels
            .iter()
            .find(|channel| channel.eq_ignore_ascii_case(name))
            .cloned()
    }

    fn guilds(&self) -> Vec<String> {
        vec![self.config.guild_id.clone()]
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
