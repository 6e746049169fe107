use async_trait::async_trait;
use crate::application::errors::BotError;

/// Bot trait - abstraction for the chat transport
#[async_trait]
pub trait Bot: Send + Sync {
    /// Send a message to a channel. Delivery is not acknowledged.
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<(), BotError>;

    /// Resolve a text channel by name within a guild, ignoring case
    async fn find_text_channel(&self, guild_id: &str, name: &str) -> Option<String>;

    /// Guilds the bot is currently a member of
    fn guilds(&self) -> Vec<String>;

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
}
