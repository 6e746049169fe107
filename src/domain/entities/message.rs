use super::Member;
use chrono::{DateTime, Utc};

/// A chat message received from the transport
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub id: String,
    pub guild_id: String,
    pub channel_id: String,
    pub sender: Member,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl IncomingMessage {
    pub fn new(
        guild_id: impl Into<String>,
        channel_id: impl Into<String>,
        sender: Member,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            guild_id: guild_id.into(),
            channel_id: channel_id.into(),
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}
