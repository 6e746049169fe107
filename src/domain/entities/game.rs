//! Upstream game data as consumed by the bot

use serde::{Deserialize, Serialize};

/// Feed event kind carrying looted items
pub const LOOT_EVENT: &str = "LOOT";

/// Item quality the upstream API assigns to legendaries
pub const LEGENDARY_QUALITY: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterMember {
    pub name: String,
    pub realm: String,
    pub level: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub members: Vec<RosterMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "itemId", default)]
    pub item_id: Option<u64>,
    pub timestamp: i64,
}

/// A character's recent activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterFeed {
    #[serde(rename = "lastModified")]
    pub last_modified: i64,
    #[serde(default)]
    pub feed: Vec<FeedEvent>,
}

/// Region-scoped item identifier used as the enrichment cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pub region: String,
    pub item_id: u64,
}

impl ItemKey {
    pub fn new(region: impl Into<String>, item_id: u64) -> Self {
        Self {
            region: region.into(),
            item_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub id: u64,
    pub name: String,
    pub quality: u32,
}

impl ItemInfo {
    pub fn is_legendary(&self) -> bool {
        self.quality == LEGENDARY_QUALITY
    }
}

/// WowProgress ranking of a guild
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildRank {
    pub world_rank: Option<u64>,
    pub area_rank: Option<u64>,
    pub realm_rank: Option<u64>,
}
