use async_trait::async_trait;
use crate::application::errors::RemoteFetchError;
use crate::domain::entities::{CharacterFeed, GuildRank, ItemInfo, Roster};

/// Remote game API.
///
/// `Ok(None)` means the upstream answered but does not know the entity.
#[async_trait]
pub trait GameApi: Send + Sync {
    async fn guild_roster(
        &self,
        region: &str,
        server: &str,
        guild: &str,
    ) -> Result<Option<Roster>, RemoteFetchError>;

    async fn character_feed(
        &self,
        region: &str,
        realm: &str,
        name: &str,
    ) -> Result<Option<CharacterFeed>, RemoteFetchError>;

    async fn item(&self, region: &str, item_id: u64) -> Result<Option<ItemInfo>, RemoteFetchError>;
}

/// Guild progress ranking source
#[async_trait]
pub trait RankApi: Send + Sync {
    async fn guild_rank(
        &self,
        region: &str,
        server: &str,
        guild: &str,
    ) -> Result<Option<GuildRank>, RemoteFetchError>;
}
