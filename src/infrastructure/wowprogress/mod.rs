//! WowProgress guild ranking client

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::application::errors::RemoteFetchError;
use crate::domain::entities::GuildRank;
use crate::domain::traits::RankApi;

pub struct WowProgressClient {
    client: Client,
    base_url: String,
}

impl WowProgressClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, region: &str, server: &str, guild: &str) -> String {
        format!("{}/guild/{}/{}/{}/json_rank", self.base_url, region, server, guild)
    }
}

/// The endpoint answers `null` for unknown guilds
fn parse_rank(body: &str) -> Result<Option<GuildRank>, RemoteFetchError> {
    let value: Value = serde_json::from_str(body).map_err(|e| RemoteFetchError::Parse(e.to_string()))?;
    if value.is_null() {
        return Ok(None);
    }
    let rank = |field: &str| value.get(field).and_then(Value::as_u64);
    Ok(Some(GuildRank {
        world_rank: rank("world_rank"),
        area_rank: rank("area_rank"),
        realm_rank: rank("realm_rank"),
    }))
}

#[async_trait]
impl RankApi for WowProgressClient {
    async fn guild_rank(
        &self,
        region: &str,
        server: &str,
        guild: &str,
    ) -> Result<Option<GuildRank>, RemoteFetchError> {
        let response = self.client.get(self.url(region, server, guild)).send().await?;
        if !response.status().is_success() {
            return Err(RemoteFetchError::Status(response.status().as_u16()));
        }
        parse_rank(&response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_body_is_unknown_guild() {
        assert_eq!(parse_rank("null").unwrap(), None);
    }

    #[test]
    fn test_rank_fields() {
        let rank = parse_rank(r#"{"score": 750000, "world_rank": 1203, "area_rank": 455, "realm_rank": 3}"#)
            .unwrap()
            .unwrap();
        assert_eq!(rank.world_rank, Some(1203));
        assert_eq!(rank.area_rank, Some(455));
        assert_eq!(rank.realm_rank, Some(3));
    }

    #[test]
    fn test_url_layout() {
        let client = WowProgressClient::new("https://www.wowprogress.com/");
        assert_eq!(
            client.url("us", "archimonde", "exodus"),
            "https://www.wowprogress.com/guild/us/archimonde/exodus/json_rank"
        );
    }
}
