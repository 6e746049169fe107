//! Battle.net community API client

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::application::errors::RemoteFetchError;
use crate::domain::entities::{CharacterFeed, ItemInfo, Roster, RosterMember};
use crate::domain::traits::GameApi;
use crate::infrastructure::config::BattleNetConfig;

pub struct BattleNetClient {
    client: Client,
    api_key: String,
    host_suffix: String,
    locale: String,
}

impl BattleNetClient {
    pub fn new(api_key: impl Into<String>, host_suffix: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            host_suffix: host_suffix.into(),
            locale: locale.into(),
        }
    }

    pub fn from_config(config: &BattleNetConfig) -> Self {
        Self::new(
            config.api_key.clone().unwrap_or_default(),
            config.host_suffix.clone(),
            config.locale.clone(),
        )
    }

    fn url(&self, region: &str, path: &str) -> String {
        format!("https://{}.{}/wow/{}", region, self.host_suffix, path)
    }

    /// GET a resource. `Ok(None)` on 404 or an error document.
    async fn get_json(&self, url: &str, fields: Option<&str>) -> Result<Option<Value>, RemoteFetchError> {
        let mut request = self
            .client
            .get(url)
            .query(&[("apikey", self.api_key.as_str()), ("locale", self.locale.as_str())]);
        if let Some(fields) = fields {
            request = request.query(&[("fields", fields)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RemoteFetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let value: Value =
            serde_json::from_str(&body).map_err(|e| RemoteFetchError::Parse(e.to_string()))?;
        if is_not_found(&value) {
            return Ok(None);
        }
        Ok(Some(value))
    }
}

/// Error documents carry `"status": "nok"` and a `reason`
fn is_not_found(value: &Value) -> bool {
    value.get("status").and_then(Value::as_str) == Some("nok") || value.get("reason").is_some()
}

#[derive(Deserialize)]
struct GuildDocument {
    #[serde(default)]
    members: Vec<GuildMemberEntry>,
}

#[derive(Deserialize)]
struct GuildMemberEntry {
    character: CharacterSummary,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CharacterSummary {
    name: String,
    realm: Option<String>,
    guild_realm: Option<String>,
    #[serde(default)]
    level: u32,
}

fn parse_roster(value: Value) -> Result<Roster, RemoteFetchError> {
    let document: GuildDocument =
        serde_json::from_value(value).map_err(|e| RemoteFetchError::Parse(e.to_string()))?;

    let members = document
        .members
        .into_iter()
        .filter_map(|entry| {
            let character = entry.character;
            let realm = character.realm.or(character.guild_realm)?;
            Some(RosterMember {
                name: character.name,
                realm,
                level: character.level,
            })
        })
        .collect();
    Ok(Roster { members })
}

/// A character document without `lastModified` is treated as unknown
fn parse_feed(value: Value) -> Result<Option<CharacterFeed>, RemoteFetchError> {
    if value.get("lastModified").is_none() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| RemoteFetchError::Parse(e.to_string()))
}

#[async_trait]
impl GameApi for BattleNetClient {
    async fn guild_roster(
        &self,
        region: &str,
        server: &str,
        guild: &str,
    ) -> Result<Option<Roster>, RemoteFetchError> {
        let url = self.url(region, &format!("guild/{}/{}", server, guild));
        match self.get_json(&url, Some("members")).await? {
            Some(value) => parse_roster(value).map(Some),
            None => Ok(None),
        }
    }

    async fn character_feed(
        &self,
        region: &str,
        realm: &str,
        name: &str,
    ) -> Result<Option<CharacterFeed>, RemoteFetchError> {
        let url = self.url(region, &format!("character/{}/{}", realm, name));
        match self.get_json(&url, Some("feed")).await? {
            Some(value) => parse_feed(value),
            None => Ok(None),
        }
    }

    async fn item(&self, region: &str, item_id: u64) -> Result<Option<ItemInfo>, RemoteFetchError> {
        let url = self.url(region, &format!("item/{}", item_id));
        match self.get_json(&url, None).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| RemoteFetchError::Parse(e.to_string())),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_documents_are_not_found() {
        assert!(is_not_found(&json!({"status": "nok", "reason": "Guild not found."})));
        assert!(is_not_found(&json!({"reason": "unable to get item information."})));
        assert!(!is_not_found(&json!({"name": "Exodus", "members": []})));
    }

    #[test]
    fn test_roster_falls_back_to_guild_realm() {
        let roster = parse_roster(json!({
            "members": [
                {"character": {"name": "Arthas", "realm": "Archimonde", "level": 110}, "rank": 0},
                {"character": {"name": "Jaina", "guildRealm": "Archimonde", "level": 109}, "rank": 1},
                {"character": {"name": "Nobody", "level": 110}, "rank": 2}
            ]
        }))
        .unwrap();

        assert_eq!(roster.members.len(), 2);
        assert_eq!(roster.members[1].realm, "Archimonde");
        assert_eq!(roster.members[1].level, 109);
    }

    #[test]
    fn test_feed_without_last_modified_is_unknown() {
        assert_eq!(parse_feed(json!({"name": "Arthas"})).unwrap(), None);

        let feed = parse_feed(json!({
            "lastModified": 1500000000000i64,
            "feed": [
                {"type": "LOOT", "timestamp": 1499999999000i64, "itemId": 144259},
                {"type": "ACHIEVEMENT", "timestamp": 1499999998000i64}
            ]
        }))
        .unwrap()
        .unwrap();
        assert_eq!(feed.last_modified, 1_500_000_000_000);
        assert_eq!(feed.feed[0].item_id, Some(144259));
        assert_eq!(feed.feed[1].item_id, None);
    }

    #[test]
    fn test_url_uses_region_host() {
        let client = BattleNetClient::new("key", "api.battle.net", "en_US");
        assert_eq!(
            client.url("eu", "guild/Ysondre/Exodus"),
            "https://eu.api.battle.net/wow/guild/Ysondre/Exodus"
        );
    }
}
