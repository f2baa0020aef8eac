use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::error::PubgError;

// ── Domain view ────────────────────────────────────────────────────────────────

/// A player account plus the ids of its recent matches.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    /// Account id, e.g. "account.c0e530e9b7244b358def282782f893af"
    pub id: String,
    pub name: String,
    pub match_ids: Vec<String>,
}

/// One participant row of a match roster.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub player_id: String,
    /// Final placement, 1 = chicken dinner
    pub win_place: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchDetail {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<Participant>,
}

impl MatchDetail {
    pub fn participant(&self, player_id: &str) -> Result<&Participant, PubgError> {
        self.participants
            .iter()
            .find(|p| p.player_id == player_id)
            .ok_or_else(|| PubgError::ParticipantNotFound {
                match_id: self.id.clone(),
            })
    }
}

// ── Wire schema (JSON:API) ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct PlayersResponse {
    #[serde(default)]
    pub data: Vec<PlayerData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlayerData {
    pub id: String,
    #[serde(default)]
    pub attributes: PlayerAttributes,
    #[serde(default)]
    pub relationships: PlayerRelationships,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PlayerAttributes {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PlayerRelationships {
    #[serde(default)]
    pub matches: RelationshipList,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RelationshipList {
    #[serde(default)]
    pub data: Vec<ResourceRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResourceRef {
    pub id: String,
}

impl PlayersResponse {
    /// First player of the result set; an empty set means the name is unknown.
    pub fn into_first(self, name: &str) -> Result<PlayerRecord, PubgError> {
        let player = self
            .data
            .into_iter()
            .next()
            .ok_or_else(|| PubgError::PlayerNotFound(name.to_string()))?;
        Ok(PlayerRecord {
            id: player.id,
            name: if player.attributes.name.is_empty() {
                name.to_string()
            } else {
                player.attributes.name
            },
            match_ids: player
                .relationships
                .matches
                .data
                .into_iter()
                .map(|m| m.id)
                .collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatchResponse {
    pub data: MatchData,
    #[serde(default)]
    pub included: Vec<IncludedEntity>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatchData {
    pub id: String,
    pub attributes: MatchAttributes,
    /// Older payloads nest the included entities under `data`.
    #[serde(default)]
    pub included: Vec<IncludedEntity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MatchAttributes {
    pub created_at: DateTime<Utc>,
}

/// Included entities mix participants, rosters and assets; only participants
/// are interpreted, so attributes stay untyped until the type is known.
#[derive(Debug, Deserialize)]
pub(crate) struct IncludedEntity {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ParticipantAttributes {
    stats: ParticipantStats,
}

/// Placement arrives as `winPlace`; some payloads carry `rank` instead or
/// as well. `winPlace` wins when both are present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParticipantStats {
    player_id: String,
    #[serde(default)]
    win_place: Option<u32>,
    #[serde(default)]
    rank: Option<u32>,
}

impl MatchResponse {
    /// Participants that cannot be read (bots without a placement, odd
    /// shapes) are dropped one by one; they never fail the whole match.
    pub fn into_detail(self) -> MatchDetail {
        let MatchResponse { data, included } = self;
        let mut participants = Vec::new();
        for entity in included.into_iter().chain(data.included) {
            if entity.kind != "participant" {
                continue;
            }
            let stats = match serde_json::from_value::<ParticipantAttributes>(entity.attributes) {
                Ok(attrs) => attrs.stats,
                Err(e) => {
                    debug!("Ignoring unreadable participant in match {}: {}", data.id, e);
                    continue;
                }
            };
            let Some(win_place) = stats.win_place.or(stats.rank) else {
                debug!(
                    "Ignoring participant {} without placement in match {}",
                    stats.player_id, data.id
                );
                continue;
            };
            participants.push(Participant {
                player_id: stats.player_id,
                win_place,
            });
        }
        MatchDetail {
            id: data.id,
            created_at: data.attributes.created_at,
            participants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYERS_JSON: &str = r#"{
        "data": [{
            "type": "player",
            "id": "account.abc",
            "attributes": {"name": "LordRix", "shardId": "steam"},
            "relationships": {
                "assets": {"data": []},
                "matches": {"data": [
                    {"type": "match", "id": "m-1"},
                    {"type": "match", "id": "m-2"}
                ]}
            }
        }],
        "links": {"self": "https://api.pubg.com/shards/steam/players?filter[playerNames]=LordRix"}
    }"#;

    const MATCH_JSON: &str = r#"{
        "data": {
            "type": "match",
            "id": "m-1",
            "attributes": {
                "createdAt": "2024-05-02T18:04:11Z",
                "duration": 1789,
                "mapName": "Baltic_Main"
            }
        },
        "included": [
            {"type": "roster", "id": "r-1", "attributes": {"stats": {"rank": 1, "teamId": 4}, "won": "true"}},
            {"type": "participant", "id": "p-1", "attributes": {"stats": {"name": "LordRix", "playerId": "account.abc", "winPlace": 1, "kills": 6}}},
            {"type": "participant", "id": "p-2", "attributes": {"stats": {"name": "Other", "playerId": "account.zzz", "winPlace": 17}}},
            {"type": "asset", "id": "a-1", "attributes": {"URL": "https://telemetry"}}
        ]
    }"#;

    #[test]
    fn test_player_response_to_record() {
        let resp: PlayersResponse = serde_json::from_str(PLAYERS_JSON).unwrap();
        let record = resp.into_first("LordRix").unwrap();
        assert_eq!(record.id, "account.abc");
        assert_eq!(record.name, "LordRix");
        assert_eq!(record.match_ids, vec!["m-1".to_string(), "m-2".to_string()]);
    }

    #[test]
    fn test_empty_player_set_is_not_found() {
        let resp: PlayersResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(matches!(
            resp.into_first("Ghost"),
            Err(PubgError::PlayerNotFound(name)) if name == "Ghost"
        ));
    }

    #[test]
    fn test_match_response_keeps_only_participants() {
        let resp: MatchResponse = serde_json::from_str(MATCH_JSON).unwrap();
        let detail = resp.into_detail();
        assert_eq!(detail.id, "m-1");
        assert_eq!(detail.created_at.to_rfc3339(), "2024-05-02T18:04:11+00:00");
        assert_eq!(detail.participants.len(), 2);
        assert_eq!(detail.participant("account.abc").unwrap().win_place, 1);
        assert_eq!(detail.participant("account.zzz").unwrap().win_place, 17);
    }

    #[test]
    fn test_missing_participant() {
        let resp: MatchResponse = serde_json::from_str(MATCH_JSON).unwrap();
        let detail = resp.into_detail();
        assert!(matches!(
            detail.participant("account.nobody"),
            Err(PubgError::ParticipantNotFound { match_id }) if match_id == "m-1"
        ));
    }

    #[test]
    fn test_included_nested_under_data_and_rank_only() {
        let json = r#"{
            "data": {
                "id": "m-9",
                "attributes": {"createdAt": "2024-01-01T00:00:00Z"},
                "included": [
                    {"type": "participant", "id": "p", "attributes": {"stats": {"playerId": "account.abc", "rank": 3}}}
                ]
            }
        }"#;
        let detail = serde_json::from_str::<MatchResponse>(json)
            .unwrap()
            .into_detail();
        assert_eq!(detail.participant("account.abc").unwrap().win_place, 3);
    }

    fn decode(included: &str) -> MatchDetail {
        let json = format!(
            r#"{{
                "data": {{"id": "m-3", "attributes": {{"createdAt": "2024-01-01T00:00:00Z"}}}},
                "included": {included}
            }}"#
        );
        serde_json::from_str::<MatchResponse>(&json)
            .unwrap()
            .into_detail()
    }

    #[test]
    fn test_win_place_preferred_over_rank() {
        let detail = decode(
            r#"[{"type": "participant", "attributes": {"stats": {"playerId": "account.abc", "winPlace": 1, "rank": 4}}}]"#,
        );
        assert_eq!(detail.participant("account.abc").unwrap().win_place, 1);
    }

    #[test]
    fn test_unreadable_sibling_does_not_drop_match() {
        let detail = decode(
            r#"[
                {"type": "participant", "attributes": {"stats": {"playerId": "account.abc", "winPlace": 1}}},
                {"type": "participant", "attributes": {"stats": {"playerId": "ai.1"}}},
                {"type": "participant", "attributes": {"stats": {"winPlace": 2}}},
                {"type": "participant"}
            ]"#,
        );
        assert_eq!(detail.participants.len(), 1);
        assert_eq!(detail.participant("account.abc").unwrap().win_place, 1);
        assert!(detail.participant("ai.1").is_err());
    }
}
