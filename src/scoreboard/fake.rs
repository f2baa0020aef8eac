//! Scripted in-memory [`StatsApi`] for scoreboard tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;

use crate::pubg::models::{MatchDetail, Participant, PlayerRecord};
use crate::pubg::{PubgError, StatsApi};

#[derive(Default)]
pub(crate) struct FakeApi {
    players: HashMap<String, PlayerRecord>,
    matches: HashMap<String, MatchDetail>,
    broken_matches: HashSet<String>,
    pub player_calls: AtomicUsize,
    pub match_calls: AtomicUsize,
}

pub(crate) fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player(mut self, name: &str, match_ids: &[&str]) -> Self {
        self.players.insert(
            name.to_string(),
            PlayerRecord {
                id: format!("account.{}", name.to_lowercase()),
                name: name.to_string(),
                match_ids: match_ids.iter().map(|m| m.to_string()).collect(),
            },
        );
        self
    }

    /// Add a match; `placements` are `(player name, win place)` pairs.
    pub fn game(mut self, id: &str, created_at: &str, placements: &[(&str, u32)]) -> Self {
        self.matches.insert(
            id.to_string(),
            MatchDetail {
                id: id.to_string(),
                created_at: ts(created_at),
                participants: placements
                    .iter()
                    .map(|(name, place)| Participant {
                        player_id: format!("account.{}", name.to_lowercase()),
                        win_place: *place,
                    })
                    .collect(),
            },
        );
        self
    }

    pub fn broken_match(mut self, id: &str) -> Self {
        self.broken_matches.insert(id.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.player_calls.load(Ordering::SeqCst) + self.match_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatsApi for FakeApi {
    async fn find_player(&self, name: &str) -> Result<PlayerRecord, PubgError> {
        self.player_calls.fetch_add(1, Ordering::SeqCst);
        self.players
            .get(name)
            .cloned()
            .ok_or_else(|| PubgError::PlayerNotFound(name.to_string()))
    }

    async fn get_match(&self, match_id: &str) -> Result<MatchDetail, PubgError> {
        self.match_calls.fetch_add(1, Ordering::SeqCst);
        if self.broken_matches.contains(match_id) {
            return Err(PubgError::Upstream {
                status: StatusCode::INTERNAL_SERVER_ERROR,
            });
        }
        self.matches
            .get(match_id)
            .cloned()
            .ok_or(PubgError::Upstream {
                status: StatusCode::NOT_FOUND,
            })
    }
}
