//! Full scoreboard rebuild.
//!
//! For every roster member: resolve the account id, list recent matches,
//! fetch each match and count first places on or after the minimum date.
//! Failures never abort the rebuild. A member whose id or match list cannot
//! be fetched is left out; a match that cannot be fetched or does not list
//! the member is skipped without counting as a loss.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::id_cache::PlayerIdCache;
use super::models::{MatchOutcome, ScoreboardEntry};
use crate::pubg::{PubgError, StatsApi};

#[derive(Clone)]
pub struct Aggregator {
    api: Arc<dyn StatsApi>,
    ids: PlayerIdCache,
    /// Roster members in flight at once
    concurrency: usize,
}

impl Aggregator {
    pub fn new(api: Arc<dyn StatsApi>, ids: PlayerIdCache, concurrency: usize) -> Self {
        Aggregator {
            api,
            ids,
            concurrency: concurrency.max(1),
        }
    }

    /// Entries come back in roster order regardless of concurrency.
    pub async fn rebuild(&self, roster: &[String], min_date: DateTime<Utc>) -> Vec<ScoreboardEntry> {
        // Owned names: a closure over `&String` leaves the future non-`Send`.
        stream::iter(roster.iter().cloned())
            .map(|name| async move { self.tally(&name, min_date).await })
            .buffered(self.concurrency)
            .filter_map(|entry| async move { entry })
            .collect()
            .await
    }

    async fn tally(&self, name: &str, min_date: DateTime<Utc>) -> Option<ScoreboardEntry> {
        debug!("Processing {}", name);

        let player_id = match self.ids.resolve(self.api.as_ref(), name).await {
            Ok(id) => id,
            Err(e) => {
                warn!("Failed resolving account id for {}: {}", name, e);
                return None;
            }
        };

        let match_ids = match self.api.find_player(name).await {
            Ok(player) => player.match_ids,
            Err(e) => {
                warn!("Failed fetching matches for {}: {}", name, e);
                return None;
            }
        };

        let mut chicken_dinners = 0;
        for match_id in &match_ids {
            let outcome = match self.outcome(&player_id, match_id).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Skipping match {} for {}: {}", match_id, name, e);
                    continue;
                }
            };
            if outcome.created_at < min_date {
                continue;
            }
            if outcome.won {
                chicken_dinners += 1;
                info!("{} won match {}", name, match_id);
            }
        }

        info!(
            "{} has {} chicken dinners across {} matches",
            name,
            chicken_dinners,
            match_ids.len()
        );
        Some(ScoreboardEntry {
            player_name: name.to_string(),
            chicken_dinners,
        })
    }

    async fn outcome(&self, player_id: &str, match_id: &str) -> Result<MatchOutcome, PubgError> {
        let detail = self.api.get_match(match_id).await?;
        let participant = detail.participant(player_id)?;
        Ok(MatchOutcome {
            won: participant.win_place == 1,
            created_at: detail.created_at,
        })
    }
}
