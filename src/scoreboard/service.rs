use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::engine::Aggregator;
use super::id_cache::PlayerIdCache;
use super::models::ScoreboardEntry;
use super::result_cache::ScoreboardCache;
use crate::pubg::StatsApi;

/// Read-through cache in front of the [`Aggregator`].
///
/// Expiry is checked lazily when a request arrives, so the request that
/// finds the cache stale pays for the rebuild. Concurrent misses may each
/// rebuild; they produce the same scoreboard.
pub struct ScoreboardService {
    api: Arc<dyn StatsApi>,
    ids: PlayerIdCache,
    aggregator: Aggregator,
    cache: ScoreboardCache,
    roster: Vec<String>,
    ttl: Duration,
}

impl ScoreboardService {
    pub fn new(
        api: Arc<dyn StatsApi>,
        roster: Vec<String>,
        ttl: Duration,
        concurrency: usize,
    ) -> Self {
        let ids = PlayerIdCache::new();
        ScoreboardService {
            aggregator: Aggregator::new(api.clone(), ids.clone(), concurrency),
            api,
            ids,
            cache: ScoreboardCache::new(),
            roster,
            ttl,
        }
    }

    pub fn ids(&self) -> &PlayerIdCache {
        &self.ids
    }

    pub fn roster(&self) -> &[String] {
        &self.roster
    }

    pub async fn get_scoreboard(&self, min_date: DateTime<Utc>) -> Vec<ScoreboardEntry> {
        if let Some(entries) = self.cache.get().await {
            info!("Serving scoreboard from cache");
            return entries;
        }

        info!("Scoreboard cache expired or empty, rebuilding");
        let entries = self.aggregator.rebuild(&self.roster, min_date).await;
        self.cache.put(entries.clone(), self.ttl).await;
        info!(
            "Scoreboard cached: {} of {} players",
            entries.len(),
            self.roster.len()
        );
        entries
    }

    /// Resolve every roster member's account id ahead of the first request.
    /// Returns how many names resolved; failures are logged and left for the
    /// first rebuild to retry.
    pub async fn warmup(&self) -> usize {
        let mut resolved = 0;
        for name in &self.roster {
            match self.ids.resolve(self.api.as_ref(), name).await {
                Ok(_) => resolved += 1,
                Err(e) => warn!("Warmup failed for {}: {}", name, e),
            }
        }
        resolved
    }
}
