use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use super::models::ScoreboardEntry;

/// Last computed scoreboard with a TTL. The whole scoreboard is one unit:
/// it is replaced by [`put`](Self::put) and never partially invalidated.
#[derive(Default)]
pub struct ScoreboardCache {
    inner: RwLock<Option<Cached>>,
}

struct Cached {
    entries: Vec<ScoreboardEntry>,
    expires_at: Instant,
}

impl ScoreboardCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached entries, unless expired or empty.
    pub async fn get(&self) -> Option<Vec<ScoreboardEntry>> {
        let inner = self.inner.read().await;
        let cached = inner.as_ref()?;
        if Instant::now() < cached.expires_at && !cached.entries.is_empty() {
            Some(cached.entries.clone())
        } else {
            None
        }
    }

    pub async fn put(&self, entries: Vec<ScoreboardEntry>, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        *self.inner.write().await = Some(Cached {
            entries,
            expires_at,
        });
    }
}
