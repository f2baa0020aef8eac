//! Player name → account id memo.
//!
//! Names are assumed to map 1:1 to account ids for the life of the process,
//! so entries never expire. Two concurrent misses for the same name may
//! both query the API; the second write stores the same id again.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::pubg::{PubgError, StatsApi};

#[derive(Clone, Default)]
pub struct PlayerIdCache {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl PlayerIdCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve(&self, api: &dyn StatsApi, name: &str) -> Result<String, PubgError> {
        if let Some(id) = self.inner.read().await.get(name) {
            debug!("Using cached account id for {}", name);
            return Ok(id.clone());
        }

        let player = api.find_player(name).await?;
        info!("Resolved {} ({}) to {}", name, player.name, player.id);
        self.inner
            .write()
            .await
            .insert(name.to_string(), player.id.clone());
        Ok(player.id)
    }

    /// Bulk-insert known pairs, overwriting existing entries.
    pub async fn seed(&self, ids: HashMap<String, String>) {
        let mut inner = self.inner.write().await;
        inner.extend(ids);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

/// Read a flat JSON object of `name → account id` pairs.
pub async fn load_id_file(path: &Path) -> Result<HashMap<String, String>> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}
