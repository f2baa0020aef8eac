use async_trait::async_trait;

use super::error::PubgError;
use super::models::{MatchDetail, PlayerRecord};

/// The slice of the PUBG API the scoreboard needs.
#[async_trait]
pub trait StatsApi: Send + Sync {
    /// Look a player up by display name. Fails with
    /// [`PubgError::PlayerNotFound`] when the name is unknown.
    async fn find_player(&self, name: &str) -> Result<PlayerRecord, PubgError>;

    async fn get_match(&self, match_id: &str) -> Result<MatchDetail, PubgError>;
}
