use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One scoreboard row as served by `GET /scoreboard`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreboardEntry {
    pub player_name: String,
    pub chicken_dinners: u32,
}

/// How one roster member finished one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    pub won: bool,
    pub created_at: DateTime<Utc>,
}
