use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the PUBG API or interpreting its answers.
#[derive(Debug, Error)]
pub enum PubgError {
    #[error("PUBG request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("rate limited by PUBG API after {attempts} attempts")]
    RateLimitExhausted { attempts: u32 },

    #[error("PUBG API error: {status}")]
    Upstream { status: StatusCode },

    #[error("failed to decode PUBG response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("player {0} not found")]
    PlayerNotFound(String),

    #[error("player not found among participants of match {match_id}")]
    ParticipantNotFound { match_id: String },
}
