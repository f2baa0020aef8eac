use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::Parser;
use thiserror::Error;
use url::Url;

use crate::pubg::RetryPolicy;

/// Clan scoreboard counting PUBG chicken dinners
#[derive(Parser, Debug, Clone)]
#[command(name = "chicken-dinner", version, about)]
pub struct Config {
    /// PUBG developer API key (bearer credential)
    #[arg(long, env = "PUBG_API_KEY", hide_env_values = true, default_value = "")]
    pub pubg_api_key: String,

    /// Only matches created at or after this RFC 3339 timestamp count
    #[arg(long, env = "MIN_DATE", value_parser = parse_min_date)]
    pub min_date: DateTime<Utc>,

    /// HTTP listen port
    #[arg(long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// HTTP listen host
    #[arg(long, env = "BIND_HOST", default_value = "0.0.0.0")]
    pub bind_host: String,

    /// How long a computed scoreboard is served before rebuilding (e.g. 90s, 10m, 1h30m)
    #[arg(long, env = "CACHE_DURATION", default_value = "10m", value_parser = parse_duration)]
    pub cache_duration: Duration,

    /// PUBG API base URL including the platform shard
    #[arg(
        long,
        env = "PUBG_API_URL",
        default_value = "https://api.pubg.com/shards/steam"
    )]
    pub pubg_api_url: Url,

    /// Comma-separated player display names tracked on the scoreboard
    #[arg(
        long,
        env = "ROSTER",
        value_delimiter = ',',
        default_value = "LordRix,TanaX18,M1key-D,GRenes,Jarm00725,Remnorz,Kalliyo"
    )]
    pub roster: Vec<String>,

    /// Optional JSON file of `{"name": "account.id"}` pairs used to pre-warm the id cache
    #[arg(long, env = "PLAYER_ID_FILE")]
    pub player_id_file: Option<PathBuf>,

    /// Resolve every roster member's account id at startup
    #[arg(long, env = "WARMUP", default_value = "true", action = clap::ArgAction::Set)]
    pub warmup: bool,

    /// Roster members processed concurrently during a rebuild
    #[arg(long, env = "FETCH_CONCURRENCY", default_value = "1")]
    pub fetch_concurrency: usize,

    /// Per-request timeout for upstream calls in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub request_timeout_secs: u64,

    /// Retries after a 429 before giving up
    #[arg(long, env = "MAX_RETRIES", default_value = "3")]
    pub max_retries: u32,

    /// First backoff delay after a 429 in milliseconds, doubled on each retry
    #[arg(long, env = "RETRY_BASE_DELAY_MS", default_value = "1000")]
    pub retry_base_delay_ms: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PUBG_API_KEY is empty or missing")]
    MissingApiKey,

    #[error("ROSTER must name at least one player")]
    EmptyRoster,

    #[error("FETCH_CONCURRENCY must be at least 1")]
    ZeroConcurrency,

    #[error("REQUEST_TIMEOUT_SECS must be at least 1")]
    ZeroTimeout,

    #[error("invalid listen address {0}")]
    InvalidAddr(String),
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.roster_names().is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        if self.fetch_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        self.listen_addr()?;
        Ok(())
    }

    pub fn api_key(&self) -> &str {
        self.pubg_api_key.trim()
    }

    /// Roster with surrounding whitespace and blank entries removed.
    pub fn roster_names(&self) -> Vec<String> {
        self.roster
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.bind_host, self.port);
        raw.parse().map_err(|_| ConfigError::InvalidAddr(raw))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
            multiplier: 2,
        }
    }
}

fn parse_min_date(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid MIN_DATE {s:?}: {e}"))
}

/// Parse a duration string made of one or more `<number><unit>` parts,
/// e.g. "500ms", "90s", "10m", "1h30m", "1.5h". Units: ms, s, m, h.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut total_nanos = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return Err(format!("invalid duration {s:?}: expected a number"));
        }
        let value: f64 = rest[..num_len]
            .parse()
            .map_err(|_| format!("invalid duration {s:?}: bad number"))?;
        rest = &rest[num_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit_nanos = match &rest[..unit_len] {
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            "" => return Err(format!("invalid duration {s:?}: missing unit")),
            other => return Err(format!("invalid duration {s:?}: unknown unit {other:?}")),
        };
        rest = &rest[unit_len..];
        total_nanos += value * unit_nanos;
    }

    Ok(Duration::from_nanos(total_nanos.round() as u64))
}
