//! Backoff on PUBG rate limiting.
//!
//! The PUBG API answers with 429 once the per-key request budget is spent.
//! A [`RetryPolicy`] re-issues the request after exponentially growing
//! sleeps; the sleeping itself goes through [`Sleeper`] so tests can run the
//! loop without real timers.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::error::PubgError;

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Result of one attempt, as seen by the retry loop.
pub enum Attempt<T> {
    Done(T),
    RateLimited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based): `base * multiplier^retry`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(retry);
        self.base_delay.saturating_mul(factor)
    }

    /// Run `op` until it returns something other than [`Attempt::RateLimited`],
    /// sleeping between attempts. Errors from `op` are returned immediately.
    pub async fn run<T, F, Fut>(&self, sleeper: &dyn Sleeper, mut op: F) -> Result<T, PubgError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Attempt<T>, PubgError>>,
    {
        let mut retry = 0;
        loop {
            match op().await? {
                Attempt::Done(value) => return Ok(value),
                Attempt::RateLimited if retry < self.max_retries => {
                    let delay = self.delay_for(retry);
                    warn!("429 rate limit hit, backing off {:?}", delay);
                    sleeper.sleep(delay).await;
                    retry += 1;
                }
                Attempt::RateLimited => {
                    return Err(PubgError::RateLimitExhausted {
                        attempts: retry + 1,
                    })
                }
            }
        }
    }
}
