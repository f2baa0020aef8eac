use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::api::StatsApi;
use super::error::PubgError;
use super::models::{MatchDetail, MatchResponse, PlayerRecord, PlayersResponse};
use super::retry::{Attempt, RetryPolicy, Sleeper, TokioSleeper};

const JSON_API: &str = "application/vnd.api+json";

/// Client for the PUBG developer API.
#[derive(Clone)]
pub struct PubgClient {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl PubgClient {
    pub fn new(base_url: &Url, api_key: &str, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .context("API key is not a valid header value")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_API));

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(PubgClient {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            retry,
            sleeper: Arc::new(TokioSleeper),
        })
    }

    pub(crate) fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Send with 429 backoff. `build` is called once per attempt. Connection
    /// failures are returned as-is and anything other than 200 becomes
    /// [`PubgError::Upstream`].
    async fn send<F>(&self, build: F) -> Result<Response, PubgError>
    where
        F: Fn() -> RequestBuilder,
    {
        let resp = self
            .retry
            .run(self.sleeper.as_ref(), || {
                let request = build();
                async move {
                    let resp = request.send().await?;
                    if resp.status() == StatusCode::TOO_MANY_REQUESTS {
                        Ok(Attempt::RateLimited)
                    } else {
                        Ok(Attempt::Done(resp))
                    }
                }
            })
            .await?;

        if resp.status() != StatusCode::OK {
            return Err(PubgError::Upstream {
                status: resp.status(),
            });
        }
        Ok(resp)
    }

    async fn get_json<T, F>(&self, build: F) -> Result<T, PubgError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let body = self.send(build).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl StatsApi for PubgClient {
    async fn find_player(&self, name: &str) -> Result<PlayerRecord, PubgError> {
        let url = format!("{}/players", self.base_url);
        debug!("Looking up PUBG player {}", name);
        let build = || self.http.get(&url).query(&[("filter[playerNames]", name)]);

        let resp: PlayersResponse = match self.get_json(build).await {
            Ok(resp) => resp,
            Err(PubgError::Upstream { status }) if status == StatusCode::NOT_FOUND => {
                return Err(PubgError::PlayerNotFound(name.to_string()))
            }
            Err(e) => return Err(e),
        };
        resp.into_first(name)
    }

    async fn get_match(&self, match_id: &str) -> Result<MatchDetail, PubgError> {
        let url = format!("{}/matches/{}", self.base_url, match_id);
        debug!("Fetching PUBG match {}", match_id);
        let resp: MatchResponse = self.get_json(|| self.http.get(&url)).await?;
        Ok(resp.into_detail())
    }
}
