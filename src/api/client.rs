//! Helium API client.

use super::converter::{HotspotResponse, RewardResponse};
use super::{DataConverter, DataSource};
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::state::{Address, HotspotInfo, RewardTotal, RewardWindow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Timestamp layout the rewards endpoint expects.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Builder for creating a Helium client.
pub struct HeliumClientBuilder {
    config: ApiConfig,
}

impl HeliumClientBuilder {
    /// Create a new builder with default config.
    pub fn new() -> Self {
        Self {
            config: ApiConfig::default(),
        }
    }

    /// Set the API configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HeliumClient> {
        HeliumClient::new(self.config)
    }
}

impl Default for HeliumClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client for the Helium API.
///
/// Cheap to share behind an `Arc`; every poller of every address goes
/// through the same connection pool and rate limiter.
pub struct HeliumClient {
    config: ApiConfig,
    http: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl HeliumClient {
    /// Create a new client.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        let rate_limiter = Arc::new(Mutex::new(RateLimiter::new(config.rate_limit)));

        Ok(Self {
            config,
            http,
            rate_limiter,
        })
    }

    /// URL of the hotspot resource.
    fn hotspot_url(&self, address: &Address) -> String {
        format!(
            "{}/v1/hotspots/{}",
            self.config.base_url.trim_end_matches('/'),
            address
        )
    }

    /// URL of the reward sum resource.
    fn reward_sum_url(&self, address: &Address) -> String {
        format!("{}/rewards/sum", self.hotspot_url(address))
    }

    /// GET `url` and decode a JSON body, failing on any non-2xx status.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.rate_limit().await?;

        debug!(url, "GET");
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Apply rate limiting.
    async fn rate_limit(&self) -> Result<()> {
        let mut limiter = self.rate_limiter.lock().await;
        limiter.wait().await
    }
}

fn format_time(time: DateTime<Utc>) -> String {
    time.format(TIME_FORMAT).to_string()
}

#[async_trait]
impl DataSource for HeliumClient {
    async fn fetch_metadata(&self, address: &Address) -> Result<HotspotInfo> {
        let response: HotspotResponse = self.get_json(&self.hotspot_url(address), &[]).await?;
        Ok(DataConverter::convert_hotspot(response))
    }

    async fn fetch_reward_total(
        &self,
        address: &Address,
        window: RewardWindow,
    ) -> Result<RewardTotal> {
        let (min_time, max_time) = window.bounds(Utc::now());
        let query = [
            ("max_time", format_time(max_time)),
            ("min_time", format_time(min_time)),
        ];

        let response: RewardResponse = self
            .get_json(&self.reward_sum_url(address), &query)
            .await?;
        DataConverter::convert_reward(window, response, (min_time, max_time))
    }
}

/// Simple token-bucket rate limiter.
struct RateLimiter {
    requests_per_second: u32,
    last_request: Instant,
    tokens: f64,
}

impl RateLimiter {
    fn new(requests_per_second: u32) -> Self {
        let requests_per_second = requests_per_second.max(1);
        Self {
            requests_per_second,
            last_request: Instant::now(),
            tokens: requests_per_second as f64,
        }
    }

    async fn wait(&mut self) -> Result<()> {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_request).as_secs_f64();

        // Replenish tokens
        self.tokens = (self.tokens + elapsed * self.requests_per_second as f64)
            .min(self.requests_per_second as f64);

        if self.tokens < 1.0 {
            let wait_time = (1.0 - self.tokens) / self.requests_per_second as f64;
            tokio::time::sleep(Duration::from_secs_f64(wait_time)).await;
            self.tokens = 1.0;
        }

        self.tokens -= 1.0;
        self.last_request = Instant::now();

        Ok(())
    }
}
