use async_trait::async_trait;
use metrics::counter;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

use crate::config::FetcherConfig;
use crate::identity::Identity;

/// Terminal result of one `fetch` call, after all retries are spent. Only
/// `Ok` carries a body onwards to extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Ok(String),
    RateLimited,
    Timeout,
    Transport(String),
}

impl FetchOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, FetchOutcome::Ok(_))
    }
}

/// Maps an attempt index to the delay before the next attempt. Kept as its
/// own object so tests can exercise the schedule without real time.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    base_delay: Duration,
    retry_delay: Duration,
}

impl BackoffPolicy {
    pub fn new(base_delay: Duration, retry_delay: Duration) -> Self {
        Self {
            base_delay,
            retry_delay,
        }
    }

    pub fn from_config(config: &FetcherConfig) -> Self {
        Self::new(
            Duration::from_millis(config.base_backoff_ms),
            Duration::from_millis(config.retry_delay_ms),
        )
    }

    /// Delay after the given 429 attempt (1-based). Strictly increasing so
    /// consecutive hits back off harder each time.
    pub fn rate_limit_delay(&self, attempt: u32) -> Duration {
        self.base_delay * attempt.max(1)
    }

    /// Fixed delay after a transport failure or unexpected status.
    pub fn transport_delay(&self) -> Duration {
        self.retry_delay
    }
}

/// Sleep indirection so retry tests run instantly.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Performs one logical fetch with up to `max_attempts` network attempts.
/// Always returns within `max_attempts * (timeout + max backoff)`.
pub struct RetryingFetcher {
    policy: BackoffPolicy,
    max_attempts: u32,
    request_timeout: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryingFetcher {
    pub fn new(config: &FetcherConfig) -> Self {
        Self::with_sleeper(config, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(config: &FetcherConfig, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            policy: BackoffPolicy::from_config(config),
            max_attempts: config.max_attempts.max(1),
            request_timeout: Duration::from_secs(config.request_timeout),
            sleeper,
        }
    }

    pub async fn fetch(&self, url: &str, identity: &Identity) -> FetchOutcome {
        let mut last = FetchOutcome::Transport("no attempts made".to_string());

        for attempt in 1..=self.max_attempts {
            counter!("argus_fetch_attempts_total").increment(1);
            last = self.attempt(url, identity).await;

            match &last {
                FetchOutcome::Ok(_) => return last,
                FetchOutcome::RateLimited => {
                    tracing::warn!(%url, attempt, "source rate limited the request");
                    if attempt < self.max_attempts {
                        self.sleeper.sleep(self.policy.rate_limit_delay(attempt)).await;
                    }
                }
                FetchOutcome::Timeout => {
                    tracing::warn!(%url, attempt, "request exceeded per-attempt timeout");
                    if attempt < self.max_attempts {
                        self.sleeper.sleep(self.policy.transport_delay()).await;
                    }
                }
                FetchOutcome::Transport(reason) => {
                    tracing::warn!(%url, attempt, %reason, "request failed, retrying");
                    if attempt < self.max_attempts {
                        self.sleeper.sleep(self.policy.transport_delay()).await;
                    }
                }
            }
        }

        counter!("argus_fetch_exhausted_total").increment(1);
        last
    }

    /// One network attempt, classified. Each attempt builds a fresh client
    /// so the identity's proxy applies to exactly this request and no
    /// cookies leak between sources.
    async fn attempt(&self, url: &str, identity: &Identity) -> FetchOutcome {
        let mut builder = reqwest::Client::builder()
            .user_agent(identity.user_agent.clone())
            .timeout(self.request_timeout);

        if let Some(proxy_url) = &identity.proxy_endpoint {
            match reqwest::Proxy::all(proxy_url.as_str()) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => return FetchOutcome::Transport(format!("invalid proxy: {}", e)),
            }
        }

        let client = match builder.build() {
            Ok(client) => client,
            Err(e) => return FetchOutcome::Transport(format!("client build failed: {}", e)),
        };

        match client.get(url).send().await {
            Ok(response) if response.status() == StatusCode::OK => match response.text().await {
                Ok(body) => FetchOutcome::Ok(body),
                Err(e) => FetchOutcome::Transport(format!("body read failed: {}", e)),
            },
            Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                FetchOutcome::RateLimited
            }
            Ok(response) => FetchOutcome::Transport(format!("status {}", response.status())),
            Err(e) if e.is_timeout() => FetchOutcome::Timeout,
            Err(e) => FetchOutcome::Transport(e.to_string()),
        }
    }
}
