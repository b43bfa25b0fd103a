//! Single logical GET against the forum's JSON endpoints.
//!
//! | Condition | Action |
//! |-----------|--------|
//! | HTTP 2xx | Decode body as JSON (decode failure is an error) |
//! | HTTP 429 | Retry after 1s, 2s, 4s; then return the empty payload |
//! | Other HTTP status | Log, return the empty payload |
//! | Timeout / connection failure | Error, no retry |

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

use crate::constants::{DEFAULT_API_USERNAME, USER_AGENT};
use crate::discourse::QueryContext;
use crate::error::{IngestError, Result};

/// Backoff schedule for rate-limited (HTTP 429) responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the `attempt`-th (zero-based) rate-limited response.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Neutral payload returned when the forum is unavailable or rate limits us.
///
/// Shaped so that every caller finds an empty collection at the path it
/// reads, whichever endpoint was requested.
#[must_use]
pub fn empty_payload() -> Value {
    json!({
        "post_stream": { "posts": [] },
        "topic_list": { "topics": [] }
    })
}

/// HTTP client wrapper that applies the forum's headers and retry policy.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl Fetcher {
    /// Build a fetcher with the default retry policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| IngestError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client))
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Fetch `path` relative to the context's base URL and decode the JSON body.
    ///
    /// Query parameters whose value is `None` are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Config`] for an unusable base URL,
    /// [`IngestError::Network`] on timeout or transport failure and
    /// [`IngestError::Decode`] when a successful response is not JSON.
    pub async fn fetch(
        &self,
        ctx: &QueryContext,
        path: &str,
        params: &[(&str, Option<String>)],
    ) -> Result<Value> {
        let url = build_url(&ctx.base_url, path)?;
        let query: Vec<(&str, &str)> = params
            .iter()
            .filter_map(|(name, value)| value.as_deref().map(|v| (*name, v)))
            .collect();

        let mut attempt = 0;
        loop {
            let mut request = self
                .client
                .get(url.clone())
                .timeout(ctx.timeout)
                .header(ACCEPT, "application/json")
                .query(&query);
            if let Some(api_key) = &ctx.api_key {
                let username = ctx.api_username.as_deref().unwrap_or(DEFAULT_API_USERNAME);
                request = request
                    .header("Api-Key", api_key)
                    .header("Api-Username", username);
            }

            debug!(url = %url, attempt, "Fetching forum JSON");
            let response = request.send().await.map_err(|source| IngestError::Network {
                url: url.to_string(),
                source,
            })?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt >= self.retry.max_retries {
                    warn!(
                        url = %url,
                        attempts = attempt + 1,
                        "Rate limit retries exhausted, returning empty payload"
                    );
                    return Ok(empty_payload());
                }
                let delay = self.retry.delay_for(attempt);
                warn!(url = %url, attempt, ?delay, "Rate limited, backing off");
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            if !status.is_success() {
                warn!(url = %url, status = %status, "Forum request failed, returning empty payload");
                return Ok(empty_payload());
            }

            let body = response.bytes().await.map_err(|source| IngestError::Network {
                url: url.to_string(),
                source,
            })?;
            return serde_json::from_slice(&body).map_err(|source| IngestError::Decode {
                url: url.to_string(),
                source,
            });
        }
    }
}

/// Join the base URL and an absolute endpoint path.
fn build_url(base_url: &str, path: &str) -> Result<Url> {
    let base = base_url.trim_end_matches('/');
    if base.is_empty() {
        return Err(IngestError::Config("base URL is not set".to_string()));
    }
    let path = path.trim_start_matches('/');
    Url::parse(&format!("{base}/{path}"))
        .map_err(|e| IngestError::Config(format!("invalid base URL {base_url:?}: {e}")))
}
