use thiserror::Error;

/// Failures that escape the ingestion core.
///
/// HTTP-level failures (rate limiting, non-2xx statuses) are not represented
/// here: the fetcher degrades those to an empty payload. Only configuration,
/// transport and decode failures reach the caller.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to decode JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl IngestError {
    /// Whether the failure happened at the transport layer (timeout, connect, body read).
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Whether the failure was a timeout on the underlying request.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network { source, .. } if source.is_timeout())
    }

    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
