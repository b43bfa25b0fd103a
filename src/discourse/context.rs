use std::time::Duration;

/// Per-call settings for talking to the forum.
///
/// Supplied fresh on every invocation and only read, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryContext {
    /// Forum root, e.g. `https://forum.example.com`.
    pub base_url: String,
    /// Hard deadline for each HTTP attempt.
    pub timeout: Duration,
    /// Monitor page size.
    pub batch_size: u32,
    pub api_key: Option<String>,
    pub api_username: Option<String>,
}

impl QueryContext {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            batch_size: 30,
            api_key: None,
            api_username: None,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn with_credentials(
        mut self,
        api_key: impl Into<String>,
        api_username: Option<String>,
    ) -> Self {
        self.api_key = Some(api_key.into());
        self.api_username = api_username;
        self
    }
}
