//! Shared constants used across the crate.

/// User agent sent with every forum request.
pub const USER_AGENT: &str = concat!("discourse-ingest/", env!("CARGO_PKG_VERSION"));

/// `Api-Username` sent when an API key is configured without a username.
pub const DEFAULT_API_USERNAME: &str = "system";

/// Fixed page size of `/search.json`, independent of the monitor batch size.
pub const SEARCH_PAGE_SIZE: u64 = 20;

/// How far back the first realtime poll looks when no watermark exists yet.
pub const REALTIME_LOOKBACK_SECS: i64 = 3600;
