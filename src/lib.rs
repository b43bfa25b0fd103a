//! Discourse ingestion library.
//!
//! Fetches topics and posts from a Discourse forum's JSON API, normalizes
//! them into typed records, and exposes a topic lookup, a resumable
//! backfill-then-poll monitor, and a paginated search.

pub mod config;
pub mod constants;
pub mod discourse;
pub mod error;
pub mod poller;
pub mod state_store;

pub use error::{IngestError, Result};
