//! Ingestion core for a Discourse forum's JSON API.
//!
//! Every operation takes a [`QueryContext`] and, where it pages, the caller's
//! previous continuation state. Nothing is cached between calls: the caller
//! owns the state and decides when to call again.

mod context;
mod fetcher;
mod models;
mod monitor;
mod normalize;
mod search;
mod state;
mod topic;

pub use context::QueryContext;
pub use fetcher::{empty_payload, Fetcher, RetryPolicy};
pub use models::{Post, Topic};
pub use monitor::{monitor, monitor_at, MonitorBatch, MonitorParams};
pub use normalize::{normalize_post, normalize_posts, normalize_topic, normalize_topics};
pub use search::{build_search_query, search, SearchPage, SearchParams};
pub use state::{MonitorState, SearchState};
pub use topic::{get_topic, TopicWithPosts};
