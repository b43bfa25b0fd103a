use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A forum discussion thread, as normalized from any topic-bearing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub posts_count: u64,
    pub views: Option<u64>,
    pub like_count: u64,
    pub created_at: DateTime<Utc>,
    pub last_posted_at: Option<DateTime<Utc>>,
    pub category_id: Option<i64>,
    pub tags: Vec<String>,
}

/// One message within a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub topic_id: i64,
    pub username: String,
    /// Rendered HTML (`cooked`), or the search preview (`blurb`) when that is all we have.
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub like_count: u64,
}
