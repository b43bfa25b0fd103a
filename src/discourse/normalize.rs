//! Raw forum JSON to typed records.
//!
//! Records that fail validation are logged and dropped; list forms never fail
//! as a whole and keep the relative order of the valid entries.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::discourse::{Post, Topic};

/// Wire shape of a topic; optional fields carry their defaults here.
#[derive(Debug, Deserialize)]
struct RawTopic {
    id: i64,
    title: String,
    slug: String,
    posts_count: u64,
    #[serde(default)]
    views: Option<u64>,
    #[serde(default)]
    like_count: Option<u64>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    last_posted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    category_id: Option<i64>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

impl From<RawTopic> for Topic {
    fn from(raw: RawTopic) -> Self {
        Self {
            id: raw.id,
            title: raw.title,
            slug: raw.slug,
            posts_count: raw.posts_count,
            views: raw.views,
            like_count: raw.like_count.unwrap_or(0),
            created_at: raw.created_at,
            last_posted_at: raw.last_posted_at,
            category_id: raw.category_id,
            tags: raw.tags.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPost {
    id: i64,
    topic_id: i64,
    username: String,
    #[serde(default)]
    cooked: Option<String>,
    #[serde(default)]
    blurb: Option<String>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    like_count: Option<u64>,
}

impl From<RawPost> for Post {
    fn from(raw: RawPost) -> Self {
        Self {
            id: raw.id,
            topic_id: raw.topic_id,
            username: raw.username,
            content: raw.cooked.or(raw.blurb),
            created_at: raw.created_at,
            like_count: raw.like_count.unwrap_or(0),
        }
    }
}

/// Normalize one raw topic record, or `None` if it is malformed.
#[must_use]
pub fn normalize_topic(raw: &Value) -> Option<Topic> {
    match RawTopic::deserialize(raw) {
        Ok(topic) => Some(topic.into()),
        Err(e) => {
            warn!(id = ?raw.get("id"), error = %e, "Dropping invalid topic record");
            None
        }
    }
}

/// Normalize one raw post record, or `None` if it is malformed.
#[must_use]
pub fn normalize_post(raw: &Value) -> Option<Post> {
    match RawPost::deserialize(raw) {
        Ok(post) => Some(post.into()),
        Err(e) => {
            warn!(id = ?raw.get("id"), error = %e, "Dropping invalid post record");
            None
        }
    }
}

#[must_use]
pub fn normalize_topics(raw: &[Value]) -> Vec<Topic> {
    raw.iter().filter_map(normalize_topic).collect()
}

#[must_use]
pub fn normalize_posts(raw: &[Value]) -> Vec<Post> {
    raw.iter().filter_map(normalize_post).collect()
}

/// Array at a JSON pointer, or an empty slice if it is absent or not an array.
pub(crate) fn array_at<'a>(payload: &'a Value, pointer: &str) -> &'a [Value] {
    payload
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}
