use tracing::debug;

use crate::discourse::normalize::{array_at, normalize_posts, normalize_topic};
use crate::discourse::{Fetcher, Post, QueryContext, Topic};
use crate::error::Result;

/// A topic and the posts embedded in its `/t/{id}.json` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicWithPosts {
    /// `None` when the topic is missing, unavailable or malformed.
    pub topic: Option<Topic>,
    pub posts: Vec<Post>,
}

/// Fetch a single topic by id.
///
/// # Errors
///
/// Returns an error on configuration, network or JSON decode failures.
pub async fn get_topic(fetcher: &Fetcher, ctx: &QueryContext, id: i64) -> Result<TopicWithPosts> {
    let payload = fetcher.fetch(ctx, &format!("/t/{id}.json"), &[]).await?;
    let topic = normalize_topic(&payload);
    let posts = normalize_posts(array_at(&payload, "/post_stream/posts"));
    debug!(topic_id = id, found = topic.is_some(), posts = posts.len(), "Fetched topic");
    Ok(TopicWithPosts { topic, posts })
}
