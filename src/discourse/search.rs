use chrono::{DateTime, Utc};
use tracing::debug;

use crate::constants::SEARCH_PAGE_SIZE;
use crate::discourse::normalize::{array_at, normalize_posts, normalize_topics};
use crate::discourse::state::page_index;
use crate::discourse::{Fetcher, Post, QueryContext, SearchState, Topic};
use crate::error::Result;

/// A keyword search and its optional filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    /// Appended to the query as `@username`.
    pub username: Option<String>,
    /// Accepted but not applied, neither in the query nor client-side.
    pub min_likes: Option<u64>,
    /// Appended to the query as `after:YYYY-MM-DD`.
    pub after: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    pub topics: Vec<Topic>,
    pub posts: Vec<Post>,
    /// `None` once a page comes back short.
    pub next_state: Option<SearchState>,
}

/// Build the forum query string, folding filters into Discourse search syntax.
#[must_use]
pub fn build_search_query(params: &SearchParams) -> String {
    let mut query = params.query.clone();
    if let Some(username) = &params.username {
        query.push_str(&format!(" @{username}"));
    }
    if let Some(after) = &params.after {
        let iso = after.to_rfc3339();
        let date = iso.split('T').next().unwrap_or(&iso);
        query.push_str(&format!(" after:{date}"));
    }
    query
}

/// Fetch one page of search results.
///
/// # Errors
///
/// Returns an error on configuration, network or JSON decode failures.
pub async fn search(
    fetcher: &Fetcher,
    ctx: &QueryContext,
    params: &SearchParams,
    state: Option<&SearchState>,
) -> Result<SearchPage> {
    let progress = state.map_or(0, SearchState::progress);
    let page = page_index(progress, SEARCH_PAGE_SIZE);
    let query = build_search_query(params);
    debug!(query = %query, page, "Searching forum");

    let payload = fetcher
        .fetch(
            ctx,
            "/search.json",
            &[("q", Some(query)), ("page", Some(page.to_string()))],
        )
        .await?;
    let topics = normalize_topics(array_at(&payload, "/topics"));
    let posts = normalize_posts(array_at(&payload, "/posts"));

    let returned = topics.len() as u64;
    let next_state = (returned >= SEARCH_PAGE_SIZE).then(|| SearchState::Historical {
        progress: progress + returned,
    });

    Ok(SearchPage {
        topics,
        posts,
        next_state,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_plain_query() {
        let params = SearchParams {
            query: "rust async".to_string(),
            ..SearchParams::default()
        };
        assert_eq!(build_search_query(&params), "rust async");
    }

    #[test]
    fn test_query_with_filters() {
        let params = SearchParams {
            query: "tokio".to_string(),
            username: Some("alice".to_string()),
            min_likes: Some(10),
            after: Some(Utc.with_ymd_and_hms(2024, 1, 15, 12, 30, 0).unwrap()),
        };
        assert_eq!(build_search_query(&params), "tokio @alice after:2024-01-15");
    }
}
