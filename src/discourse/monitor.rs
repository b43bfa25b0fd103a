//! Backfill-then-poll monitor over `/latest.json`.
//!
//! A session starts in the historical phase and pages through
//! `/latest.json` until a page comes back empty. It then switches to the
//! realtime phase, which re-reads the freshest page on every call and emits
//! only topics created after the previous call's watermark.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::constants::REALTIME_LOOKBACK_SECS;
use crate::discourse::normalize::{array_at, normalize_topics};
use crate::discourse::state::page_index;
use crate::discourse::{Fetcher, MonitorState, QueryContext, Topic};
use crate::error::Result;

/// Filters applied to the monitored topic list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorParams {
    /// Restrict to one category id.
    pub category: Option<i64>,
    /// Accepted for callers that route on it; not sent to the forum.
    pub tag: Option<String>,
}

/// Output of one monitor step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorBatch {
    pub items: Vec<Topic>,
    /// Always present: the monitor has no terminal state.
    pub next_state: MonitorState,
}

/// Run one monitor step against the current time.
///
/// # Errors
///
/// Returns an error on configuration, network or JSON decode failures.
pub async fn monitor(
    fetcher: &Fetcher,
    ctx: &QueryContext,
    params: &MonitorParams,
    state: Option<&MonitorState>,
) -> Result<MonitorBatch> {
    monitor_at(fetcher, ctx, params, state, Utc::now()).await
}

/// Run one monitor step with an explicit notion of "now".
///
/// # Errors
///
/// Returns an error on configuration, network or JSON decode failures.
pub async fn monitor_at(
    fetcher: &Fetcher,
    ctx: &QueryContext,
    params: &MonitorParams,
    state: Option<&MonitorState>,
    now: DateTime<Utc>,
) -> Result<MonitorBatch> {
    match state.cloned().unwrap_or_default() {
        MonitorState::Historical { progress } => {
            historical_step(fetcher, ctx, params, progress.unwrap_or(0), now).await
        }
        MonitorState::Realtime { last_checked } => {
            realtime_step(fetcher, ctx, params, last_checked, now).await
        }
    }
}

async fn historical_step(
    fetcher: &Fetcher,
    ctx: &QueryContext,
    params: &MonitorParams,
    progress: u64,
    now: DateTime<Utc>,
) -> Result<MonitorBatch> {
    let page = page_index(progress, u64::from(ctx.batch_size));
    debug!(progress, page, category = ?params.category, "Monitor backfilling");

    let payload = fetcher
        .fetch(
            ctx,
            "/latest.json",
            &[
                ("category", params.category.map(|c| c.to_string())),
                ("page", Some(page.to_string())),
                ("per_page", Some(ctx.batch_size.to_string())),
            ],
        )
        .await?;
    let topics = normalize_topics(array_at(&payload, "/topic_list/topics"));

    if topics.is_empty() {
        info!(progress, "Backfill exhausted, switching to realtime");
        return Ok(MonitorBatch {
            items: Vec::new(),
            next_state: MonitorState::Realtime {
                last_checked: Some(now),
            },
        });
    }

    let progress = progress + topics.len() as u64;
    Ok(MonitorBatch {
        items: topics,
        next_state: MonitorState::Historical {
            progress: Some(progress),
        },
    })
}

async fn realtime_step(
    fetcher: &Fetcher,
    ctx: &QueryContext,
    params: &MonitorParams,
    last_checked: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<MonitorBatch> {
    let watermark =
        last_checked.unwrap_or_else(|| now - Duration::seconds(REALTIME_LOOKBACK_SECS));

    let payload = fetcher
        .fetch(
            ctx,
            "/latest.json",
            &[
                ("category", params.category.map(|c| c.to_string())),
                ("per_page", Some(ctx.batch_size.to_string())),
            ],
        )
        .await?;
    let items: Vec<Topic> = normalize_topics(array_at(&payload, "/topic_list/topics"))
        .into_iter()
        .filter(|topic| topic.created_at > watermark)
        .collect();

    debug!(watermark = %watermark, new_topics = items.len(), "Monitor polled");

    Ok(MonitorBatch {
        items,
        next_state: MonitorState::Realtime {
            last_checked: Some(now),
        },
    })
}
