use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::discourse::{monitor, Fetcher, MonitorState};
use crate::state_store::StateStore;

/// Run the monitor forever, persisting its state between steps.
pub async fn poll_loop(fetcher: Fetcher, config: Config, store: StateStore) {
    let mut consecutive_empty = 0u32;
    let base_interval = config.poll_interval;
    let max_interval = Duration::from_secs(300); // 5 minutes max

    loop {
        match poll_once(&fetcher, &config, &store).await {
            Ok(new_count) => {
                if new_count > 0 {
                    info!(new_topics = new_count, "Processed new topics");
                    consecutive_empty = 0;
                } else {
                    consecutive_empty = consecutive_empty.saturating_add(1);
                    debug!(consecutive_empty, "No new topics");
                }
            }
            Err(e) => {
                error!("Poll error: {e:#}");
                consecutive_empty = consecutive_empty.saturating_add(1);
            }
        }

        tokio::time::sleep(next_interval(base_interval, max_interval, consecutive_empty)).await;
    }
}

/// Advance the monitor one step and save the state it hands back.
///
/// Returns the number of topics emitted by this step.
///
/// # Errors
///
/// Returns an error if the state cannot be loaded or saved, or the monitor
/// step itself fails.
pub async fn poll_once(fetcher: &Fetcher, config: &Config, store: &StateStore) -> Result<usize> {
    let state = store.load().await?;
    let batch = monitor(
        fetcher,
        &config.query_context(),
        &config.monitor_params(),
        state.as_ref(),
    )
    .await
    .context("Monitor step failed")?;

    for topic in &batch.items {
        info!(
            topic_id = topic.id,
            title = %topic.title,
            created_at = %topic.created_at,
            posts = topic.posts_count,
            "Topic"
        );
    }

    if !state.as_ref().is_some_and(MonitorState::is_realtime) && batch.next_state.is_realtime() {
        info!("Historical backfill complete, now polling for new topics");
    }

    store.save(&batch.next_state).await?;
    Ok(batch.items.len())
}

/// Adaptive polling: back off when steps keep coming back empty.
fn next_interval(base: Duration, max: Duration, consecutive_empty: u32) -> Duration {
    if consecutive_empty > 10 {
        max.min(base * 2)
    } else if consecutive_empty > 5 {
        max.min(base.mul_f32(1.5))
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_interval() {
        let base = Duration::from_secs(60);
        let max = Duration::from_secs(300);
        assert_eq!(next_interval(base, max, 0), base);
        assert_eq!(next_interval(base, max, 6), Duration::from_secs(90));
        assert_eq!(next_interval(base, max, 11), Duration::from_secs(120));
        assert_eq!(
            next_interval(Duration::from_secs(200), max, 11),
            Duration::from_secs(300)
        );
    }
}
