//! Caller-owned continuation state for the monitor and search operations.
//!
//! Both serialize with a `phase` tag so callers can persist them verbatim
//! between invocations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a monitor session is: paging through history, or polling for new topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum MonitorState {
    Historical {
        /// Topics emitted so far during backfill.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        progress: Option<u64>,
    },
    Realtime {
        /// Watermark: topics created at or before this instant were already seen.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_checked: Option<DateTime<Utc>>,
    },
}

impl Default for MonitorState {
    fn default() -> Self {
        Self::Historical { progress: None }
    }
}

impl MonitorState {
    #[must_use]
    pub fn is_realtime(&self) -> bool {
        matches!(self, Self::Realtime { .. })
    }
}

/// Progress through a paginated search. `None` in place of a state means
/// "start from the first page" going in and "no further pages" coming out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum SearchState {
    Historical {
        /// Topics returned so far across all pages.
        progress: u64,
    },
}

impl SearchState {
    #[must_use]
    pub fn progress(&self) -> u64 {
        match self {
            Self::Historical { progress } => *progress,
        }
    }
}

/// Zero-based page index given the records already consumed.
pub(crate) fn page_index(progress: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    progress / page_size
}
