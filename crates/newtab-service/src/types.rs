//! Reports produced by the new-tab operations

use crate::error::Result;
use image_cache_db::{CacheStats, DeleteOutcome};
use serde::Serialize;

/// Outcome of one populate cycle, one entry per fetch+insert iteration
#[derive(Debug)]
pub struct PopulateReport {
    pub url: String,
    pub results: Vec<Result<i64>>,
}

impl PopulateReport {
    /// Ids of the images that made it into the store
    pub fn inserted_ids(&self) -> Vec<i64> {
        self.results
            .iter()
            .filter_map(|r| r.as_ref().ok().copied())
            .collect()
    }

    pub fn inserted(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_err()).count()
    }
}

/// Outcome of one prune cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    /// Retention cap applied; `None` when the cycle was skipped
    pub cap: Option<usize>,
    /// Records present when the cycle started
    pub before: usize,
    pub outcome: DeleteOutcome,
}

impl PruneReport {
    pub fn skipped() -> Self {
        Self::default()
    }

    pub fn is_skipped(&self) -> bool {
        self.cap.is_none()
    }
}

/// Where the rendered background came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Selection {
    Cached { id: i64 },
    /// Live fetch, taken because the cache was empty or could not be read
    Fallback {
        /// Set when the cache could not be read
        #[serde(skip_serializing_if = "Option::is_none")]
        store_error: Option<String>,
    },
}

impl Selection {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Selection::Fallback { .. })
    }

    /// Why the cache was bypassed, if it failed rather than being empty
    pub fn store_error(&self) -> Option<&str> {
        match self {
            Selection::Fallback { store_error } => store_error.as_deref(),
            Selection::Cached { .. } => None,
        }
    }
}

/// Joined outcome of the three tasks fired for one new tab
#[derive(Debug)]
pub struct NewTabReport {
    pub selection: Result<Selection>,
    pub populate: Result<PopulateReport>,
    pub prune: Result<PruneReport>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub cache: CacheStats,
}
