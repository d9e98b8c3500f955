//! Observability port
//!
//! The engine reports what it is doing through this port instead of holding
//! any global logger state.

use std::time::Duration;

use serde::Serialize;

use super::github::PendingReason;

/// Structured events emitted during a collection run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CollectorEvent {
    RepositoriesListed {
        organization: String,
        total: usize,
        selected: usize,
    },
    RepositoryStarted {
        repository: String,
    },
    RepositoryFinished {
        repository: String,
        contributors: usize,
    },
    PageFetched {
        label: String,
        page: usize,
        items: usize,
    },
    RetryScheduled {
        label: String,
        attempt: u32,
        reason: PendingReason,
        delay: Duration,
    },
    FatalError {
        label: String,
        message: String,
    },
}

/// Port trait for recording collector events
pub trait CollectorEvents: Send + Sync {
    fn record(&self, event: CollectorEvent);
}
