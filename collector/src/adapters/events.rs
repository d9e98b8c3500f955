//! Collector event sinks
//!
//! `TracingEvents` turns engine events into structured `tracing` records.
//! `NoopEvents` discards them.

use crate::domain::ports::{CollectorEvent, CollectorEvents};

/// Writes collector events through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEvents;

impl CollectorEvents for TracingEvents {
    fn record(&self, event: CollectorEvent) {
        match event {
            CollectorEvent::RepositoriesListed {
                organization,
                total,
                selected,
            } => {
                tracing::info!(
                    organization = %organization,
                    total,
                    selected,
                    "Retrieved organization's repositories"
                );
            }
            CollectorEvent::RepositoryStarted { repository } => {
                tracing::info!(repository = %repository, "Retrieving contributions");
            }
            CollectorEvent::RepositoryFinished {
                repository,
                contributors,
            } => {
                tracing::info!(repository = %repository, contributors, "Retrieved contributions");
            }
            CollectorEvent::PageFetched { label, page, items } => {
                tracing::debug!(label = %label, page, items, "Fetched page");
            }
            CollectorEvent::RetryScheduled {
                label,
                attempt,
                reason,
                delay,
            } => {
                tracing::debug!(
                    label = %label,
                    attempt,
                    reason = %reason,
                    delay_secs = delay.as_secs_f64(),
                    "Backing off before retrying"
                );
            }
            CollectorEvent::FatalError { label, message } => {
                tracing::error!(label = %label, error = %message, "Retrieval failed");
            }
        }
    }
}

/// No-op event sink
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEvents;

impl CollectorEvents for NoopEvents {
    fn record(&self, _event: CollectorEvent) {}
}
