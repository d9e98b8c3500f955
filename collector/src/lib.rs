//! Organization contribution collector
//!
//! Computes, for every contributor to a GitHub organization, the total number
//! of changed lines (additions plus deletions) across the organization's
//! repositories.
//!
//! Uses hexagonal (ports & adapters) architecture:
//! - `domain`: entities and the port traits the engine depends on
//! - `app`: pagination, backoff, retrieval, scheduling and aggregation
//! - `adapters`: the reqwest GitHub client and the tracing event sink

pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;

#[cfg(test)]
mod test_utils;

pub use adapters::{GitHubClientImpl, NoopEvents, TracingEvents};
pub use app::{CollectorService, RepositoryFilter, Strategy};
pub use config::CollectorConfig;
pub use domain::entities::{IdentityDetails, IdentityKind, Summary};
pub use error::{CollectError, ConfigError, GitHubError};
