//! Unified error types for the contribution collector
//!
//! This module defines error types for each layer:
//! - `GitHubError`: GitHub API client errors (transport and HTTP status)
//! - `CollectError`: Engine errors (exhausted backoff, integrity violations)
//! - `ConfigError`: Invalid configuration values

use thiserror::Error;

use crate::domain::entities::IdentityKind;

/// GitHub API client errors
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("Request failed")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Unauthorized - invalid token")]
    Unauthorized,

    /// The response did not match the expected shape for its endpoint
    #[error("Unexpected response shape from {endpoint}: {message}")]
    Schema { endpoint: String, message: String },

    #[error("GraphQL query failed: {0}")]
    GraphQl(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

/// Engine errors raised while collecting contributions
#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    /// The remote side kept reporting "not ready" until attempts ran out
    #[error("{label} was still not ready after {attempts} attempts")]
    UnreadyExhausted { label: String, attempts: u32 },

    /// Paginated results were missed or duplicated
    #[error("Integrity violation in {label}: {message}")]
    Integrity { label: String, message: String },

    #[error("Cannot fold a fragment keyed by {fragment} into a ledger keyed by {ledger}")]
    MixedIdentityKeys {
        ledger: IdentityKind,
        fragment: IdentityKind,
    },

    #[error("Retrieval task failed: {0}")]
    Task(String),
}

impl CollectError {
    pub fn integrity(label: impl Into<String>, message: impl Into<String>) -> Self {
        CollectError::Integrity {
            label: label.into(),
            message: message.into(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("{key} must be greater than zero")]
    Zero { key: String },
}
