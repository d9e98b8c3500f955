//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod events;
pub mod github;

pub use events::{NoopEvents, TracingEvents};
pub use github::GitHubClientImpl;
