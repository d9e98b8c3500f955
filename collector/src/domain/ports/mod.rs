//! Domain ports (traits)
//!
//! Port traits define interfaces that the engine requires.
//! Adapters provide concrete implementations of these traits.

pub mod events;
pub mod github;

pub use events::{CollectorEvent, CollectorEvents};
pub use github::{ContributorActivity, GitHubClient, Page, PageCursor, PendingReason, Readiness};
