//! Application layer
//!
//! The collection engine: pagination, backoff, per-repository retrieval,
//! scheduling and aggregation. Everything here depends on the domain ports
//! only, never on a concrete adapter.

pub mod aggregator;
pub mod backoff;
pub mod collector_service;
pub mod pagination;
pub mod repository_lister;
pub mod retriever;
pub mod scheduler;

pub use aggregator::ContributionLedger;
pub use backoff::Backoff;
pub use collector_service::CollectorService;
pub use pagination::{PageSource, Paginator};
pub use repository_lister::{RepositoryFilter, RepositoryLister};
pub use retriever::{
    retriever_for, CommitHistoryRetriever, ContributionRetriever, Strategy, WeeklyStatsRetriever,
};
pub use scheduler::{RateLimitedClient, Scheduler};
