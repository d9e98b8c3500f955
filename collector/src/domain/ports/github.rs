//! GitHub client port trait
//!
//! Defines the interface the engine needs from the remote code-hosting API.
//! Implementations validate response shapes and hand back domain types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{CommitRecord, Organization, Repository, WeeklyContribution};
use crate::error::GitHubError;

/// Position of the next page in a paginated listing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageCursor {
    /// Absolute URL taken from a `Link: <...>; rel="next"` header
    NextUrl(String),
    /// Opaque token passed back as the `after` argument of the next query
    After(String),
}

impl std::fmt::Display for PageCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageCursor::NextUrl(url) => write!(f, "{}", url),
            PageCursor::After(token) => write!(f, "after:{}", token),
        }
    }
}

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `None` once the listing is exhausted
    pub next: Option<PageCursor>,
    /// Collection size as reported by the remote side, if it reports one
    pub total_count: Option<u64>,
}

/// Why the remote side could not answer yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingReason {
    /// Explicit "processing" status while an aggregate is computed in the background
    Computing,
    /// Successful response with the expected nested field still null
    Unmaterialized,
}

impl std::fmt::Display for PendingReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PendingReason::Computing => write!(f, "computing"),
            PendingReason::Unmaterialized => write!(f, "unmaterialized"),
        }
    }
}

/// Response of an endpoint that may not have its data ready yet
#[derive(Debug, Clone, PartialEq)]
pub enum Readiness<T> {
    Ready(T),
    Pending(PendingReason),
}

/// Weekly statistics of one contributor to a repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorActivity {
    /// `None` when the contributing account no longer exists
    pub login: Option<String>,
    pub weeks: Vec<WeeklyContribution>,
}

/// Port trait for GitHub API operations
#[async_trait]
pub trait GitHubClient: Send + Sync {
    /// Get an organization's details
    async fn get_organization(&self, org: &str) -> Result<Organization, GitHubError>;

    /// Fetch one page of repositories from an absolute listing URL
    async fn list_repositories(&self, url: &str) -> Result<Page<Repository>, GitHubError>;

    /// Get weekly contribution statistics per contributor
    ///
    /// The remote side computes these on first access and answers
    /// `Pending(Computing)` until done.
    async fn contributor_stats(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Readiness<Vec<ContributorActivity>>, GitHubError>;

    /// Fetch one page of the default branch's commit history
    ///
    /// Answers `Pending(Unmaterialized)` while the branch target is missing
    /// from an otherwise valid response.
    async fn commit_history(
        &self,
        owner: &str,
        repo: &str,
        page_size: u32,
        after: Option<&str>,
    ) -> Result<Readiness<Page<CommitRecord>>, GitHubError>;
}
