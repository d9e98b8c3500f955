//! Contribution records
//!
//! Two shapes of contribution data come back from the remote API: weekly
//! aggregates per contributor login, and individual commits of the default
//! branch with their author identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One week of aggregated contribution by a single contributor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyContribution {
    pub week_start: DateTime<Utc>,
    pub additions: u64,
    pub deletions: u64,
    pub commits: u64,
}

impl WeeklyContribution {
    /// Changed lines in this week (additions plus deletions)
    pub fn changes(&self) -> u64 {
        self.additions + self.deletions
    }

    /// Weeks without commits are noise in the remote aggregate and never count
    pub fn has_commits(&self) -> bool {
        self.commits > 0
    }
}

/// Author identity as recorded on a commit
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorRef {
    pub name: String,
    pub email: String,
    /// Platform account, absent when the commit email is not linked to one
    pub login: Option<String>,
}

/// A single commit of a repository's default branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    pub additions: u64,
    pub deletions: u64,
    pub author: AuthorRef,
}

impl CommitRecord {
    pub fn changes(&self) -> u64 {
        self.additions + self.deletions
    }
}
