//! Ledger fragments and run summaries
//!
//! A fragment is what retrieving a single repository produces. The weekly
//! stats path is keyed by login and the commit history path by email; the two
//! key spaces are never mixed, see `IdentityKind`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::contribution::{CommitRecord, WeeklyContribution};
use super::repository::Repository;

/// Which field groups contributions to a contributor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    /// Platform login (weekly statistics expose no email)
    Login,
    /// Commit author email (logins may be missing on unlinked commits)
    Email,
}

impl std::fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityKind::Login => write!(f, "login"),
            IdentityKind::Email => write!(f, "email"),
        }
    }
}

/// Partial result of retrieving one repository
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerFragment {
    Weekly {
        repository: Repository,
        by_login: BTreeMap<String, Vec<WeeklyContribution>>,
    },
    History {
        repository: Repository,
        commits: Vec<CommitRecord>,
    },
}

impl LedgerFragment {
    pub fn repository(&self) -> &Repository {
        match self {
            LedgerFragment::Weekly { repository, .. } => repository,
            LedgerFragment::History { repository, .. } => repository,
        }
    }

    pub fn identity_kind(&self) -> IdentityKind {
        match self {
            LedgerFragment::Weekly { .. } => IdentityKind::Login,
            LedgerFragment::History { .. } => IdentityKind::Email,
        }
    }

    /// Number of distinct identities that appear in this fragment
    pub fn contributor_count(&self) -> usize {
        match self {
            LedgerFragment::Weekly { by_login, .. } => by_login.len(),
            LedgerFragment::History { commits, .. } => commits
                .iter()
                .map(|c| c.author.email.as_str())
                .collect::<BTreeSet<_>>()
                .len(),
        }
    }
}

/// Every name and login observed for one commit email
///
/// Recorded for manual reconciliation; several emails belonging to the same
/// person are intentionally left separate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDetails {
    pub names: BTreeSet<String>,
    pub logins: BTreeSet<String>,
}

/// Final result of one collection run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub identity_kind: IdentityKind,
    pub totals: HashMap<String, u64>,
    /// Present only for the commit history path
    pub identities: Option<BTreeMap<String, IdentityDetails>>,
    /// Number of repositories folded into this summary
    pub repositories: usize,
}

impl Summary {
    /// Identities ordered by total changes, highest first
    ///
    /// Ties are ordered by identity so that output is stable across runs.
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self
            .totals
            .iter()
            .map(|(identity, total)| (identity.as_str(), *total))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }

    pub fn total_changes(&self) -> u64 {
        self.totals.values().sum()
    }
}
