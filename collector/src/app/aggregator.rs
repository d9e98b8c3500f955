//! Identity aggregator
//!
//! Folds ledger fragments into one ledger. Totals are plain sums per identity
//! key, so the order in which fragments arrive does not change the result.

use std::collections::{BTreeMap, HashMap};

use crate::domain::entities::{IdentityDetails, IdentityKind, LedgerFragment, Summary};
use crate::error::CollectError;

/// Cumulative changed lines per identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionLedger {
    identity_kind: IdentityKind,
    totals: HashMap<String, u64>,
    identities: BTreeMap<String, IdentityDetails>,
    repositories: usize,
}

impl ContributionLedger {
    pub fn new(identity_kind: IdentityKind) -> Self {
        Self {
            identity_kind,
            totals: HashMap::new(),
            identities: BTreeMap::new(),
            repositories: 0,
        }
    }

    pub fn identity_kind(&self) -> IdentityKind {
        self.identity_kind
    }

    /// Total for `identity`; an identity never seen has contributed zero
    pub fn total(&self, identity: &str) -> u64 {
        self.totals.get(identity).copied().unwrap_or(0)
    }

    pub fn repositories(&self) -> usize {
        self.repositories
    }

    /// Add one repository's fragment
    pub fn fold(&mut self, fragment: LedgerFragment) -> Result<(), CollectError> {
        if fragment.identity_kind() != self.identity_kind {
            return Err(CollectError::MixedIdentityKeys {
                ledger: self.identity_kind,
                fragment: fragment.identity_kind(),
            });
        }

        match fragment {
            LedgerFragment::Weekly { by_login, .. } => {
                for (login, weeks) in by_login {
                    let changes: u64 = weeks
                        .iter()
                        .filter(|w| w.has_commits())
                        .map(|w| w.changes())
                        .sum();
                    *self.totals.entry(login).or_insert(0) += changes;
                }
            }
            LedgerFragment::History { commits, .. } => {
                for commit in commits {
                    *self.totals.entry(commit.author.email.clone()).or_insert(0) +=
                        commit.changes();

                    let details = self.identities.entry(commit.author.email).or_default();
                    if !commit.author.name.is_empty() {
                        details.names.insert(commit.author.name);
                    }
                    if let Some(login) = commit.author.login {
                        details.logins.insert(login);
                    }
                }
            }
        }

        self.repositories += 1;
        Ok(())
    }

    pub fn into_summary(self) -> Summary {
        let identities = match self.identity_kind {
            IdentityKind::Email => Some(self.identities),
            IdentityKind::Login => None,
        };
        Summary {
            identity_kind: self.identity_kind,
            totals: self.totals,
            identities,
            repositories: self.repositories,
        }
    }
}
