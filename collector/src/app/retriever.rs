//! Contribution retrievers
//!
//! Two strategies produce a ledger fragment for one repository:
//! - `WeeklyStatsRetriever`: the remote weekly statistics, keyed by login
//! - `CommitHistoryRetriever`: every commit of the default branch, keyed by email
//!
//! Neither touches shared mutable state, so any number can run concurrently.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::backoff::Backoff;
use super::pagination::{PageSource, Paginator};
use crate::domain::entities::{CommitRecord, IdentityKind, LedgerFragment, Repository};
use crate::domain::ports::{CollectorEvent, CollectorEvents, GitHubClient, Page, PageCursor};
use crate::error::CollectError;

/// Login used for statistics whose author account no longer exists
pub const GHOST_LOGIN: &str = "ghost";

/// Which contribution capability of the remote API to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    #[default]
    WeeklyStats,
    FullHistory,
}

impl Strategy {
    pub fn identity_kind(self) -> IdentityKind {
        match self {
            Strategy::WeeklyStats => IdentityKind::Login,
            Strategy::FullHistory => IdentityKind::Email,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::WeeklyStats => write!(f, "weekly"),
            Strategy::FullHistory => write!(f, "history"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" | "weekly-stats" | "stats" => Ok(Strategy::WeeklyStats),
            "history" | "full-history" | "commits" => Ok(Strategy::FullHistory),
            _ => Err(format!("Unknown retrieval strategy: {}", s)),
        }
    }
}

/// Per-repository contribution retrieval
#[async_trait]
pub trait ContributionRetriever: Send + Sync {
    /// Key space of the fragments this retriever produces
    fn identity_kind(&self) -> IdentityKind;

    /// Retrieve the contributions to `repository` of organization `owner`
    async fn fetch(
        &self,
        owner: &str,
        repository: &Repository,
    ) -> Result<LedgerFragment, CollectError>;
}

/// Build the retriever for `strategy`
pub fn retriever_for<GC>(
    strategy: Strategy,
    github: Arc<GC>,
    backoff: Backoff,
    events: Arc<dyn CollectorEvents>,
    page_size: u32,
) -> Arc<dyn ContributionRetriever>
where
    GC: GitHubClient + ?Sized + 'static,
{
    match strategy {
        Strategy::WeeklyStats => Arc::new(WeeklyStatsRetriever::new(github, backoff, events)),
        Strategy::FullHistory => Arc::new(CommitHistoryRetriever::new(
            github, backoff, events, page_size,
        )),
    }
}

/// Retrieves the remote weekly statistics per contributor login
pub struct WeeklyStatsRetriever<GC: ?Sized> {
    github: Arc<GC>,
    backoff: Backoff,
    events: Arc<dyn CollectorEvents>,
}

impl<GC> WeeklyStatsRetriever<GC>
where
    GC: GitHubClient + ?Sized,
{
    pub fn new(github: Arc<GC>, backoff: Backoff, events: Arc<dyn CollectorEvents>) -> Self {
        Self {
            github,
            backoff,
            events,
        }
    }
}

#[async_trait]
impl<GC> ContributionRetriever for WeeklyStatsRetriever<GC>
where
    GC: GitHubClient + ?Sized,
{
    fn identity_kind(&self) -> IdentityKind {
        IdentityKind::Login
    }

    async fn fetch(
        &self,
        owner: &str,
        repository: &Repository,
    ) -> Result<LedgerFragment, CollectError> {
        let slug = repository.slug(owner);
        self.events.record(CollectorEvent::RepositoryStarted {
            repository: slug.clone(),
        });

        let activity = self
            .backoff
            .run(&slug, self.events.as_ref(), || {
                self.github.contributor_stats(owner, &repository.name)
            })
            .await?;

        let mut by_login: BTreeMap<String, Vec<_>> = BTreeMap::new();
        for contributor in activity {
            let login = contributor
                .login
                .unwrap_or_else(|| GHOST_LOGIN.to_string());
            by_login
                .entry(login)
                .or_default()
                .extend(contributor.weeks.into_iter().filter(|w| w.has_commits()));
        }

        let fragment = LedgerFragment::Weekly {
            repository: repository.clone(),
            by_login,
        };
        self.events.record(CollectorEvent::RepositoryFinished {
            repository: slug,
            contributors: fragment.contributor_count(),
        });
        Ok(fragment)
    }
}

/// Walks the default branch history and returns every commit
pub struct CommitHistoryRetriever<GC: ?Sized> {
    github: Arc<GC>,
    backoff: Backoff,
    events: Arc<dyn CollectorEvents>,
    page_size: u32,
}

impl<GC> CommitHistoryRetriever<GC>
where
    GC: GitHubClient + ?Sized,
{
    pub fn new(
        github: Arc<GC>,
        backoff: Backoff,
        events: Arc<dyn CollectorEvents>,
        page_size: u32,
    ) -> Self {
        Self {
            github,
            backoff,
            events,
            page_size,
        }
    }
}

/// Cursor-paginated history of one repository, each page guarded by the backoff
struct HistoryPages<'a, GC: ?Sized> {
    github: &'a GC,
    backoff: &'a Backoff,
    events: &'a dyn CollectorEvents,
    owner: &'a str,
    repo: &'a str,
    label: &'a str,
    page_size: u32,
}

#[async_trait]
impl<GC> PageSource<CommitRecord> for HistoryPages<'_, GC>
where
    GC: GitHubClient + ?Sized,
{
    async fn fetch_page(
        &self,
        cursor: Option<&PageCursor>,
    ) -> Result<Page<CommitRecord>, CollectError> {
        let after = match cursor {
            None => None,
            Some(PageCursor::After(token)) => Some(token.as_str()),
            Some(other) => {
                return Err(CollectError::integrity(
                    self.label,
                    format!("unexpected cursor {}", other),
                ))
            }
        };

        self.backoff
            .run(self.label, self.events, || {
                self.github
                    .commit_history(self.owner, self.repo, self.page_size, after)
            })
            .await
    }
}

#[async_trait]
impl<GC> ContributionRetriever for CommitHistoryRetriever<GC>
where
    GC: GitHubClient + ?Sized,
{
    fn identity_kind(&self) -> IdentityKind {
        IdentityKind::Email
    }

    async fn fetch(
        &self,
        owner: &str,
        repository: &Repository,
    ) -> Result<LedgerFragment, CollectError> {
        let slug = repository.slug(owner);
        self.events.record(CollectorEvent::RepositoryStarted {
            repository: slug.clone(),
        });

        let source = HistoryPages {
            github: self.github.as_ref(),
            backoff: &self.backoff,
            events: self.events.as_ref(),
            owner,
            repo: &repository.name,
            label: &slug,
            page_size: self.page_size,
        };
        let commits = Paginator::new(&source, slug.as_str(), self.events.as_ref())
            .collect_all()
            .await?;

        let fragment = LedgerFragment::History {
            repository: repository.clone(),
            commits,
        };
        self.events.record(CollectorEvent::RepositoryFinished {
            repository: slug,
            contributors: fragment.contributor_count(),
        });
        Ok(fragment)
    }
}
