//! Rate-limited scheduler
//!
//! Runs one retrieval task per repository. Two limits apply:
//! - `RateLimitedClient` paces every outbound request through one shared
//!   limiter, so the requests-per-second ceiling holds across all tasks
//! - `Scheduler` caps how many repositories are in flight at once
//!
//! Completed fragments are handed to a single fold in arrival order. The first
//! fatal error aborts every task still running.

use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::retriever::ContributionRetriever;
use crate::domain::entities::{CommitRecord, LedgerFragment, Organization, Repository};
use crate::domain::ports::{
    CollectorEvent, CollectorEvents, ContributorActivity, GitHubClient, Page, Readiness,
};
use crate::error::{CollectError, GitHubError};

pub const DEFAULT_MAX_PER_SECOND: u32 = 5;
pub const DEFAULT_MAX_IN_FLIGHT: usize = 16;

/// GitHub client that waits for the shared rate limiter before every request
pub struct RateLimitedClient<GC: ?Sized> {
    inner: Arc<GC>,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl<GC> RateLimitedClient<GC>
where
    GC: GitHubClient + ?Sized,
{
    /// Allow at most `max_per_second` requests per second, without bursts
    pub fn new(inner: Arc<GC>, max_per_second: NonZeroU32) -> Self {
        let quota = Quota::per_second(max_per_second).allow_burst(NonZeroU32::MIN);
        Self {
            inner,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    async fn acquire(&self) {
        self.limiter.until_ready().await;
    }
}

#[async_trait]
impl<GC> GitHubClient for RateLimitedClient<GC>
where
    GC: GitHubClient + ?Sized,
{
    async fn get_organization(&self, org: &str) -> Result<Organization, GitHubError> {
        self.acquire().await;
        self.inner.get_organization(org).await
    }

    async fn list_repositories(&self, url: &str) -> Result<Page<Repository>, GitHubError> {
        self.acquire().await;
        self.inner.list_repositories(url).await
    }

    async fn contributor_stats(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Readiness<Vec<ContributorActivity>>, GitHubError> {
        self.acquire().await;
        self.inner.contributor_stats(owner, repo).await
    }

    async fn commit_history(
        &self,
        owner: &str,
        repo: &str,
        page_size: u32,
        after: Option<&str>,
    ) -> Result<Readiness<Page<CommitRecord>>, GitHubError> {
        self.acquire().await;
        self.inner
            .commit_history(owner, repo, page_size, after)
            .await
    }
}

/// Fans retrieval out over all repositories
pub struct Scheduler {
    max_in_flight: usize,
    events: Arc<dyn CollectorEvents>,
}

impl Scheduler {
    pub fn new(max_in_flight: usize, events: Arc<dyn CollectorEvents>) -> Self {
        Self {
            max_in_flight: max_in_flight.max(1),
            events,
        }
    }

    /// Retrieve every repository and pass each fragment to `on_fragment`
    ///
    /// Returns the number of repositories folded. On the first error, the
    /// remaining tasks are aborted and the error is returned.
    pub async fn run<R, F>(
        &self,
        owner: &str,
        repositories: Vec<Repository>,
        retriever: Arc<R>,
        mut on_fragment: F,
    ) -> Result<usize, CollectError>
    where
        R: ContributionRetriever + ?Sized + 'static,
        F: FnMut(LedgerFragment) -> Result<(), CollectError>,
    {
        let semaphore = Arc::new(Semaphore::new(self.max_in_flight));
        let mut join_set: JoinSet<(String, Result<LedgerFragment, CollectError>)> = JoinSet::new();

        for repository in repositories {
            let owner = owner.to_string();
            let retriever = Arc::clone(&retriever);
            let semaphore = Arc::clone(&semaphore);

            join_set.spawn(async move {
                let slug = repository.slug(&owner);
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (
                            slug,
                            Err(CollectError::Task("Semaphore closed unexpectedly".to_string())),
                        )
                    }
                };
                let result = retriever.fetch(&owner, &repository).await;
                (slug, result)
            });
        }

        let mut folded = 0;
        while let Some(joined) = join_set.join_next().await {
            let (slug, result) = match joined {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    join_set.abort_all();
                    let error = CollectError::Task(join_error.to_string());
                    self.report_fatal("scheduler", &error);
                    return Err(error);
                }
            };

            let folded_result = result.and_then(&mut on_fragment);
            if let Err(error) = folded_result {
                join_set.abort_all();
                self.report_fatal(&slug, &error);
                return Err(error);
            }
            folded += 1;
        }

        Ok(folded)
    }

    fn report_fatal(&self, label: &str, error: &CollectError) {
        self.events.record(CollectorEvent::FatalError {
            label: label.to_string(),
            message: error.to_string(),
        });
    }
}
