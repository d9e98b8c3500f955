//! Collector service
//!
//! Wires the lister, the retriever for the configured strategy, the scheduler
//! and the ledger into one run.

use std::sync::Arc;

use super::aggregator::ContributionLedger;
use super::repository_lister::{RepositoryFilter, RepositoryLister};
use super::retriever::{retriever_for, ContributionRetriever};
use super::scheduler::{RateLimitedClient, Scheduler};
use crate::config::CollectorConfig;
use crate::domain::entities::Summary;
use crate::domain::ports::{CollectorEvent, CollectorEvents, GitHubClient};
use crate::error::CollectError;

/// Service for summarizing an organization's contributions
pub struct CollectorService<GC>
where
    GC: GitHubClient + ?Sized + 'static,
{
    lister: RepositoryLister<RateLimitedClient<GC>>,
    retriever: Arc<dyn ContributionRetriever>,
    scheduler: Scheduler,
    events: Arc<dyn CollectorEvents>,
}

impl<GC> CollectorService<GC>
where
    GC: GitHubClient + ?Sized + 'static,
{
    /// Every request made through the service shares one rate limiter
    pub fn new(github: Arc<GC>, config: &CollectorConfig, events: Arc<dyn CollectorEvents>) -> Self {
        let github = Arc::new(RateLimitedClient::new(github, config.max_per_second));
        let retriever = retriever_for(
            config.strategy,
            Arc::clone(&github),
            config.backoff(),
            Arc::clone(&events),
            config.page_size,
        );

        Self {
            lister: RepositoryLister::new(github, Arc::clone(&events), config.page_size),
            retriever,
            scheduler: Scheduler::new(config.max_in_flight, Arc::clone(&events)),
            events,
        }
    }

    /// Total changed lines per identity across the selected repositories of `org`
    ///
    /// Any repository failure fails the whole run; no partial summary is returned.
    pub async fn summarize(
        &self,
        org: &str,
        filter: &RepositoryFilter,
    ) -> Result<Summary, CollectError> {
        let repositories = match self.lister.list_filtered(org, filter).await {
            Ok(repositories) => repositories,
            Err(error) => {
                self.events.record(CollectorEvent::FatalError {
                    label: format!("{} repositories", org),
                    message: error.to_string(),
                });
                return Err(error);
            }
        };
        tracing::debug!(organization = %org, repositories = repositories.len(), "Scheduling retrieval");

        let mut ledger = ContributionLedger::new(self.retriever.identity_kind());
        let folded = self
            .scheduler
            .run(org, repositories, Arc::clone(&self.retriever), |fragment| {
                ledger.fold(fragment)
            })
            .await?;

        let summary = ledger.into_summary();
        tracing::info!(
            organization = %org,
            repositories = folded,
            identities = summary.totals.len(),
            changes = summary.total_changes(),
            identity_kind = %summary.identity_kind,
            "Collection finished"
        );
        Ok(summary)
    }
}
