//! Mock implementations of port traits
//!
//! In-memory implementations that can be configured for testing. They record
//! every call so tests can verify how often each endpoint was hit.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use super::fixtures::test_repository;
use crate::domain::entities::{CommitRecord, Organization, Repository};
use crate::domain::ports::{
    CollectorEvent, CollectorEvents, ContributorActivity, GitHubClient, Page, PageCursor,
    PendingReason, Readiness,
};
use crate::error::GitHubError;

// ============================================================================
// Scripted GitHub Client
// ============================================================================

type RepoKey = String;
type HistoryPageKey = (RepoKey, usize);

fn repo_key(owner: &str, repo: &str) -> RepoKey {
    format!("{}/{}", owner, repo)
}

/// A mock GitHub client that serves scripted responses and logs requests
///
/// Requests are logged as `org <org>`, `repos <url>`, `stats <owner/repo>`
/// and `history <owner/repo>`.
#[derive(Default)]
pub struct ScriptedGitHubClient {
    requests: Arc<RwLock<Vec<String>>>,
    orgs: Arc<RwLock<HashMap<String, Organization>>>,
    /// Repository listing pages keyed by the org's `repos_url`
    repository_pages: Arc<RwLock<HashMap<String, Vec<Vec<Repository>>>>>,
    stats: Arc<RwLock<HashMap<RepoKey, Vec<ContributorActivity>>>>,
    /// Pending responses still to serve before the stats become ready
    stats_pending: Arc<RwLock<HashMap<RepoKey, u32>>>,
    history: Arc<RwLock<HashMap<RepoKey, Vec<Vec<CommitRecord>>>>>,
    history_pending: Arc<RwLock<HashMap<HistoryPageKey, u32>>>,
    history_totals: Arc<RwLock<HashMap<RepoKey, u64>>>,
    failures: Arc<RwLock<HashSet<RepoKey>>>,
}

impl ScriptedGitHubClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure an organization whose repository listing spans `pages`
    pub fn with_repository_pages(self, org: &str, pages: Vec<Vec<&str>>) -> Self {
        let repos_url = format!("https://api.test/orgs/{}/repos", org);
        {
            let mut orgs = self.orgs.write().unwrap();
            orgs.insert(
                org.to_string(),
                Organization {
                    id: 1,
                    login: org.to_string(),
                    repos_url: repos_url.clone(),
                },
            );
            let pages = pages
                .into_iter()
                .map(|names| names.into_iter().map(test_repository).collect())
                .collect();
            self.repository_pages
                .write()
                .unwrap()
                .insert(repos_url, pages);
        }
        self
    }

    /// Configure ready contributor statistics
    pub fn with_stats(self, owner: &str, repo: &str, activity: Vec<ContributorActivity>) -> Self {
        self.stats
            .write()
            .unwrap()
            .insert(repo_key(owner, repo), activity);
        self
    }

    /// Answer the first `count` stats requests with "still computing"
    pub fn with_stats_pending(self, owner: &str, repo: &str, count: u32) -> Self {
        self.stats_pending
            .write()
            .unwrap()
            .insert(repo_key(owner, repo), count);
        self
    }

    /// Configure the default branch history, one inner vec per page
    pub fn with_history(self, owner: &str, repo: &str, pages: Vec<Vec<CommitRecord>>) -> Self {
        self.history
            .write()
            .unwrap()
            .insert(repo_key(owner, repo), pages);
        self
    }

    /// Answer the first `count` requests for page `page` with a null history
    pub fn with_history_pending(self, owner: &str, repo: &str, page: usize, count: u32) -> Self {
        self.history_pending
            .write()
            .unwrap()
            .insert((repo_key(owner, repo), page), count);
        self
    }

    /// Override the reported history size (defaults to the scripted commit count)
    pub fn with_history_total(self, owner: &str, repo: &str, total: u64) -> Self {
        self.history_totals
            .write()
            .unwrap()
            .insert(repo_key(owner, repo), total);
        self
    }

    /// Make every stats and history request for the repository fail with a 500
    pub fn with_failure(self, owner: &str, repo: &str) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(repo_key(owner, repo));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.read().unwrap().clone()
    }

    /// Number of logged requests equal to `request`
    pub fn request_count(&self, request: &str) -> usize {
        self.requests
            .read()
            .unwrap()
            .iter()
            .filter(|r| r.as_str() == request)
            .count()
    }

    fn log(&self, request: String) {
        self.requests.write().unwrap().push(request);
    }

    fn check_failure(&self, key: &str) -> Result<(), GitHubError> {
        if self.failures.read().unwrap().contains(key) {
            return Err(GitHubError::Api {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }
        Ok(())
    }

    /// Consume one scripted pending response, if any remain
    fn take_pending<K>(pending: &RwLock<HashMap<K, u32>>, key: &K) -> bool
    where
        K: std::hash::Hash + Eq,
    {
        let mut pending = pending.write().unwrap();
        match pending.get_mut(key) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl GitHubClient for ScriptedGitHubClient {
    async fn get_organization(&self, org: &str) -> Result<Organization, GitHubError> {
        self.log(format!("org {}", org));
        self.orgs
            .read()
            .unwrap()
            .get(org)
            .cloned()
            .ok_or_else(|| GitHubError::NotFound(format!("Organization {}", org)))
    }

    async fn list_repositories(&self, url: &str) -> Result<Page<Repository>, GitHubError> {
        self.log(format!("repos {}", url));

        let (base, query) = url.split_once('?').unwrap_or((url, ""));
        let index = query
            .split('&')
            .find_map(|pair| pair.strip_prefix("cursor_page="))
            .map(|n| n.parse::<usize>().unwrap())
            .unwrap_or(0);

        let all_pages = self.repository_pages.read().unwrap();
        let pages = all_pages
            .get(base)
            .ok_or_else(|| GitHubError::NotFound(base.to_string()))?;
        let items = pages.get(index).cloned().unwrap_or_default();
        let next = (index + 1 < pages.len())
            .then(|| PageCursor::NextUrl(format!("{}?cursor_page={}", base, index + 1)));

        Ok(Page {
            items,
            next,
            total_count: None,
        })
    }

    async fn contributor_stats(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Readiness<Vec<ContributorActivity>>, GitHubError> {
        let key = repo_key(owner, repo);
        self.log(format!("stats {}", key));
        self.check_failure(&key)?;

        if Self::take_pending(&self.stats_pending, &key) {
            return Ok(Readiness::Pending(PendingReason::Computing));
        }
        self.stats
            .read()
            .unwrap()
            .get(&key)
            .cloned()
            .map(Readiness::Ready)
            .ok_or(GitHubError::NotFound(key))
    }

    async fn commit_history(
        &self,
        owner: &str,
        repo: &str,
        _page_size: u32,
        after: Option<&str>,
    ) -> Result<Readiness<Page<CommitRecord>>, GitHubError> {
        let key = repo_key(owner, repo);
        self.log(format!("history {}", key));
        self.check_failure(&key)?;

        let index = match after {
            None => 0,
            Some(cursor) => cursor
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| GitHubError::GraphQl(format!("Bad cursor {}", cursor)))?,
        };
        if Self::take_pending(&self.history_pending, &(key.clone(), index)) {
            return Ok(Readiness::Pending(PendingReason::Unmaterialized));
        }

        let history = self.history.read().unwrap();
        let pages = history
            .get(&key)
            .ok_or_else(|| GitHubError::NotFound(key.clone()))?;
        let total = self
            .history_totals
            .read()
            .unwrap()
            .get(&key)
            .copied()
            .unwrap_or_else(|| pages.iter().map(|p| p.len() as u64).sum());

        Ok(Readiness::Ready(Page {
            items: pages.get(index).cloned().unwrap_or_default(),
            next: (index + 1 < pages.len()).then(|| PageCursor::After(format!("page-{}", index + 1))),
            total_count: Some(total),
        }))
    }
}

// ============================================================================
// Recording Events
// ============================================================================

/// Collects every event for later inspection
#[derive(Default)]
pub struct RecordingEvents {
    events: Arc<RwLock<Vec<CollectorEvent>>>,
}

impl RecordingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CollectorEvent> {
        self.events.read().unwrap().clone()
    }

    pub fn retry_count(&self) -> usize {
        self.events
            .read()
            .unwrap()
            .iter()
            .filter(|e| matches!(e, CollectorEvent::RetryScheduled { .. }))
            .count()
    }
}

impl CollectorEvents for RecordingEvents {
    fn record(&self, event: CollectorEvent) {
        self.events.write().unwrap().push(event);
    }
}
