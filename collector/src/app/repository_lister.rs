//! Repository lister
//!
//! Enumerates every repository of an organization and narrows the result
//! with allow and deny lists.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use async_trait::async_trait;

use super::pagination::{PageSource, Paginator};
use crate::domain::entities::Repository;
use crate::domain::ports::{CollectorEvent, CollectorEvents, GitHubClient, Page, PageCursor};
use crate::error::CollectError;

/// Allow and deny lists of repository names
///
/// A non-empty allow list keeps only the named repositories. The deny list
/// always removes. Names that match no repository have no effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryFilter {
    allow: BTreeSet<String>,
    deny: BTreeSet<String>,
}

impl RepositoryFilter {
    pub fn new<A, D>(allow: A, deny: D) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            allow: allow.into_iter().map(Into::into).collect(),
            deny: deny.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a list file: one name per line, blank lines and `#` comments ignored
    pub fn parse_names(text: &str) -> BTreeSet<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect()
    }

    pub fn is_selected(&self, name: &str) -> bool {
        (self.allow.is_empty() || self.allow.contains(name)) && !self.deny.contains(name)
    }

    pub fn apply(&self, repositories: Vec<Repository>) -> Vec<Repository> {
        repositories
            .into_iter()
            .filter(|r| self.is_selected(&r.name))
            .collect()
    }
}

/// Page source over the link-header paginated repository listing
struct RepositoryPages<'a, GC: ?Sized> {
    github: &'a GC,
    first_url: String,
}

#[async_trait]
impl<GC> PageSource<Repository> for RepositoryPages<'_, GC>
where
    GC: GitHubClient + ?Sized,
{
    async fn fetch_page(
        &self,
        cursor: Option<&PageCursor>,
    ) -> Result<Page<Repository>, CollectError> {
        let url = match cursor {
            None => self.first_url.as_str(),
            Some(PageCursor::NextUrl(url)) => url.as_str(),
            Some(other) => {
                return Err(CollectError::integrity(
                    "repository listing",
                    format!("unexpected cursor {}", other),
                ))
            }
        };
        Ok(self.github.list_repositories(url).await?)
    }
}

/// Lists the repositories of an organization
pub struct RepositoryLister<GC>
where
    GC: GitHubClient + ?Sized,
{
    github: Arc<GC>,
    events: Arc<dyn CollectorEvents>,
    page_size: u32,
}

impl<GC> RepositoryLister<GC>
where
    GC: GitHubClient + ?Sized,
{
    pub fn new(github: Arc<GC>, events: Arc<dyn CollectorEvents>, page_size: u32) -> Self {
        Self {
            github,
            events,
            page_size,
        }
    }

    /// Every repository of `org`, de-duplicated by id
    ///
    /// Pages are requested sorted by full name so that their content does not
    /// shift between requests.
    pub async fn list(&self, org: &str) -> Result<Vec<Repository>, CollectError> {
        let organization = self.github.get_organization(org).await?;
        let source = RepositoryPages {
            github: self.github.as_ref(),
            first_url: format!(
                "{}?type=all&sort=full_name&direction=asc&per_page={}",
                organization.repos_url, self.page_size
            ),
        };

        let label = format!("{} repositories", org);
        let listed = Paginator::new(&source, label, self.events.as_ref())
            .collect_all()
            .await?;

        let mut seen = HashSet::new();
        let repositories: Vec<Repository> = listed
            .into_iter()
            .filter(|r| {
                let first = seen.insert(r.id);
                if !first {
                    tracing::debug!(repository = %r.name, "Skipping repository listed twice");
                }
                first
            })
            .collect();

        Ok(repositories)
    }

    /// Repositories of `org` that pass `filter`, sorted by name
    pub async fn list_filtered(
        &self,
        org: &str,
        filter: &RepositoryFilter,
    ) -> Result<Vec<Repository>, CollectError> {
        let repositories = self.list(org).await?;
        let total = repositories.len();

        let mut selected = filter.apply(repositories);
        selected.sort_by(|a, b| a.name.cmp(&b.name));

        self.events.record(CollectorEvent::RepositoriesListed {
            organization: org.to_string(),
            total,
            selected: selected.len(),
        });

        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::NoopEvents;
    use crate::error::GitHubError;
    use crate::test_utils::{test_repository, RecordingEvents, ScriptedGitHubClient};

    fn names(repos: &[Repository]) -> Vec<&str> {
        repos.iter().map(|r| r.name.as_str()).collect()
    }

    fn repos(names: &[&str]) -> Vec<Repository> {
        names.iter().map(|n| test_repository(n)).collect()
    }

    #[test]
    fn test_allow_and_deny() {
        let filter = RepositoryFilter::new(["a", "b"], ["b"]);
        assert_eq!(names(&filter.apply(repos(&["a", "b", "c"]))), vec!["a"]);
    }

    #[test]
    fn test_empty_allow_keeps_everything_not_denied() {
        let filter = RepositoryFilter::new(Vec::<String>::new(), ["c"]);
        assert_eq!(names(&filter.apply(repos(&["a", "b", "c"]))), vec!["a", "b"]);
    }

    #[test]
    fn test_unknown_names_have_no_effect() {
        let filter = RepositoryFilter::new(["a", "zzz"], ["nope"]);
        assert_eq!(names(&filter.apply(repos(&["a", "b"]))), vec!["a"]);

        let filter = RepositoryFilter::new(Vec::<String>::new(), ["nope"]);
        assert_eq!(names(&filter.apply(repos(&["a", "b"]))), vec!["a", "b"]);
    }

    #[test]
    fn test_names_match_exactly() {
        let filter = RepositoryFilter::new(["Widgets"], Vec::<String>::new());
        assert!(filter.apply(repos(&["widgets", "widgets-old"])).is_empty());
    }

    #[test]
    fn test_parse_names() {
        let names = RepositoryFilter::parse_names("alpha\n  beta  \n\n# retired\ngamma\r\n");
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["alpha", "beta", "gamma"]
        );
    }

    #[tokio::test]
    async fn list_follows_every_page() {
        let github = ScriptedGitHubClient::new()
            .with_repository_pages("acme", vec![vec!["alpha", "beta"], vec!["gamma"], vec!["delta"]]);
        let lister = RepositoryLister::new(Arc::new(github), Arc::new(NoopEvents), 100);

        let listed = lister.list("acme").await.unwrap();

        assert_eq!(names(&listed), vec!["alpha", "beta", "gamma", "delta"]);
    }

    #[tokio::test]
    async fn list_requests_stable_order() {
        let github = Arc::new(
            ScriptedGitHubClient::new().with_repository_pages("acme", vec![vec!["alpha"]]),
        );
        let lister = RepositoryLister::new(github.clone(), Arc::new(NoopEvents), 50);

        lister.list("acme").await.unwrap();

        let requests = github.requests();
        assert!(requests.iter().any(|r| r.contains("sort=full_name")
            && r.contains("direction=asc")
            && r.contains("per_page=50")));
    }

    #[tokio::test]
    async fn list_drops_duplicates() {
        let github = ScriptedGitHubClient::new()
            .with_repository_pages("acme", vec![vec!["alpha", "beta"], vec!["beta", "gamma"]]);
        let lister = RepositoryLister::new(Arc::new(github), Arc::new(NoopEvents), 100);

        let listed = lister.list("acme").await.unwrap();

        assert_eq!(names(&listed), vec!["alpha", "beta", "gamma"]);
    }

    #[tokio::test]
    async fn list_filtered_applies_filter_and_reports() {
        let github = ScriptedGitHubClient::new()
            .with_repository_pages("acme", vec![vec!["c", "a"], vec!["b"]]);
        let events = Arc::new(RecordingEvents::new());
        let lister = RepositoryLister::new(Arc::new(github), events.clone(), 100);

        let selected = lister
            .list_filtered("acme", &RepositoryFilter::new(Vec::<String>::new(), ["b"]))
            .await
            .unwrap();

        assert_eq!(names(&selected), vec!["a", "c"]);
        assert!(events.events().contains(&CollectorEvent::RepositoriesListed {
            organization: "acme".to_string(),
            total: 3,
            selected: 2,
        }));
    }

    #[tokio::test]
    async fn unknown_organization_fails() {
        let lister = RepositoryLister::new(
            Arc::new(ScriptedGitHubClient::new()),
            Arc::new(NoopEvents),
            100,
        );

        let result = lister.list("nobody").await;

        assert!(matches!(
            result,
            Err(CollectError::GitHub(GitHubError::NotFound(_)))
        ));
    }
}
