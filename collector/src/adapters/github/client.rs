//! GitHub API client implementation

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, LINK, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use urlencoding::encode;

use super::graphql::{self, HistoryData, HistoryVariables};
use crate::domain::entities::{CommitRecord, Organization, Repository, WeeklyContribution};
use crate::domain::ports::{
    ContributorActivity, GitHubClient, Page, PageCursor, PendingReason, Readiness,
};
use crate::error::GitHubError;

/// Implementation of the GitHub API client
pub struct GitHubClientImpl {
    http: Client,
    base_url: String,
}

impl GitHubClientImpl {
    /// Create a client that identifies itself as `username` and authenticates with `token`
    pub fn new(base_url: &str, username: &str, token: &str) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("token {}", token))
                .map_err(|_| GitHubError::InvalidHeader("authorization token".to_string()))?,
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(username)
                .map_err(|_| GitHubError::InvalidHeader(format!("user agent {:?}", username)))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        let http = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map non-success statuses to errors, leaving successful responses untouched
    async fn check_status(
        &self,
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GitHubError> {
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else if status == StatusCode::UNAUTHORIZED {
            Err(GitHubError::Unauthorized)
        } else if status == StatusCode::NOT_FOUND {
            Err(GitHubError::NotFound(endpoint.to_string()))
        } else if status == StatusCode::TOO_MANY_REQUESTS || is_rate_limit_exhausted(&response) {
            Err(GitHubError::RateLimited)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(GitHubError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn parse_body<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<T, GitHubError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| GitHubError::Schema {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<T, GitHubError> {
        let response = self.check_status(endpoint, response).await?;
        self.parse_body(endpoint, response).await
    }
}

/// GitHub answers 403 instead of 429 when the primary rate limit is used up
fn is_rate_limit_exhausted(response: &reqwest::Response) -> bool {
    response.status() == StatusCode::FORBIDDEN
        && response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            == Some("0")
}

/// Extract the `rel="next"` target from a `Link` header
pub(crate) fn next_link(header: &str) -> Option<String> {
    let re = regex::Regex::new(r#"<([^>]+)>\s*;\s*rel="next""#).ok()?;
    re.captures(header)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Response types from the GitHub REST API
#[derive(Deserialize)]
struct OrganizationResponse {
    id: i64,
    login: String,
    repos_url: String,
}

impl From<OrganizationResponse> for Organization {
    fn from(r: OrganizationResponse) -> Self {
        Organization {
            id: r.id,
            login: r.login,
            repos_url: r.repos_url,
        }
    }
}

#[derive(Deserialize)]
struct RepositoryResponse {
    id: i64,
    name: String,
    url: String,
}

impl From<RepositoryResponse> for Repository {
    fn from(r: RepositoryResponse) -> Self {
        Repository {
            id: r.id,
            name: r.name,
            url: r.url,
        }
    }
}

#[derive(Deserialize)]
struct ContributorStatsResponse {
    weeks: Vec<WeekResponse>,
    author: Option<StatsAuthorResponse>,
}

#[derive(Deserialize)]
struct StatsAuthorResponse {
    login: String,
}

#[derive(Deserialize)]
struct WeekResponse {
    w: i64,
    a: u64,
    d: u64,
    c: u64,
}

impl WeekResponse {
    fn into_weekly(self, endpoint: &str) -> Result<WeeklyContribution, GitHubError> {
        let week_start: DateTime<Utc> =
            Utc.timestamp_opt(self.w, 0)
                .single()
                .ok_or_else(|| GitHubError::Schema {
                    endpoint: endpoint.to_string(),
                    message: format!("week timestamp {} out of range", self.w),
                })?;
        Ok(WeeklyContribution {
            week_start,
            additions: self.a,
            deletions: self.d,
            commits: self.c,
        })
    }
}

#[async_trait]
impl GitHubClient for GitHubClientImpl {
    async fn get_organization(&self, org: &str) -> Result<Organization, GitHubError> {
        let endpoint = format!("/orgs/{}", encode(org));
        let resp = self.http.get(self.api_url(&endpoint)).send().await?;

        let org: OrganizationResponse = self.handle_response(&endpoint, resp).await?;
        Ok(org.into())
    }

    async fn list_repositories(&self, url: &str) -> Result<Page<Repository>, GitHubError> {
        tracing::debug!(url = %url, "Retrieving page of repositories");
        let resp = self.http.get(url).send().await?;
        let resp = self.check_status(url, resp).await?;

        let next = resp
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_link)
            .map(PageCursor::NextUrl);

        let repos: Vec<RepositoryResponse> = self.parse_body(url, resp).await?;
        Ok(Page {
            items: repos.into_iter().map(|r| r.into()).collect(),
            next,
            total_count: None,
        })
    }

    async fn contributor_stats(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Readiness<Vec<ContributorActivity>>, GitHubError> {
        let endpoint = format!("/repos/{}/{}/stats/contributors", encode(owner), encode(repo));
        let resp = self.http.get(self.api_url(&endpoint)).send().await?;

        // 202 means the statistics are being computed in the background
        if resp.status() == StatusCode::ACCEPTED {
            return Ok(Readiness::Pending(PendingReason::Computing));
        }
        // 204 is returned for repositories without any commits
        if resp.status() == StatusCode::NO_CONTENT {
            return Ok(Readiness::Ready(Vec::new()));
        }

        let stats: Vec<ContributorStatsResponse> = self.handle_response(&endpoint, resp).await?;
        let activity = stats
            .into_iter()
            .map(|s| -> Result<ContributorActivity, GitHubError> {
                let weeks = s
                    .weeks
                    .into_iter()
                    .map(|w| w.into_weekly(&endpoint))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ContributorActivity {
                    login: s.author.map(|a| a.login),
                    weeks,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Readiness::Ready(activity))
    }

    async fn commit_history(
        &self,
        owner: &str,
        repo: &str,
        page_size: u32,
        after: Option<&str>,
    ) -> Result<Readiness<Page<CommitRecord>>, GitHubError> {
        let endpoint = "/graphql";
        let body = graphql::history_request(HistoryVariables {
            owner,
            name: repo,
            first: page_size,
            after,
        });

        let resp = self
            .http
            .post(self.api_url(endpoint))
            .json(&body)
            .send()
            .await?;

        let data: HistoryData = graphql::into_data(self.handle_response(endpoint, resp).await?)?;
        graphql::history_page(owner, repo, data)
    }
}
