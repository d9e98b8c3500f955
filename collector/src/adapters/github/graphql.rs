//! GraphQL commit history query
//!
//! Request and response shapes for walking a repository's default branch.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::entities::{AuthorRef, CommitRecord};
use crate::domain::ports::{Page, PageCursor, PendingReason, Readiness};
use crate::error::GitHubError;

const HISTORY_QUERY: &str = r#"
query($owner: String!, $name: String!, $first: Int!, $after: String) {
  repository(owner: $owner, name: $name) {
    isEmpty
    defaultBranchRef {
      target {
        ... on Commit {
          history(first: $first, after: $after) {
            totalCount
            pageInfo {
              hasNextPage
              endCursor
            }
            nodes {
              oid
              additions
              deletions
              author {
                name
                email
                user {
                  login
                }
              }
            }
          }
        }
      }
    }
  }
}
"#;

/// Helper to deserialize null as default (empty string, etc.)
fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Serialize)]
pub(crate) struct GraphQlRequest<V> {
    query: &'static str,
    variables: V,
}

#[derive(Serialize)]
pub(crate) struct HistoryVariables<'a> {
    pub owner: &'a str,
    pub name: &'a str,
    pub first: u32,
    pub after: Option<&'a str>,
}

pub(crate) fn history_request(variables: HistoryVariables<'_>) -> GraphQlRequest<HistoryVariables<'_>> {
    GraphQlRequest {
        query: HISTORY_QUERY,
        variables,
    }
}

#[derive(Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

/// Unwrap `data`, turning reported `errors` into a failure
pub(crate) fn into_data<T>(response: GraphQlResponse<T>) -> Result<T, GitHubError> {
    if !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(GitHubError::GraphQl(messages.join("; ")));
    }
    response
        .data
        .ok_or_else(|| GitHubError::GraphQl("response carried neither data nor errors".to_string()))
}

#[derive(Deserialize)]
pub(crate) struct HistoryData {
    repository: Option<RepositoryNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    is_empty: bool,
    default_branch_ref: Option<BranchRef>,
}

#[derive(Deserialize)]
struct BranchRef {
    target: Option<CommitTarget>,
}

#[derive(Deserialize)]
struct CommitTarget {
    history: Option<History>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct History {
    total_count: u64,
    page_info: PageInfo,
    nodes: Vec<CommitNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Deserialize)]
struct CommitNode {
    oid: String,
    additions: u64,
    deletions: u64,
    author: Option<GitActor>,
}

#[derive(Deserialize)]
struct GitActor {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    name: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    email: String,
    user: Option<UserRef>,
}

#[derive(Deserialize)]
struct UserRef {
    login: String,
}

/// Convert a history response into a page, or a pending signal when the
/// branch target has not materialized yet
pub(crate) fn history_page(
    owner: &str,
    repo: &str,
    data: HistoryData,
) -> Result<Readiness<Page<CommitRecord>>, GitHubError> {
    let endpoint = format!("graphql history of {}/{}", owner, repo);
    let repository = data
        .repository
        .ok_or_else(|| GitHubError::NotFound(format!("{}/{}", owner, repo)))?;

    if repository.is_empty {
        return Ok(Readiness::Ready(Page {
            items: Vec::new(),
            next: None,
            total_count: Some(0),
        }));
    }

    let history = match repository
        .default_branch_ref
        .and_then(|b| b.target)
        .and_then(|t| t.history)
    {
        Some(history) => history,
        None => return Ok(Readiness::Pending(PendingReason::Unmaterialized)),
    };

    let next = match (history.page_info.has_next_page, history.page_info.end_cursor) {
        (true, Some(cursor)) => Some(PageCursor::After(cursor)),
        (true, None) => {
            return Err(GitHubError::Schema {
                endpoint,
                message: "hasNextPage without endCursor".to_string(),
            })
        }
        (false, _) => None,
    };

    let items = history
        .nodes
        .into_iter()
        .map(|node| -> Result<CommitRecord, GitHubError> {
            let author = node.author.ok_or_else(|| GitHubError::Schema {
                endpoint: endpoint.clone(),
                message: format!("commit {} has no author", node.oid),
            })?;
            Ok(CommitRecord {
                sha: node.oid,
                additions: node.additions,
                deletions: node.deletions,
                author: AuthorRef {
                    name: author.name,
                    email: author.email,
                    login: author.user.map(|u| u.login),
                },
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Readiness::Ready(Page {
        items,
        next,
        total_count: Some(history.total_count),
    }))
}
