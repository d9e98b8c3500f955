//! Organization and repository descriptions

use serde::{Deserialize, Serialize};

/// Organization detail, the entry point for repository enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub login: String,
    /// Absolute URL of the organization's repository listing
    pub repos_url: String,
}

/// A repository belonging to an organization
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Repository {
    pub id: i64,
    pub name: String,
    pub url: String,
}

impl Repository {
    /// `owner/name` slug used in API paths and log output
    pub fn slug(&self, owner: &str) -> String {
        format!("{}/{}", owner, self.name)
    }
}
