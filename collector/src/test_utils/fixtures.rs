//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.

use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};

use crate::domain::entities::{
    AuthorRef, CommitRecord, LedgerFragment, Repository, WeeklyContribution,
};
use crate::domain::ports::ContributorActivity;

/// Monday 2020-09-21, the first week used in weekly fixtures
const FIRST_WEEK: i64 = 1_600_646_400;
const WEEK_SECS: i64 = 7 * 24 * 60 * 60;

/// Create a test repository; the id is derived from the name
pub fn test_repository(name: &str) -> Repository {
    let id = name
        .bytes()
        .fold(17i64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as i64));
    Repository {
        id,
        name: name.to_string(),
        url: format!("https://api.test/repos/acme/{}", name),
    }
}

/// Consecutive weeks built from `(additions, deletions, commits)`
pub fn test_weeks(weeks: &[(u64, u64, u64)]) -> Vec<WeeklyContribution> {
    weeks
        .iter()
        .enumerate()
        .map(|(i, &(additions, deletions, commits))| WeeklyContribution {
            week_start: Utc
                .timestamp_opt(FIRST_WEEK + i as i64 * WEEK_SECS, 0)
                .unwrap(),
            additions,
            deletions,
            commits,
        })
        .collect()
}

/// Create contributor statistics; `None` stands for a deleted account
pub fn test_activity(login: Option<&str>, weeks: &[(u64, u64, u64)]) -> ContributorActivity {
    ContributorActivity {
        login: login.map(str::to_string),
        weeks: test_weeks(weeks),
    }
}

/// Create a commit by the given author
pub fn test_commit(
    sha: &str,
    name: &str,
    email: &str,
    login: Option<&str>,
    additions: u64,
    deletions: u64,
) -> CommitRecord {
    CommitRecord {
        sha: sha.to_string(),
        additions,
        deletions,
        author: AuthorRef {
            name: name.to_string(),
            email: email.to_string(),
            login: login.map(str::to_string),
        },
    }
}

/// Create a weekly fragment from `(login, weeks)` pairs
pub fn weekly_fragment(repository: &str, contributors: &[(&str, &[(u64, u64, u64)])]) -> LedgerFragment {
    let mut by_login: BTreeMap<String, Vec<WeeklyContribution>> = BTreeMap::new();
    for (login, weeks) in contributors {
        by_login
            .entry(login.to_string())
            .or_default()
            .extend(test_weeks(weeks));
    }
    LedgerFragment::Weekly {
        repository: test_repository(repository),
        by_login,
    }
}

pub fn history_fragment(repository: &str, commits: Vec<CommitRecord>) -> LedgerFragment {
    LedgerFragment::History {
        repository: test_repository(repository),
        commits,
    }
}
