//! Wire shapes for the subset of the GitHub REST v3 API the service reads.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Per-language byte counts for one repository, as returned by
/// `GET /repos/{owner}/{repo}/languages`.
pub type LanguageBytes = BTreeMap<String, u64>;

#[derive(Debug, Clone, Deserialize)]
pub struct RepoOwner {
    pub login: String,
}

/// An entry from `GET /users/{username}/repos`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    pub owner: RepoOwner,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub stargazers_count: u64,
}

/// The fields of `GET /repos/{owner}/{repo}` the issue source needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoDetails {
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLabel {
    pub name: String,
}

/// An entry from `GET /repos/{owner}/{repo}/issues`. Pull requests come back
/// from the same endpoint and carry a `pull_request` object.
#[derive(Debug, Clone, Deserialize)]
pub struct RawIssue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub labels: Vec<RawLabel>,
    #[serde(default)]
    /// Only the count matters, so entries stay untyped.
    pub assignees: Vec<serde_json::Value>,
    pub pull_request: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitHubErrorBody {
    pub message: String,
}
