use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// An open, unassigned good-first-issue eligible for recommendation.
/// Built per request by the issue source and discarded after the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateIssue {
    pub issue_id: u64,
    pub issue_url: String,
    pub repository_owner: String,
    pub repository_name: String,
    pub repository_topics: Vec<String>,
    /// GitHub's primary language for the repository, or `"Unknown"`.
    pub primary_language: String,
    pub all_languages: Vec<String>,
    pub issue_number: u64,
    pub issue_title: String,
    pub issue_body: String,
    pub issue_labels: Vec<String>,
    pub number_of_assignees: usize,
    pub date_created: DateTime<Utc>,
    pub days_open: i64,
}

impl CandidateIssue {
    pub fn repository_full_name(&self) -> String {
        format!("{}/{}", self.repository_owner, self.repository_name)
    }
}
