use std::collections::HashSet;
use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::issue::CandidateIssue;

/// A row of the `issues` snapshot table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StoredIssue {
    pub id: i64,
    pub title: String,
    pub url: String,
    /// `owner/name`
    pub repo: String,
    pub number: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&CandidateIssue> for StoredIssue {
    fn from(issue: &CandidateIssue) -> Self {
        Self {
            id: i64::try_from(issue.issue_id).unwrap_or(i64::MAX),
            title: issue.issue_title.clone(),
            url: issue.issue_url.clone(),
            repo: issue.repository_full_name(),
            number: i64::try_from(issue.issue_number).unwrap_or(i64::MAX),
            created_at: issue.date_created,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeSet {
    pub added: Vec<StoredIssue>,
    pub removed: Vec<StoredIssue>,
}

impl ChangeSet {
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// Diffs two snapshots by issue id. Each side keeps its source order.
pub fn detect_changes(stored: &[StoredIssue], fresh: &[StoredIssue]) -> ChangeSet {
    let stored_ids: HashSet<i64> = stored.iter().map(|i| i.id).collect();
    let fresh_ids: HashSet<i64> = fresh.iter().map(|i| i.id).collect();

    ChangeSet {
        added: fresh
            .iter()
            .filter(|i| !stored_ids.contains(&i.id))
            .cloned()
            .collect(),
        removed: stored
            .iter()
            .filter(|i| !fresh_ids.contains(&i.id))
            .cloned()
            .collect(),
    }
}

/// Stored snapshot reconciled against a fetch that may be partial.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub changes: ChangeSet,
    /// Rows to persist: the fresh issues plus the stored rows of unavailable
    /// repositories.
    pub snapshot: Vec<StoredIssue>,
}

/// Diffs only repositories that answered. Stored rows whose `repo` is listed
/// in `unavailable` are carried over unchanged and never reported removed.
pub fn reconcile(
    stored: &[StoredIssue],
    fresh: Vec<StoredIssue>,
    unavailable: &[String],
) -> Reconciliation {
    let (carried, comparable): (Vec<StoredIssue>, Vec<StoredIssue>) = stored
        .iter()
        .cloned()
        .partition(|issue| unavailable.contains(&issue.repo));

    let changes = detect_changes(&comparable, &fresh);
    let mut snapshot = fresh;
    snapshot.extend(carried);
    Reconciliation { changes, snapshot }
}

/// Plain-text notification body. Empty sections are omitted.
pub fn render_digest(changes: &ChangeSet) -> String {
    let mut body = String::from("Good first issue updates\n");

    if !changes.added.is_empty() {
        let _ = writeln!(body, "\nNew issues ({}):", changes.added.len());
        for issue in &changes.added {
            let _ = writeln!(body, "- [{}] {}\n  {}", issue.repo, issue.title, issue.url);
        }
    }
    if !changes.removed.is_empty() {
        let _ = writeln!(body, "\nNo longer available ({}):", changes.removed.len());
        for issue in &changes.removed {
            let _ = writeln!(body, "- [{}] {}", issue.repo, issue.title);
        }
    }
    if !changes.has_changes() {
        body.push_str("\nNo changes since the last digest.\n");
    }
    body
}
