use chrono::{DateTime, Months, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::TrackedRepository;
use crate::github_client::models::{LanguageBytes, RawIssue, RepoDetails};
use crate::github_client::GitHubApi;
use crate::models::issue::{CandidateIssue, UNKNOWN_LANGUAGE};

/// Label substrings that mark an issue as beginner-friendly.
pub const GOOD_FIRST_ISSUE_TOKENS: &[&str] = &[
    "good first issue",
    "good-first-issue",
    "beginner",
    "easy",
    "starter",
    "first-timers-only",
    "help wanted",
];

const SECONDS_PER_DAY: i64 = 86_400;

pub fn has_good_first_issue_label(issue: &RawIssue) -> bool {
    issue.labels.iter().any(|label| {
        let name = label.name.to_lowercase();
        GOOD_FIRST_ISSUE_TOKENS.iter().any(|token| name.contains(token))
    })
}

/// Open issue, not a pull request, nobody assigned, beginner label present.
pub fn is_candidate(issue: &RawIssue) -> bool {
    issue.pull_request.is_none() && issue.assignees.is_empty() && has_good_first_issue_label(issue)
}

/// Whole days between `created` and `now`, rounded up. Clock skew in either
/// direction counts as age.
pub fn days_open(created: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (now - created).num_seconds().abs();
    (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
}

/// Language names ordered by byte count, largest first. Equal counts keep
/// alphabetical order.
pub fn languages_by_size(bytes: &LanguageBytes) -> Vec<String> {
    let mut pairs: Vec<(&String, &u64)> = bytes.iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(a.1));
    pairs.into_iter().map(|(lang, _)| lang.clone()).collect()
}

pub fn to_candidate(
    issue: RawIssue,
    repository: &TrackedRepository,
    details: &RepoDetails,
    all_languages: &[String],
    now: DateTime<Utc>,
) -> CandidateIssue {
    CandidateIssue {
        issue_id: issue.id,
        issue_url: issue.html_url,
        repository_owner: repository.owner.clone(),
        repository_name: repository.name.clone(),
        repository_topics: details.topics.clone(),
        primary_language: details
            .language
            .clone()
            .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string()),
        all_languages: all_languages.to_vec(),
        issue_number: issue.number,
        issue_title: issue.title,
        issue_body: issue.body.unwrap_or_default(),
        issue_labels: issue.labels.into_iter().map(|l| l.name).collect(),
        number_of_assignees: issue.assignees.len(),
        days_open: days_open(issue.created_at, now),
        date_created: issue.created_at,
    }
}

/// Candidates gathered across the tracked repositories.
#[derive(Debug, Clone, Default)]
pub struct CandidateFeed {
    /// Freshest first.
    pub issues: Vec<CandidateIssue>,
    /// Repositories whose issue listing failed. Their issues are unknown, not gone.
    pub unavailable: Vec<TrackedRepository>,
}

impl CandidateFeed {
    pub fn is_unavailable(&self, repository_full_name: &str) -> bool {
        self.unavailable
            .iter()
            .any(|r| r.to_string() == repository_full_name)
    }
}

/// Candidate issues of a single repository, or `None` when the issue listing
/// failed. Details and language lookups degrade to `"Unknown"` and an empty
/// list.
pub async fn fetch_repository_issues(
    github: &dyn GitHubApi,
    repository: &TrackedRepository,
    now: DateTime<Utc>,
) -> Option<Vec<CandidateIssue>> {
    let (owner, name) = (repository.owner.as_str(), repository.name.as_str());
    let (details, languages, issues) = tokio::join!(
        github.repository_details(owner, name),
        github.repository_languages(owner, name),
        github.good_first_issues(owner, name),
    );

    let issues = match issues {
        Ok(issues) => issues,
        Err(e) => {
            warn!("Could not list issues for {repository}: {e}");
            return None;
        }
    };
    let details = details.unwrap_or_else(|e| {
        warn!("Could not fetch details for {repository}: {e}");
        RepoDetails::default()
    });
    let all_languages = match languages {
        Ok(bytes) => languages_by_size(&bytes),
        Err(e) => {
            warn!("Could not fetch languages for {repository}: {e}");
            Vec::new()
        }
    };

    let candidates: Vec<CandidateIssue> = issues
        .into_iter()
        .filter(is_candidate)
        .map(|issue| to_candidate(issue, repository, &details, &all_languages, now))
        .collect();
    debug!("{repository}: {} candidate issues", candidates.len());
    Some(candidates)
}

/// Candidate issues across all tracked repositories, freshest first.
pub async fn fetch_candidate_issues(
    github: &dyn GitHubApi,
    repositories: &[TrackedRepository],
    now: DateTime<Utc>,
) -> CandidateFeed {
    let per_repository = join_all(
        repositories
            .iter()
            .map(|repository| fetch_repository_issues(github, repository, now)),
    )
    .await;

    let mut feed = CandidateFeed::default();
    for (repository, result) in repositories.iter().zip(per_repository) {
        match result {
            Some(issues) => feed.issues.extend(issues),
            None => feed.unavailable.push(repository.clone()),
        }
    }
    feed.issues.sort_by_key(|issue| issue.days_open);
    info!(
        "Fetched {} candidate issues from {} repositories ({} unavailable)",
        feed.issues.len(),
        repositories.len(),
        feed.unavailable.len()
    );
    feed
}

/// Drops issues created more than `max_age_months` calendar months ago.
pub fn filter_recent(
    issues: Vec<CandidateIssue>,
    max_age_months: u32,
    now: DateTime<Utc>,
) -> Vec<CandidateIssue> {
    let Some(cutoff) = now.checked_sub_months(Months::new(max_age_months)) else {
        return issues;
    };
    issues
        .into_iter()
        .filter(|issue| issue.date_created >= cutoff)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    use crate::github_client::models::RawLabel;
    use crate::languages::tests::FakeGitHub;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn raw(id: u64, labels: &[&str], age: Duration) -> RawIssue {
        RawIssue {
            id,
            number: id,
            title: format!("Issue {id}"),
            body: None,
            html_url: format!("https://github.com/o/r/issues/{id}"),
            labels: labels
                .iter()
                .map(|l| RawLabel {
                    name: l.to_string(),
                })
                .collect(),
            assignees: vec![],
            pull_request: None,
            created_at: now() - age,
        }
    }

    fn tracked(full: &str) -> TrackedRepository {
        full.parse().unwrap()
    }

    #[test]
    fn test_label_tokens_match_case_insensitively() {
        assert!(has_good_first_issue_label(&raw(1, &["Good First Issue"], Duration::days(1))));
        assert!(has_good_first_issue_label(&raw(2, &["E-easy"], Duration::days(1))));
        assert!(has_good_first_issue_label(&raw(3, &["status: Help Wanted"], Duration::days(1))));
        assert!(!has_good_first_issue_label(&raw(4, &["bug", "needs-triage"], Duration::days(1))));
        assert!(!has_good_first_issue_label(&raw(5, &[], Duration::days(1))));
    }

    #[test]
    fn test_pull_requests_and_assigned_issues_excluded() {
        let mut pr = raw(1, &["good first issue"], Duration::days(1));
        pr.pull_request = Some(serde_json::json!({"url": "x"}));
        assert!(!is_candidate(&pr));

        let mut assigned = raw(2, &["good first issue"], Duration::days(1));
        assigned.assignees.push(serde_json::json!({"login": "someone"}));
        assert!(!is_candidate(&assigned));

        assert!(is_candidate(&raw(3, &["good first issue"], Duration::days(1))));
    }

    #[test]
    fn test_days_open_rounds_up() {
        assert_eq!(days_open(now(), now()), 0);
        assert_eq!(days_open(now() - Duration::hours(1), now()), 1);
        assert_eq!(days_open(now() - Duration::days(2), now()), 2);
        assert_eq!(days_open(now() - Duration::days(2) - Duration::seconds(1), now()), 3);
        assert_eq!(days_open(now() + Duration::hours(3), now()), 1);
    }

    #[test]
    fn test_languages_by_size() {
        let bytes: LanguageBytes = [("C".to_string(), 10), ("Rust".to_string(), 90), ("Awk".to_string(), 10)]
            .into_iter()
            .collect();
        assert_eq!(languages_by_size(&bytes), vec!["Rust", "Awk", "C"]);
    }

    #[test]
    fn test_filter_recent_uses_calendar_months() {
        let mut old = crate::matching::issue_scoring::tests::make_issue("o", "r", 1, 400, "Rust", &[]);
        old.date_created = now() - Duration::days(400);
        let mut fresh = crate::matching::issue_scoring::tests::make_issue("o", "r", 2, 30, "Rust", &[]);
        fresh.date_created = now() - Duration::days(30);

        let kept = filter_recent(vec![old, fresh], 12, now());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].issue_number, 2);
    }

    #[tokio::test]
    async fn test_fetch_merges_sorts_and_degrades() {
        let mut github = FakeGitHub::default().with_languages("acme/app", &[("TypeScript", 80), ("CSS", 20)]);
        github.details.insert(
            "acme/app".into(),
            RepoDetails {
                language: Some("TypeScript".into()),
                topics: vec!["web".into()],
            },
        );
        github.issues.insert(
            "acme/app".into(),
            vec![
                raw(10, &["good first issue"], Duration::days(20)),
                raw(11, &["bug"], Duration::days(1)),
            ],
        );
        // No details or languages: falls back to Unknown.
        github
            .issues
            .insert("acme/lib".into(), vec![raw(20, &["beginner"], Duration::days(3))]);

        let repos = vec![tracked("acme/app"), tracked("acme/lib"), tracked("acme/missing")];
        let feed = fetch_candidate_issues(&github, &repos, now()).await;
        assert_eq!(feed.unavailable, vec![tracked("acme/missing")]);
        assert!(feed.is_unavailable("acme/missing"));
        assert!(!feed.is_unavailable("acme/lib"));
        let issues = feed.issues;

        let ids: Vec<u64> = issues.iter().map(|i| i.issue_id).collect();
        assert_eq!(ids, vec![20, 10]);
        assert_eq!(issues[0].primary_language, UNKNOWN_LANGUAGE);
        assert!(issues[0].all_languages.is_empty());
        assert_eq!(issues[1].primary_language, "TypeScript");
        assert_eq!(issues[1].all_languages, vec!["TypeScript", "CSS"]);
        assert_eq!(issues[1].repository_topics, vec!["web"]);
        assert_eq!(issues[1].days_open, 20);
    }
}
