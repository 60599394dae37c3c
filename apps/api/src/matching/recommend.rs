use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::cache::AffinityCache;
use crate::errors::AppError;
use crate::github_client::GitHubApi;
use crate::issues::{fetch_candidate_issues, filter_recent};
use crate::languages::language_affinity;
use crate::matching::issue_scoring::{IssueRanker, ScoredIssue};
use crate::matching::mentor_scoring::{MentorCandidate, MentorScorer, ScoredMentor};
use crate::matching::repository::{aggregate_repositories, AggregatedRepository};
use crate::matching::weighted::ViewerProfile;
use crate::models::issue::CandidateIssue;
use crate::models::language::LanguageShare;
use crate::models::profile::ProfileRow;
use crate::profiles::store::{list_mentors, require_profile};
use crate::state::AppState;

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 200;

#[derive(Debug, Serialize)]
pub struct Recommendations {
    /// Label of the issue scoring strategy, e.g. `soft-decay/linear-rank`.
    pub strategy: String,
    pub viewer_languages: Vec<LanguageShare>,
    pub issues: Vec<ScoredIssue>,
    pub repositories: Vec<AggregatedRepository>,
    pub mentors: Vec<ScoredMentor>,
}

pub fn resolve_limit(limit: Option<usize>) -> Result<usize, AppError> {
    match limit {
        None => Ok(DEFAULT_LIMIT),
        Some(n) if (1..=MAX_LIMIT).contains(&n) => Ok(n),
        Some(n) => Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_LIMIT}, got {n}"
        ))),
    }
}

/// Ranks everything for one viewer. Repositories are aggregated from the full
/// ranked list before `limit` truncates the issues.
pub fn assemble(
    ranker: &IssueRanker,
    mentor_scorer: &MentorScorer,
    viewer: ViewerProfile,
    issues: Vec<CandidateIssue>,
    mentors: Vec<MentorCandidate>,
    limit: usize,
) -> Recommendations {
    let mut ranked = ranker.rank(issues, &viewer);
    let repositories = aggregate_repositories(&ranked);
    ranked.truncate(limit);
    let mentors = mentor_scorer.rank(mentors, &viewer);

    Recommendations {
        strategy: ranker.strategy().label(),
        viewer_languages: viewer.languages,
        issues: ranked,
        repositories,
        mentors,
    }
}

/// Resolves each mentor's language affinity concurrently. Rows without a
/// GitHub login are skipped.
pub async fn fetch_mentor_candidates(
    github: &dyn GitHubApi,
    cache: &AffinityCache,
    rows: Vec<ProfileRow>,
) -> Vec<MentorCandidate> {
    join_all(rows.into_iter().filter_map(|row| {
        let username = row.username.clone()?;
        Some(async move {
            let languages = language_affinity(github, cache, &username).await;
            MentorCandidate {
                id: row.id,
                username,
                email: row.email,
                languages,
                preferences: row.preferences,
            }
        })
    }))
    .await
}

/// Full recommendation pass for `user_id`. Upstream failures degrade to empty
/// data; only database errors abort.
pub async fn recommend(
    state: &AppState,
    user_id: Uuid,
    limit: usize,
) -> Result<Recommendations, AppError> {
    let profile = require_profile(&state.db, user_id).await?;
    let now = Utc::now();

    let viewer_languages = async {
        match profile.username.as_deref() {
            Some(username) => language_affinity(&state.github, &state.cache, username).await,
            None => Vec::new(),
        }
    };
    let issues = async {
        let feed =
            fetch_candidate_issues(&state.github, &state.config.tracked_repositories, now).await;
        filter_recent(feed.issues, state.config.issue_max_age_months, now)
    };
    let mentors = async {
        let rows = list_mentors(&state.db, user_id).await?;
        Ok::<_, sqlx::Error>(fetch_mentor_candidates(&state.github, &state.cache, rows).await)
    };

    let (viewer_languages, issues, mentors) = tokio::join!(viewer_languages, issues, mentors);
    let mentors = mentors?;

    let viewer = ViewerProfile {
        languages: viewer_languages,
        preferences: profile.preference_list(),
    };
    let recommendations = assemble(
        &state.issue_ranker,
        &state.mentor_scorer,
        viewer,
        issues,
        mentors,
        limit,
    );
    info!(
        "Recommendations for {user_id}: {} issues, {} repositories, {} mentors ({})",
        recommendations.issues.len(),
        recommendations.repositories.len(),
        recommendations.mentors.len(),
        recommendations.strategy
    );
    Ok(recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::issue_scoring::tests::make_issue;
    use crate::matching::issue_scoring::{AgePolicy, IssueScoringStrategy};

    fn viewer() -> ViewerProfile {
        ViewerProfile {
            languages: vec![LanguageShare::new("Rust", 70.0), LanguageShare::new("Go", 30.0)],
            preferences: vec!["cli".to_string()],
        }
    }

    fn mentor(username: &str, lang: &str) -> MentorCandidate {
        MentorCandidate {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: None,
            languages: vec![LanguageShare::new(lang, 100.0)],
            preferences: None,
        }
    }

    #[test]
    fn test_resolve_limit() {
        assert_eq!(resolve_limit(None).unwrap(), DEFAULT_LIMIT);
        assert_eq!(resolve_limit(Some(7)).unwrap(), 7);
        assert_eq!(resolve_limit(Some(MAX_LIMIT)).unwrap(), MAX_LIMIT);
        assert!(matches!(resolve_limit(Some(0)), Err(AppError::Validation(_))));
        assert!(matches!(resolve_limit(Some(MAX_LIMIT + 1)), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_limit_truncates_issues_but_not_repositories() {
        let issues = vec![
            make_issue("a", "cli", 1, 1, "Rust", &["cli"]),
            make_issue("b", "svc", 2, 1, "Go", &[]),
            make_issue("c", "web", 3, 1, "JavaScript", &[]),
        ];
        let result = assemble(
            &IssueRanker::default(),
            &MentorScorer::default(),
            viewer(),
            issues,
            vec![mentor("gopher", "Go"), mentor("crab", "Rust")],
            1,
        );

        assert_eq!(result.strategy, "soft-decay/linear-rank");
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].issue.repository_owner, "a");
        assert_eq!(result.repositories.len(), 3);
        assert_eq!(result.mentors.len(), 2);
        assert_eq!(result.mentors[0].mentor.username, "crab");
        assert_eq!(result.viewer_languages.len(), 2);

        let terms: Vec<&str> = result.issues[0].breakdown.iter().map(|c| c.term).collect();
        assert_eq!(terms, vec!["recency", "language", "topic"]);
        assert!((result.issues[0].breakdown[1].contribution - 35.0).abs() < 1e-9);
        assert!((result.issues[0].breakdown[2].contribution - 45.0).abs() < 1e-9);

        let mentor_terms: Vec<&str> = result.mentors[0].breakdown.iter().map(|c| c.term).collect();
        assert_eq!(mentor_terms, vec!["language", "preference"]);
        assert!((result.mentors[0].breakdown[0].contribution - 27.5).abs() < 1e-9);
        assert_eq!(result.mentors[0].match_score, 27.5);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["issues"][0]["breakdown"][2]["term"], "topic");
        assert_eq!(json["mentors"][0]["breakdown"][0]["weight"], 0.55);
    }

    #[test]
    fn test_legacy_strategy_drops_old_issues_before_aggregation() {
        let ranker = IssueRanker::new(IssueScoringStrategy {
            age_policy: AgePolicy::legacy_cutoff(),
            ..IssueScoringStrategy::default()
        });
        let issues = vec![
            make_issue("a", "old", 1, 120, "Rust", &[]),
            make_issue("b", "new", 2, 10, "Rust", &[]),
        ];
        let result = assemble(&ranker, &MentorScorer::default(), viewer(), issues, vec![], 50);

        assert_eq!(result.strategy, "hard-cutoff/linear-rank");
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.repositories.len(), 1);
        assert_eq!(result.repositories[0].repository_name, "new");
        assert!(result.mentors.is_empty());
    }
}
