//! Issue Match Scorer — ranks candidate issues for a viewer.
//!
//! Canonical formula (weights sum to 1.0):
//!   recency  0.20 × (1 − min(days_open, 180)/180) × 100
//!   language 0.35 × (L − i)/L × 100   for the primary language at rank i of L
//!   topic    0.45 × min(matching topics / preferences × 100, 100)
//!
//! Two legacy policies are selectable instead of the canonical ones:
//! a 90-day hard cutoff that drops older issues outright, and exponential
//! per-language decay summed across all of the repository's languages.

use serde::{Deserialize, Serialize};

use crate::matching::weighted::{
    ratio, sort_descending_by, total_of, TermContribution, ViewerProfile, WeightedScorer,
    WeightedTerm,
};
use crate::models::issue::CandidateIssue;
use crate::models::language::{affinity_rank, LanguageShare};

pub const RECENCY_WEIGHT: f64 = 0.20;
pub const LANGUAGE_WEIGHT: f64 = 0.35;
pub const TOPIC_WEIGHT: f64 = 0.45;

pub const SOFT_DECAY_HORIZON_DAYS: u32 = 180;
pub const LEGACY_CUTOFF_DAYS: u32 = 90;
pub const LEGACY_DECAY_BASE: f64 = 0.2;

/// How issue age affects eligibility and the recency term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy")]
pub enum AgePolicy {
    /// Every issue is eligible; recency falls linearly to 0 at the horizon.
    SoftDecay { horizon_days: u32 },
    /// Issues older than `max_days` are dropped; recency falls linearly to 0 at the cutoff.
    HardCutoff { max_days: u32 },
}

impl Default for AgePolicy {
    fn default() -> Self {
        AgePolicy::SoftDecay {
            horizon_days: SOFT_DECAY_HORIZON_DAYS,
        }
    }
}

impl AgePolicy {
    pub fn legacy_cutoff() -> Self {
        AgePolicy::HardCutoff {
            max_days: LEGACY_CUTOFF_DAYS,
        }
    }

    fn window_days(&self) -> u32 {
        match *self {
            AgePolicy::SoftDecay { horizon_days } => horizon_days,
            AgePolicy::HardCutoff { max_days } => max_days,
        }
    }

    pub fn is_eligible(&self, days_open: i64) -> bool {
        match *self {
            AgePolicy::SoftDecay { .. } => true,
            AgePolicy::HardCutoff { max_days } => days_open <= i64::from(max_days),
        }
    }
}

/// How the viewer's language ranking turns into a language sub-score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "ranking")]
pub enum LanguageRanking {
    /// Primary language only, linear in rank.
    #[default]
    LinearRank,
    /// Every repository language, `base^rank` each, summed and uncapped.
    ExponentialDecay { base: f64 },
}

impl LanguageRanking {
    pub fn legacy_exponential() -> Self {
        LanguageRanking::ExponentialDecay {
            base: LEGACY_DECAY_BASE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueScoringStrategy {
    pub age_policy: AgePolicy,
    pub language_ranking: LanguageRanking,
}

impl IssueScoringStrategy {
    /// Short label returned alongside recommendations, e.g. `soft-decay/linear-rank`.
    pub fn label(&self) -> String {
        let age = match self.age_policy {
            AgePolicy::SoftDecay { .. } => "soft-decay",
            AgePolicy::HardCutoff { .. } => "hard-cutoff",
        };
        let language = match self.language_ranking {
            LanguageRanking::LinearRank => "linear-rank",
            LanguageRanking::ExponentialDecay { .. } => "exponential-decay",
        };
        format!("{age}/{language}")
    }
}

/// A candidate issue with its match score. Issue fields are flattened in JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredIssue {
    #[serde(flatten)]
    pub issue: CandidateIssue,
    pub match_score: f64,
    /// Per-term contributions that sum to `match_score` before rounding.
    pub breakdown: Vec<TermContribution>,
}

// ────────────────────────────────────────────────────────────────────────────
// Term functions
// ────────────────────────────────────────────────────────────────────────────

/// `(1 − min(days, window)/window) × 100`. Negative ages count as brand new.
pub fn recency_score(days_open: i64, window_days: u32) -> f64 {
    if window_days == 0 {
        return 0.0;
    }
    let window = f64::from(window_days);
    let days = (days_open.max(0) as f64).min(window);
    (1.0 - days / window) * 100.0
}

/// `(L − i)/L × 100` for the language at rank `i`, 0 if absent or the list is empty.
pub fn linear_rank_score(language: &str, affinity: &[LanguageShare]) -> f64 {
    match affinity_rank(affinity, language) {
        Some(index) => ratio(affinity.len() - index, affinity.len()) * 100.0,
        None => 0.0,
    }
}

/// Σ `base^rank × 100` over every language found in the affinity list.
pub fn exponential_decay_score(languages: &[String], affinity: &[LanguageShare], base: f64) -> f64 {
    languages
        .iter()
        .filter_map(|lang| affinity_rank(affinity, lang))
        .map(|rank| base.powi(rank as i32) * 100.0)
        .sum()
}

/// Share of the viewer's preferences covered by the repository's topics,
/// capped at 100. Divides by the viewer's preference count only.
pub fn topic_score(topics: &[String], preferences: &[String]) -> f64 {
    if preferences.is_empty() {
        return 0.0;
    }
    let matches = topics
        .iter()
        .filter(|topic| preferences.iter().any(|p| p.eq_ignore_ascii_case(topic)))
        .count();
    (ratio(matches, preferences.len()) * 100.0).min(100.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Ranker
// ────────────────────────────────────────────────────────────────────────────

/// Scores and ranks issues under a fixed strategy. Pure and reusable across requests.
pub struct IssueRanker {
    strategy: IssueScoringStrategy,
    scorer: WeightedScorer<CandidateIssue>,
}

impl IssueRanker {
    pub fn new(strategy: IssueScoringStrategy) -> Self {
        let window = strategy.age_policy.window_days();
        let ranking = strategy.language_ranking;

        let scorer = WeightedScorer::new(vec![
            WeightedTerm::new("recency", RECENCY_WEIGHT, move |issue: &CandidateIssue, _| {
                recency_score(issue.days_open, window)
            }),
            WeightedTerm::new(
                "language",
                LANGUAGE_WEIGHT,
                move |issue: &CandidateIssue, viewer: &ViewerProfile| match ranking {
                    LanguageRanking::LinearRank => {
                        linear_rank_score(&issue.primary_language, &viewer.languages)
                    }
                    LanguageRanking::ExponentialDecay { base } => {
                        exponential_decay_score(&issue.all_languages, &viewer.languages, base)
                    }
                },
            ),
            WeightedTerm::new(
                "topic",
                TOPIC_WEIGHT,
                |issue: &CandidateIssue, viewer: &ViewerProfile| {
                    topic_score(&issue.repository_topics, &viewer.preferences)
                },
            ),
        ]);

        Self { strategy, scorer }
    }

    pub fn strategy(&self) -> IssueScoringStrategy {
        self.strategy
    }

    pub fn breakdown(&self, issue: &CandidateIssue, viewer: &ViewerProfile) -> Vec<TermContribution> {
        self.scorer.breakdown(issue, viewer)
    }

    /// Drops ineligible issues, scores the rest and sorts descending by score.
    /// Ties keep input order.
    pub fn rank(&self, issues: Vec<CandidateIssue>, viewer: &ViewerProfile) -> Vec<ScoredIssue> {
        let mut scored: Vec<ScoredIssue> = issues
            .into_iter()
            .filter(|issue| self.strategy.age_policy.is_eligible(issue.days_open))
            .map(|issue| {
                let breakdown = self.breakdown(&issue, viewer);
                ScoredIssue {
                    match_score: total_of(&breakdown),
                    issue,
                    breakdown,
                }
            })
            .collect();

        sort_descending_by(&mut scored, |s| s.match_score);
        scored
    }
}

impl Default for IssueRanker {
    fn default() -> Self {
        Self::new(IssueScoringStrategy::default())
    }
}
