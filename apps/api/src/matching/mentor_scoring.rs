//! Mentor Match Scorer.
//!
//! language   0.55 × (Σ over viewer languages at rank i matched by the mentor of
//!                    (L − i)/L × mentor% ) / L
//! preference 0.45 × min(shared / max(viewer prefs, mentor prefs) × 100, 100)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::matching::weighted::{
    ratio, sort_descending_by, total_of, TermContribution, ViewerProfile, WeightedScorer,
    WeightedTerm,
};
use crate::models::language::{affinity_rank, LanguageShare};

pub const MENTOR_LANGUAGE_WEIGHT: f64 = 0.55;
pub const MENTOR_PREFERENCE_WEIGHT: f64 = 0.45;

/// A profile flagged as willing to mentor, with its languages fetched on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorCandidate {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub languages: Vec<LanguageShare>,
    pub preferences: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredMentor {
    #[serde(flatten)]
    pub mentor: MentorCandidate,
    pub match_score: f64,
    pub breakdown: Vec<TermContribution>,
}

/// Rank-weighted overlap between the viewer's languages and the mentor's
/// usage of them, normalised by the viewer's language count.
pub fn mentor_language_score(viewer: &[LanguageShare], mentor: &[LanguageShare]) -> f64 {
    if viewer.is_empty() || mentor.is_empty() {
        return 0.0;
    }
    let viewer_count = viewer.len();
    let mut sum = 0.0;
    let mut matches = 0usize;

    for (user_index, share) in viewer.iter().enumerate() {
        if let Some(mentor_index) = affinity_rank(mentor, &share.lang) {
            let user_weight = ratio(viewer_count - user_index, viewer_count);
            let mentor_weight = mentor[mentor_index].percentage / 100.0;
            sum += user_weight * mentor_weight * 100.0;
            matches += 1;
        }
    }

    if matches == 0 {
        return 0.0;
    }
    sum / viewer_count as f64
}

/// Shared preferences over the larger of the two preference lists.
///
/// The max denominator differs from the issue topic term, which divides by the
/// viewer's count alone. Both are pinned by tests.
pub fn mentor_preference_score(viewer: &[String], mentor: &[String]) -> f64 {
    if viewer.is_empty() || mentor.is_empty() {
        return 0.0;
    }
    let matches = mentor
        .iter()
        .filter(|pref| viewer.iter().any(|v| v.eq_ignore_ascii_case(pref)))
        .count();
    (ratio(matches, viewer.len().max(mentor.len())) * 100.0).min(100.0)
}

pub struct MentorScorer {
    scorer: WeightedScorer<MentorCandidate>,
}

impl MentorScorer {
    pub fn new() -> Self {
        Self {
            scorer: WeightedScorer::new(vec![
                WeightedTerm::new(
                    "language",
                    MENTOR_LANGUAGE_WEIGHT,
                    |mentor: &MentorCandidate, viewer: &ViewerProfile| {
                        mentor_language_score(&viewer.languages, &mentor.languages)
                    },
                ),
                WeightedTerm::new(
                    "preference",
                    MENTOR_PREFERENCE_WEIGHT,
                    |mentor: &MentorCandidate, viewer: &ViewerProfile| {
                        mentor_preference_score(
                            &viewer.preferences,
                            mentor.preferences.as_deref().unwrap_or_default(),
                        )
                    },
                ),
            ]),
        }
    }

    pub fn breakdown(&self, mentor: &MentorCandidate, viewer: &ViewerProfile) -> Vec<TermContribution> {
        self.scorer.breakdown(mentor, viewer)
    }

    /// Scores every mentor and sorts descending. Ties keep input order.
    pub fn rank(&self, mentors: Vec<MentorCandidate>, viewer: &ViewerProfile) -> Vec<ScoredMentor> {
        let mut scored: Vec<ScoredMentor> = mentors
            .into_iter()
            .map(|mentor| {
                let breakdown = self.breakdown(&mentor, viewer);
                ScoredMentor {
                    match_score: total_of(&breakdown),
                    mentor,
                    breakdown,
                }
            })
            .collect();
        sort_descending_by(&mut scored, |m| m.match_score);
        scored
    }
}

impl Default for MentorScorer {
    fn default() -> Self {
        Self::new()
    }
}
