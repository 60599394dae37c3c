//! Generic weighted-sum scorer shared by the issue and mentor scorers.
//!
//! Each entity kind gets one `WeightedScorer` whose term table is the single
//! source of truth for its weights. Terms return a sub-score on a 0–100 scale;
//! the total is Σ(sub_score × weight) rounded with [`round2`].

use std::cmp::Ordering;

use serde::Serialize;

use crate::models::language::LanguageShare;

/// The viewing user's inputs to every scorer. Never mutated by scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewerProfile {
    pub languages: Vec<LanguageShare>,
    pub preferences: Vec<String>,
}

type TermFn<E> = Box<dyn Fn(&E, &ViewerProfile) -> f64 + Send + Sync>;

/// A named `(term-function, weight)` pair.
pub struct WeightedTerm<E> {
    pub name: &'static str,
    pub weight: f64,
    score: TermFn<E>,
}

impl<E> WeightedTerm<E> {
    pub fn new<F>(name: &'static str, weight: f64, score: F) -> Self
    where
        F: Fn(&E, &ViewerProfile) -> f64 + Send + Sync + 'static,
    {
        Self {
            name,
            weight,
            score: Box::new(score),
        }
    }
}

/// One term's share of a total, for transparency in API responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermContribution {
    pub term: &'static str,
    pub sub_score: f64,
    pub weight: f64,
    pub contribution: f64,
}

pub struct WeightedScorer<E> {
    terms: Vec<WeightedTerm<E>>,
}

impl<E> WeightedScorer<E> {
    pub fn new(terms: Vec<WeightedTerm<E>>) -> Self {
        Self { terms }
    }

    #[cfg(test)]
    pub fn total_weight(&self) -> f64 {
        self.terms.iter().map(|t| t.weight).sum()
    }

    /// Unrounded per-term contributions. Non-finite sub-scores count as 0.
    pub fn breakdown(&self, entity: &E, viewer: &ViewerProfile) -> Vec<TermContribution> {
        self.terms
            .iter()
            .map(|term| {
                let raw = (term.score)(entity, viewer);
                let sub_score = if raw.is_finite() { raw.max(0.0) } else { 0.0 };
                TermContribution {
                    term: term.name,
                    sub_score,
                    weight: term.weight,
                    contribution: sub_score * term.weight,
                }
            })
            .collect()
    }
}

/// Rounded sum of a breakdown's contributions: the entity's score.
pub fn total_of(breakdown: &[TermContribution]) -> f64 {
    round2(breakdown.iter().map(|c| c.contribution).sum())
}

/// Rounds to 2 decimal places, ties to even at the cents digit.
/// The only rounding rule used for scores and percentages.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round_ties_even() / 100.0
}

/// `numerator / denominator`, or 0 when the denominator is 0.
pub fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Stable sort, highest key first. Equal keys keep their input order.
pub fn sort_descending_by<T>(items: &mut [T], key: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
}
