use std::collections::HashMap;

use crate::github_client::models::{LanguageBytes, RepoSummary};
use crate::matching::weighted::{round2, sort_descending_by};
use crate::models::language::LanguageShare;

/// Repositories whose language breakdown feeds an affinity list.
pub const SAMPLED_REPOSITORIES: usize = 10;

/// Drops forks, then keeps the most-starred repositories (stable on ties).
pub fn select_sample(repositories: Vec<RepoSummary>) -> Vec<RepoSummary> {
    let mut owned: Vec<RepoSummary> = repositories.into_iter().filter(|r| !r.fork).collect();
    owned.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));
    owned.truncate(SAMPLED_REPOSITORIES);
    owned
}

/// Sums byte counts across repositories and converts them to percentages.
///
/// Languages keep first-encountered order before the stable sort, so equal
/// percentages tie-break by that order. A zero total yields an empty list.
pub fn reduce_language_bytes(breakdowns: &[LanguageBytes]) -> Vec<LanguageShare> {
    let mut totals: Vec<(String, u64)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for breakdown in breakdowns {
        for (lang, bytes) in breakdown {
            match positions.get(lang) {
                Some(&i) => totals[i].1 = totals[i].1.saturating_add(*bytes),
                None => {
                    positions.insert(lang.clone(), totals.len());
                    totals.push((lang.clone(), *bytes));
                }
            }
        }
    }

    let grand_total: u64 = totals.iter().fold(0u64, |acc, (_, b)| acc.saturating_add(*b));
    if grand_total == 0 {
        return Vec::new();
    }

    let mut shares: Vec<LanguageShare> = totals
        .into_iter()
        .map(|(lang, bytes)| {
            LanguageShare::new(lang, round2(bytes as f64 / grand_total as f64 * 100.0))
        })
        .collect();
    sort_descending_by(&mut shares, |s| s.percentage);
    shares
}
