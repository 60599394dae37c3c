//! Repository Aggregator: derives one recommendation per repository from the
//! ranked issue list.

use std::collections::HashMap;

use serde::Serialize;

use crate::matching::issue_scoring::ScoredIssue;
use crate::matching::weighted::sort_descending_by;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRepository {
    pub repository_owner: String,
    pub repository_name: String,
    pub repository_topics: Vec<String>,
    pub primary_language: String,
    /// Always at least 1.
    pub issue_count: usize,
    pub average_score: f64,
}

impl AggregatedRepository {
    fn seeded_from(scored: &ScoredIssue) -> Self {
        Self {
            repository_owner: scored.issue.repository_owner.clone(),
            repository_name: scored.issue.repository_name.clone(),
            repository_topics: scored.issue.repository_topics.clone(),
            primary_language: scored.issue.primary_language.clone(),
            issue_count: 1,
            average_score: scored.match_score,
        }
    }

    /// Online mean update: `(avg × (n − 1) + score) / n`.
    fn fold(&mut self, score: f64) {
        self.issue_count += 1;
        let n = self.issue_count as f64;
        self.average_score = (self.average_score * (n - 1.0) + score) / n;
    }
}

/// Folds issues in list order, keyed by `(owner, name)`. Topics and primary
/// language come from whichever issue introduced the key. Output is sorted
/// descending by average score; ties keep first-seen order.
pub fn aggregate_repositories(issues: &[ScoredIssue]) -> Vec<AggregatedRepository> {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut repositories: Vec<AggregatedRepository> = Vec::new();

    for scored in issues {
        let key = (
            scored.issue.repository_owner.as_str(),
            scored.issue.repository_name.as_str(),
        );
        match index.get(&key) {
            Some(&position) => repositories[position].fold(scored.match_score),
            None => {
                index.insert(key, repositories.len());
                repositories.push(AggregatedRepository::seeded_from(scored));
            }
        }
    }

    sort_descending_by(&mut repositories, |r| r.average_score);
    repositories
}
