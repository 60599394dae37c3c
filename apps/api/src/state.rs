use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::AffinityCache;
use crate::config::Config;
use crate::digest::notifier::Notifier;
use crate::github_client::GitHubClient;
use crate::matching::issue_scoring::IssueRanker;
use crate::matching::mentor_scoring::MentorScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AffinityCache,
    pub github: GitHubClient,
    pub config: Config,
    /// Built once from `config.scoring`; every request ranks with the same strategy.
    pub issue_ranker: Arc<IssueRanker>,
    pub mentor_scorer: Arc<MentorScorer>,
    /// Default: LogNotifier.
    pub notifier: Arc<dyn Notifier>,
}
