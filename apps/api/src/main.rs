mod cache;
mod config;
mod db;
mod digest;
mod errors;
mod github_client;
mod issues;
mod languages;
mod matching;
mod models;
mod profiles;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::AffinityCache;
use crate::config::Config;
use crate::db::create_pool;
use crate::digest::notifier::LogNotifier;
use crate::github_client::GitHubClient;
use crate::matching::issue_scoring::IssueRanker;
use crate::matching::mentor_scoring::MentorScorer;
use crate::routes::build_router;
use crate::state::AppState;

const GITHUB_RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting gitTogether API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis (affinity cache)
    let redis = redis::Client::open(config.redis_url.clone())?;
    let cache = AffinityCache::new(redis, config.language_cache_ttl_secs);
    info!(
        "Redis client initialized (affinity TTL {}s)",
        config.language_cache_ttl_secs
    );

    // Initialize GitHub client
    let github = GitHubClient::new(config.github_api_url.clone(), config.github_token.clone())
        .context("Failed to build GitHub client")?
        .with_retry_policy(config.github_max_retries, GITHUB_RETRY_BASE_DELAY);
    if github.is_authenticated() {
        info!("GitHub client initialized ({})", config.github_api_url);
    } else {
        warn!("GITHUB_TOKEN not set; GitHub allows 60 unauthenticated requests per hour");
    }

    let issue_ranker = Arc::new(IssueRanker::new(config.scoring));
    info!("Issue scoring strategy: {}", config.scoring.label());

    // Build app state
    let state = AppState {
        db,
        cache,
        github,
        config: config.clone(),
        issue_ranker,
        mentor_scorer: Arc::new(MentorScorer::new()),
        notifier: Arc::new(LogNotifier),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
