//! GitHub Client: the single point of entry for all GitHub REST calls.
//!
//! No other module builds GitHub URLs or talks to api.github.com directly.
//! Callers depend on the `GitHubApi` trait so the builders above it can run
//! against in-memory fakes.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

pub mod models;

use models::{GitHubErrorBody, LanguageBytes, RawIssue, RepoDetails, RepoSummary};

pub const USER_AGENT: &str = "gittogether-api";
const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(500);
const PER_PAGE: &str = "100";
pub const GOOD_FIRST_ISSUE_LABEL: &str = "good first issue";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} attempts")]
    RateLimited { retries: u32 },
}

/// Read-only view of GitHub used by the language profile builder, the issue
/// source and the digest job.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Up to 100 repositories owned by `username`, forks included.
    async fn user_repositories(&self, username: &str) -> Result<Vec<RepoSummary>, GitHubError>;

    async fn repository_languages(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<LanguageBytes, GitHubError>;

    async fn repository_details(&self, owner: &str, repo: &str)
        -> Result<RepoDetails, GitHubError>;

    /// Open issues carrying the `good first issue` label. Pull requests are
    /// not filtered out here.
    async fn good_first_issues(&self, owner: &str, repo: &str)
        -> Result<Vec<RawIssue>, GitHubError>;
}

/// Wraps the GitHub REST API with retry logic and typed responses.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl GitHubClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, GitHubError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
        })
    }

    /// Overrides the number of attempts and the first backoff delay.
    /// Delays double on every retry.
    pub fn with_retry_policy(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_base_delay = base_delay;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// GETs `path` and deserializes the JSON body.
    /// Retries on transport errors, 429, exhausted-quota 403 and 5xx with exponential backoff.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GitHubError> {
        let url = format!("{}{}", self.base_url, path);
        let mut last_error: Option<GitHubError> = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = self.retry_base_delay * (1u32 << (attempt - 1).min(16));
                warn!(
                    "GitHub call to {} attempt {} failed, retrying after {}ms...",
                    path,
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let mut request = self
                .client
                .get(&url)
                .header(ACCEPT, GITHUB_ACCEPT)
                .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
                .query(query);
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }

            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(GitHubError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if is_rate_limited(status, response.headers()) {
                warn!("GitHub API rate limited ({status}) on {path}");
                last_error = Some(GitHubError::RateLimited {
                    retries: attempt + 1,
                });
                continue;
            }

            if status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("GitHub API returned {}: {}", status, body);
                last_error = Some(GitHubError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<GitHubErrorBody>(&body)
                    .map(|e| e.message)
                    .unwrap_or(body);
                return Err(GitHubError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            debug!("GitHub call to {} succeeded ({} bytes)", path, body.len());
            return serde_json::from_str(&body).map_err(GitHubError::Parse);
        }

        Err(last_error.unwrap_or(GitHubError::RateLimited {
            retries: self.max_retries,
        }))
    }
}

/// 429 always means back off. GitHub also signals an exhausted quota with a
/// 403 and `x-ratelimit-remaining: 0`.
fn is_rate_limited(status: StatusCode, headers: &HeaderMap) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    status == StatusCode::FORBIDDEN
        && headers
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim() == "0")
            .unwrap_or(false)
}

#[async_trait]
impl GitHubApi for GitHubClient {
    async fn user_repositories(&self, username: &str) -> Result<Vec<RepoSummary>, GitHubError> {
        self.get_json(&format!("/users/{username}/repos"), &[("per_page", PER_PAGE)])
            .await
    }

    async fn repository_languages(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<LanguageBytes, GitHubError> {
        self.get_json(&format!("/repos/{owner}/{repo}/languages"), &[])
            .await
    }

    async fn repository_details(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<RepoDetails, GitHubError> {
        self.get_json(&format!("/repos/{owner}/{repo}"), &[]).await
    }

    async fn good_first_issues(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<RawIssue>, GitHubError> {
        self.get_json(
            &format!("/repos/{owner}/{repo}/issues"),
            &[
                ("state", "open"),
                ("labels", GOOD_FIRST_ISSUE_LABEL),
                ("per_page", PER_PAGE),
            ],
        )
        .await
    }
}
