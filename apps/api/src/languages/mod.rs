//! Language Profile Builder: derives an account's ordered language affinity
//! from its most-starred repositories.
//!
//! Every failure degrades to an empty affinity, which scorers treat as a zero
//! language contribution.

pub mod affinity;
pub mod handlers;

use futures::future::join_all;
use tracing::{info, warn};

use crate::cache::AffinityCache;
use crate::github_client::models::LanguageBytes;
use crate::github_client::GitHubApi;
use crate::models::language::LanguageShare;

use affinity::{reduce_language_bytes, select_sample};

/// Builds a fresh affinity list from GitHub. Language breakdowns for the
/// sampled repositories are fetched concurrently. A malformed login yields an
/// empty list without any request.
pub async fn build_language_affinity(github: &dyn GitHubApi, username: &str) -> Vec<LanguageShare> {
    if !is_valid_github_login(username) {
        warn!("Skipping language lookup for malformed login {username:?}");
        return Vec::new();
    }
    let repositories = match github.user_repositories(username).await {
        Ok(repos) => repos,
        Err(e) => {
            warn!("Could not list repositories for {username}: {e}");
            return Vec::new();
        }
    };

    let sample = select_sample(repositories);
    if sample.is_empty() {
        return Vec::new();
    }

    let breakdowns: Vec<LanguageBytes> = join_all(sample.iter().map(|repo| async move {
        match github
            .repository_languages(&repo.owner.login, &repo.name)
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    "Could not fetch languages for {}/{}: {e}",
                    repo.owner.login, repo.name
                );
                LanguageBytes::new()
            }
        }
    }))
    .await;

    let shares = reduce_language_bytes(&breakdowns);
    info!(
        "Built language affinity for {username} from {} repositories ({} languages)",
        sample.len(),
        shares.len()
    );
    shares
}

/// Cache-first affinity lookup. Only non-empty results are cached.
pub async fn language_affinity(
    github: &dyn GitHubApi,
    cache: &AffinityCache,
    username: &str,
) -> Vec<LanguageShare> {
    if let Some(cached) = cache.get(username).await {
        return cached;
    }
    let shares = build_language_affinity(github, username).await;
    cache.put(username, &shares).await;
    shares
}

/// GitHub logins: 1–39 ASCII alphanumerics or single hyphens, not at either end.
pub fn is_valid_github_login(login: &str) -> bool {
    !login.is_empty()
        && login.len() <= 39
        && !login.starts_with('-')
        && !login.ends_with('-')
        && !login.contains("--")
        && login.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;

    use crate::github_client::models::{RawIssue, RepoDetails, RepoOwner, RepoSummary};
    use crate::github_client::GitHubError;

    /// In-memory GitHub. Unknown users and repositories answer 404.
    #[derive(Default)]
    pub(crate) struct FakeGitHub {
        pub repos: HashMap<String, Vec<RepoSummary>>,
        pub languages: HashMap<String, LanguageBytes>,
        pub details: HashMap<String, RepoDetails>,
        pub issues: HashMap<String, Vec<RawIssue>>,
    }

    fn not_found() -> GitHubError {
        GitHubError::Api {
            status: 404,
            message: "Not Found".to_string(),
        }
    }

    impl FakeGitHub {
        pub(crate) fn with_repo(mut self, user: &str, name: &str, stars: u64, fork: bool) -> Self {
            self.repos.entry(user.to_string()).or_default().push(RepoSummary {
                name: name.to_string(),
                owner: RepoOwner {
                    login: user.to_string(),
                },
                fork,
                stargazers_count: stars,
            });
            self
        }

        pub(crate) fn with_languages(mut self, full_name: &str, pairs: &[(&str, u64)]) -> Self {
            self.languages.insert(
                full_name.to_string(),
                pairs.iter().map(|(l, b)| (l.to_string(), *b)).collect(),
            );
            self
        }
    }

    #[async_trait]
    impl GitHubApi for FakeGitHub {
        async fn user_repositories(&self, username: &str) -> Result<Vec<RepoSummary>, GitHubError> {
            self.repos.get(username).cloned().ok_or_else(not_found)
        }

        async fn repository_languages(
            &self,
            owner: &str,
            repo: &str,
        ) -> Result<LanguageBytes, GitHubError> {
            self.languages
                .get(&format!("{owner}/{repo}"))
                .cloned()
                .ok_or_else(not_found)
        }

        async fn repository_details(
            &self,
            owner: &str,
            repo: &str,
        ) -> Result<RepoDetails, GitHubError> {
            self.details
                .get(&format!("{owner}/{repo}"))
                .cloned()
                .ok_or_else(not_found)
        }

        async fn good_first_issues(
            &self,
            owner: &str,
            repo: &str,
        ) -> Result<Vec<RawIssue>, GitHubError> {
            self.issues
                .get(&format!("{owner}/{repo}"))
                .cloned()
                .ok_or_else(not_found)
        }
    }

    #[tokio::test]
    async fn test_builds_affinity_from_non_fork_repositories() {
        let github = FakeGitHub::default()
            .with_repo("dev", "cli", 50, false)
            .with_repo("dev", "site", 5, false)
            .with_repo("dev", "kernel-fork", 9_000, true)
            .with_languages("dev/cli", &[("Rust", 600)])
            .with_languages("dev/site", &[("TypeScript", 300), ("Rust", 100)])
            .with_languages("dev/kernel-fork", &[("C", 1_000_000)]);

        let shares = build_language_affinity(&github, "dev").await;
        assert_eq!(
            shares,
            vec![
                LanguageShare::new("Rust", 70.0),
                LanguageShare::new("TypeScript", 30.0)
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_language_fetch_is_isolated() {
        let github = FakeGitHub::default()
            .with_repo("dev", "ok", 2, false)
            .with_repo("dev", "broken", 1, false)
            .with_languages("dev/ok", &[("Go", 10)]);

        let shares = build_language_affinity(&github, "dev").await;
        assert_eq!(shares, vec![LanguageShare::new("Go", 100.0)]);
    }

    #[tokio::test]
    async fn test_unknown_account_is_empty() {
        let shares = build_language_affinity(&FakeGitHub::default(), "nobody").await;
        assert!(shares.is_empty());
    }

    #[tokio::test]
    async fn test_only_forks_is_empty() {
        let github = FakeGitHub::default()
            .with_repo("dev", "fork", 10, true)
            .with_languages("dev/fork", &[("C", 10)]);
        assert!(build_language_affinity(&github, "dev").await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_login_never_reaches_github() {
        // A path-shaped login must not be spliced into the request URL.
        let github = FakeGitHub::default()
            .with_repo("a/../../repos/x/y", "payload", 1, false)
            .with_languages("a/../../repos/x/y/payload", &[("Rust", 10)]);
        assert!(build_language_affinity(&github, "a/../../repos/x/y").await.is_empty());
    }

    #[test]
    fn test_github_login_validation() {
        assert!(is_valid_github_login("octocat"));
        assert!(is_valid_github_login("a-b-c"));
        assert!(!is_valid_github_login(""));
        assert!(!is_valid_github_login("-lead"));
        assert!(!is_valid_github_login("double--dash"));
        assert!(!is_valid_github_login("../etc"));
        assert!(!is_valid_github_login(&"a".repeat(40)));
    }
}
