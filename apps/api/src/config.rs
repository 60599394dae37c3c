use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::matching::issue_scoring::{AgePolicy, IssueScoringStrategy, LanguageRanking};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Repositories scanned for good first issues when `TRACKED_REPOSITORIES` is unset.
pub const DEFAULT_TRACKED_REPOSITORIES: &[&str] = &[
    "microsoft/vscode",
    "facebook/react",
    "vercel/next.js",
    "nodejs/node",
    "rust-lang/rust",
    "golang/go",
    "tensorflow/tensorflow",
    "kubernetes/kubernetes",
    "ansible/ansible",
    "django/django",
];

/// An `owner/name` pair from the tracked repository list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackedRepository {
    pub owner: String,
    pub name: String,
}

impl FromStr for TrackedRepository {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(TrackedRepository {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => bail!("'{s}' is not a valid owner/name repository"),
        }
    }
}

impl fmt::Display for TrackedRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub github_max_retries: u32,
    pub tracked_repositories: Vec<TrackedRepository>,
    pub issue_max_age_months: u32,
    pub language_cache_ttl_secs: u64,
    pub scoring: IssueScoringStrategy,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let tracked_repositories = match lookup("TRACKED_REPOSITORIES") {
            Some(raw) => raw
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(TrackedRepository::from_str)
                .collect::<Result<Vec<_>>>()
                .context("TRACKED_REPOSITORIES must be a comma-separated list of owner/name")?,
            None => DEFAULT_TRACKED_REPOSITORIES
                .iter()
                .map(|s| TrackedRepository::from_str(s))
                .collect::<Result<Vec<_>>>()?,
        };

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            redis_url: require("REDIS_URL")?,
            github_token: lookup("GITHUB_TOKEN").filter(|t| !t.trim().is_empty()),
            github_api_url: lookup("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            github_max_retries: parse_or(&lookup, "GITHUB_MAX_RETRIES", 3)?,
            tracked_repositories,
            issue_max_age_months: parse_or(&lookup, "ISSUE_MAX_AGE_MONTHS", 12)?,
            language_cache_ttl_secs: parse_or(&lookup, "LANGUAGE_CACHE_TTL_SECS", 3600)?,
            scoring: IssueScoringStrategy {
                age_policy: parse_age_policy(lookup("SCORING_AGE_POLICY").as_deref())?,
                language_ranking: parse_language_ranking(
                    lookup("SCORING_LANGUAGE_RANKING").as_deref(),
                )?,
            },
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn parse_age_policy(raw: Option<&str>) -> Result<AgePolicy> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("soft") => Ok(AgePolicy::default()),
        Some("cutoff") => Ok(AgePolicy::legacy_cutoff()),
        Some(other) => bail!("SCORING_AGE_POLICY must be 'soft' or 'cutoff', got '{other}'"),
    }
}

fn parse_language_ranking(raw: Option<&str>) -> Result<LanguageRanking> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("linear") => Ok(LanguageRanking::LinearRank),
        Some("exponential") => Ok(LanguageRanking::legacy_exponential()),
        Some(other) => {
            bail!("SCORING_LANGUAGE_RANKING must be 'linear' or 'exponential', got '{other}'")
        }
    }
}
