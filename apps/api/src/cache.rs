use redis::Client as RedisClient;
use tracing::{debug, warn};

use crate::models::language::LanguageShare;

const KEY_PREFIX: &str = "gittogether:languages:";

/// Redis-backed cache of computed language affinities, keyed by GitHub login.
///
/// Every failure is logged and swallowed: a cache miss just means a live
/// GitHub fetch.
#[derive(Clone)]
pub struct AffinityCache {
    client: RedisClient,
    ttl_secs: u64,
}

impl AffinityCache {
    pub fn new(client: RedisClient, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    pub async fn get(&self, username: &str) -> Option<Vec<LanguageShare>> {
        let key = cache_key(username);
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(c) => c,
            Err(e) => {
                warn!("Affinity cache unavailable: {e}");
                return None;
            }
        };

        let cached: Option<String> = match redis::cmd("GET").arg(&key).query_async(&mut conn).await {
            Ok(v) => v,
            Err(e) => {
                warn!("Affinity cache read failed for {key}: {e}");
                return None;
            }
        };

        let payload = cached?;
        match serde_json::from_str(&payload) {
            Ok(shares) => {
                debug!("Affinity cache hit for {key}");
                Some(shares)
            }
            Err(e) => {
                warn!("Discarding corrupt affinity cache entry {key}: {e}");
                None
            }
        }
    }

    /// Stores a non-empty affinity list for the configured TTL.
    pub async fn put(&self, username: &str, shares: &[LanguageShare]) {
        if shares.is_empty() || self.ttl_secs == 0 {
            return;
        }
        let key = cache_key(username);
        let payload = match serde_json::to_string(shares) {
            Ok(p) => p,
            Err(e) => {
                warn!("Could not serialize affinity for {key}: {e}");
                return;
            }
        };

        let result: redis::RedisResult<()> = async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            redis::cmd("SET")
                .arg(&key)
                .arg(payload)
                .arg("EX")
                .arg(self.ttl_secs)
                .query_async(&mut conn)
                .await
        }
        .await;

        if let Err(e) = result {
            warn!("Affinity cache write failed for {key}: {e}");
        }
    }
}

/// GitHub logins are case-insensitive, so the key is lowercased.
pub fn cache_key(username: &str) -> String {
    format!("{KEY_PREFIX}{}", username.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_normalizes_login() {
        assert_eq!(cache_key(" OctoCat "), "gittogether:languages:octocat");
    }

    #[tokio::test]
    async fn test_unreachable_redis_is_a_miss() {
        // Port 1 is never a Redis server; the lookup must degrade, not fail.
        let client = RedisClient::open("redis://127.0.0.1:1/").unwrap();
        let cache = AffinityCache::new(client, 60);
        assert!(cache.get("octocat").await.is_none());
        cache.put("octocat", &[LanguageShare::new("Rust", 100.0)]).await;
    }
}
