//! Best-effort cache invalidation.
//!
//! The booking service never reads from the cache; it only wipes
//! stale entries after mutations. Redis being down therefore degrades
//! freshness, not correctness, and every failure here is logged and
//! swallowed.

pub mod keys;

use redis::AsyncCommands;

/// Wipes cache entries by key pattern after write operations.
///
/// Constructed once at startup and shared through application state.
/// When no Redis URL is configured the invalidator is a no-op.
#[derive(Clone)]
pub struct CacheInvalidator {
    client: Option<redis::Client>,
}

impl CacheInvalidator {
    /// Connect lazily to the given Redis URL. An unparsable URL
    /// disables invalidation rather than failing startup.
    pub fn new(url: Option<&str>) -> Self {
        let client = match url {
            Some(url) => match redis::Client::open(url) {
                Ok(client) => Some(client),
                Err(err) => {
                    tracing::warn!(error = %err, "invalid redis url, cache invalidation disabled");
                    None
                }
            },
            None => None,
        };
        Self { client }
    }

    /// A permanently disabled invalidator, for tests and cache-less
    /// deployments.
    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Delete every key matching any of the given patterns. Failures
    /// are logged at warn and never propagated.
    pub async fn invalidate(&self, patterns: &[String]) {
        let Some(client) = &self.client else {
            return;
        };
        let mut conn = match client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(err) => {
                tracing::warn!(error = %err, "redis unavailable, skipping cache invalidation");
                return;
            }
        };

        for pattern in patterns {
            if let Err(err) = purge_pattern(&mut conn, pattern).await {
                tracing::warn!(pattern = %pattern, error = %err, "cache invalidation failed");
            }
        }
    }
}

/// SCAN for keys matching `pattern` and delete them. SCAN instead of
/// KEYS so a large cache never blocks the Redis event loop.
async fn purge_pattern(
    conn: &mut redis::aio::MultiplexedConnection,
    pattern: &str,
) -> redis::RedisResult<()> {
    let mut matched = Vec::new();
    {
        let mut iter = conn.scan_match::<_, String>(pattern).await?;
        while let Some(key) = iter.next_item().await {
            matched.push(key);
        }
    }
    if !matched.is_empty() {
        let removed: u64 = conn.del(&matched).await?;
        tracing::debug!(pattern = %pattern, removed, "cache entries invalidated");
    }
    Ok(())
}
