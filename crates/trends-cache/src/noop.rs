//! No-op cache implementation.

use async_trait::async_trait;
use std::time::Duration;
use tracing::trace;
use trends_core::TrendCache;

/// A no-op cache that doesn't store anything.
///
/// `get` always misses and writes are dropped. Used when caching is turned
/// off, and to exercise code paths without cache hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TrendCache for NoopCache {
    async fn get(&self, _key: &str) -> Option<String> {
        trace!("NoopCache: get called, returning None");
        None
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) {
        trace!("NoopCache: set called, doing nothing");
    }

    async fn delete(&self, _key: &str) {
        trace!("NoopCache: delete called, doing nothing");
    }

    async fn is_connected(&self) -> bool {
        false
    }

    async fn disconnect(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_cache_never_hits() {
        let cache = NoopCache::new();

        cache.set("trends:fiber:today 12-m:US", "{}", None).await;
        assert!(cache.get("trends:fiber:today 12-m:US").await.is_none());

        cache.delete("trends:fiber:today 12-m:US").await;
        assert!(!cache.is_connected().await);
    }

    #[test]
    fn test_noop_cache_is_copy() {
        let cache1 = NoopCache::new();
        let cache2 = cache1; // Copy
        let _cache3 = cache2; // Still works because Copy
    }
}
