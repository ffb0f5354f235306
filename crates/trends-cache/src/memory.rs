//! In-memory cache implementation.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use trends_core::TrendCache;

use crate::DEFAULT_TTL;

/// Cache entry with its expiry instant.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(value: String, ttl: Duration) -> Self {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        Self {
            value,
            expires_at: Utc::now()
                .checked_add_signed(ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Simple in-memory cache for testing and development.
///
/// Entries live in a `RwLock`-protected `HashMap` and are lost when the cache
/// is dropped. Expired entries are skipped on read and removed by
/// [`purge_expired`](Self::purge_expired).
#[derive(Debug)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
    connected: AtomicBool,
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }
}

impl InMemoryCache {
    /// Create a new empty in-memory cache with the default TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty in-memory cache with a custom default TTL.
    #[must_use]
    pub fn with_ttl(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
            connected: AtomicBool::new(true),
        }
    }

    /// Returns the number of stored entries, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if no entries are stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Removes expired entries.
    ///
    /// Returns the number of entries removed.
    #[instrument(skip(self))]
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before - entries.len();

        if removed > 0 {
            debug!("Purged {} expired cache entries", removed);
        }
        removed
    }

    /// Clears all cached data.
    #[instrument(skip(self))]
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        debug!("Cleared all cache entries");
    }

    fn is_enabled(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

#[async_trait]
impl TrendCache for InMemoryCache {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }

        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired(Utc::now()) => {
                debug!("Cache hit");
                Some(entry.value.clone())
            }
            _ => {
                debug!("Cache miss");
                None
            }
        }
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) {
        if !self.is_enabled() {
            return;
        }

        let ttl = ttl.unwrap_or(self.default_ttl);
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), CacheEntry::new(value.to_string(), ttl));
        debug!(ttl_secs = ttl.as_secs(), "Cache set");
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) {
        if !self.is_enabled() {
            return;
        }

        if self.entries.write().await.remove(key).is_some() {
            debug!("Cache delete");
        }
    }

    async fn is_connected(&self) -> bool {
        self.is_enabled()
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);
        self.clear().await;
    }
}
