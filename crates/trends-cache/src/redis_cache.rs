//! Redis-based cache implementation.

use ::redis::{AsyncCommands, Client, aio::ConnectionManager};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};
use trends_core::{Result, TrendCache, TrendsError};

use crate::DEFAULT_TTL;

/// Upper bound on establishing the initial connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis-backed cache for serialized trends results.
///
/// A failed [`connect`](Self::connect) leaves the cache disabled instead of
/// returning an error: every read misses and every write is dropped. Backend
/// errors after a successful connect are logged and treated the same way.
pub struct RedisCache {
    connection: RwLock<Option<ConnectionManager>>,
    default_ttl: Duration,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Connects to the Redis server at `url`.
    ///
    /// On failure the error is logged and a disabled cache is returned.
    pub async fn connect(url: &str, default_ttl: Duration) -> Self {
        match Self::open(url).await {
            Ok(connection) => {
                info!("Redis connection established");
                Self {
                    connection: RwLock::new(Some(connection)),
                    default_ttl,
                }
            }
            Err(e) => {
                warn!(error = %e, "Redis connection failed, caching disabled");
                Self::disabled(default_ttl)
            }
        }
    }

    /// Creates a cache that never connects.
    #[must_use]
    pub fn disabled(default_ttl: Duration) -> Self {
        Self {
            connection: RwLock::new(None),
            default_ttl,
        }
    }

    /// Returns the TTL applied when `set` is called without one.
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    async fn open(url: &str) -> Result<ConnectionManager> {
        let client = Client::open(url).map_err(|e| TrendsError::Cache(e.to_string()))?;

        let mut connection = timeout(CONNECT_TIMEOUT, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                TrendsError::Cache(format!(
                    "connection timed out after {}s",
                    CONNECT_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e| TrendsError::Cache(e.to_string()))?;

        let _: String = ::redis::cmd("PING")
            .query_async(&mut connection)
            .await
            .map_err(|e| TrendsError::Cache(e.to_string()))?;

        Ok(connection)
    }

    /// Returns a handle to the live connection, if any.
    ///
    /// `ConnectionManager` is a cheap clone over a shared multiplexed connection.
    async fn connection(&self) -> Option<ConnectionManager> {
        self.connection.read().await.clone()
    }
}

impl Default for RedisCache {
    fn default() -> Self {
        Self::disabled(DEFAULT_TTL)
    }
}

#[async_trait]
impl TrendCache for RedisCache {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Option<String> {
        let mut connection = self.connection().await?;

        let value: ::redis::RedisResult<Option<String>> = connection.get(key).await;
        match value {
            Ok(Some(value)) => {
                debug!("Cache hit");
                Some(value)
            }
            Ok(None) => {
                debug!("Cache miss");
                None
            }
            Err(e) => {
                error!(error = %e, "Cache get failed");
                None
            }
        }
    }

    #[instrument(skip(self, value), fields(bytes = value.len()))]
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) {
        let Some(mut connection) = self.connection().await else {
            return;
        };

        // SETEX rejects a zero expiry.
        let ttl_secs = ttl.unwrap_or(self.default_ttl).as_secs().max(1);
        let result: ::redis::RedisResult<()> = connection.set_ex(key, value, ttl_secs).await;
        match result {
            Ok(()) => debug!(ttl_secs, "Cache set"),
            Err(e) => error!(error = %e, "Cache set failed"),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) {
        let Some(mut connection) = self.connection().await else {
            return;
        };

        let result: ::redis::RedisResult<()> = connection.del(key).await;
        match result {
            Ok(()) => debug!("Cache delete"),
            Err(e) => error!(error = %e, "Cache delete failed"),
        }
    }

    async fn is_connected(&self) -> bool {
        self.connection.read().await.is_some()
    }

    async fn disconnect(&self) {
        if self.connection.write().await.take().is_some() {
            info!("Redis connection closed");
        }
    }
}
