//! Cache trait for storing serialized trends results.
//!
//! This module defines the [`TrendCache`] trait that provides a best-effort
//! string key/value store with per-entry TTL, and [`TrendCacheExt`] for typed
//! JSON access on top of it.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::time::Duration;
use tracing::{error, warn};

/// Best-effort key/value cache with per-entry TTL.
///
/// No method reports failure to its caller. A backend that is unreachable or
/// errors behaves like an empty cache: reads miss and writes are dropped.
#[async_trait]
pub trait TrendCache: Send + Sync + Debug {
    /// Retrieves the value stored under `key`.
    ///
    /// Returns `None` on a miss, when the cache is disabled, or when the
    /// backend fails.
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    ///
    /// Uses the cache's default TTL when `ttl` is `None`.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>);

    /// Removes the entry stored under `key`, if any.
    async fn delete(&self, key: &str);

    /// Returns true if the backend connection is live.
    async fn is_connected(&self) -> bool;

    /// Releases the backend connection; later calls behave as disabled.
    async fn disconnect(&self);
}

/// Typed JSON helpers over any [`TrendCache`].
#[async_trait]
pub trait TrendCacheExt: TrendCache {
    /// Retrieves and deserializes the value stored under `key`.
    ///
    /// An entry that fails to deserialize is logged and treated as a miss.
    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Serializes `value` and stores it under `key`.
    ///
    /// Serialization failures are logged and the write is skipped.
    async fn set_json<T: Serialize + Sync>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, &raw, ttl).await,
            Err(e) => error!(key = %key, error = %e, "Failed to serialize cache entry"),
        }
    }
}

impl<C: TrendCache + ?Sized> TrendCacheExt for C {}
