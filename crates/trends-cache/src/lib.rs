#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/trends/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Cache implementations for the keyword trends pipeline.
//!
//! This crate provides implementations of the [`TrendCache`] trait from `trends-core`:
//!
//! - [`RedisCache`] - Redis-backed cache (default, requires `redis` feature)
//! - [`InMemoryCache`] - Simple in-memory cache for testing
//! - [`NoopCache`] - No-op cache that doesn't store anything

/// In-memory cache implementation.
pub mod memory;
/// No-op cache implementation.
pub mod noop;

/// Redis-based cache implementation.
#[cfg(feature = "redis")]
pub mod redis_cache;

// Re-export the trait for convenience
pub use trends_core::TrendCache;

// Re-export implementations
pub use memory::InMemoryCache;
pub use noop::NoopCache;

#[cfg(feature = "redis")]
pub use redis_cache::RedisCache;

/// Default entry lifetime when neither the caller nor the cache sets one.
pub const DEFAULT_TTL: std::time::Duration = std::time::Duration::from_secs(3600);
