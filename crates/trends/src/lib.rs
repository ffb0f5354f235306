#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/trends/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Cache-aside keyword popularity pipeline.
//!
//! This crate re-exports the core types and the provider and cache
//! implementations, and provides [`TrendsService`], the cache-aside
//! orchestrator, on top of [`ShapeNormalizer`].
//!
//! # Features
//!
//! - `google` - Google Trends provider
//! - `cache-redis` - Redis-backed caching
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use trends::{GoogleTrendsProvider, RedisCache, TrendQuery, TrendsService};
//!
//! #[tokio::main]
//! async fn main() -> trends::Result<()> {
//!     let ttl = Duration::from_secs(3600);
//!     let cache = Arc::new(RedisCache::connect("redis://localhost:6379", ttl).await);
//!     let provider = Arc::new(GoogleTrendsProvider::new()?);
//!     let service = TrendsService::new(provider, cache).with_ttl(ttl);
//!
//!     let query = TrendQuery::new("Spectrum Internet")?.with_geo("US");
//!     let result = service.get_trends(&query).await?;
//!     println!("{} points", result.interest_over_time.len());
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use trends_core::*;

// Cache implementations
#[cfg(feature = "cache-redis")]
pub use trends_cache::RedisCache;
pub use trends_cache::{InMemoryCache, NoopCache};

// Providers
#[cfg(feature = "google")]
pub use trends_google::GoogleTrendsProvider;

mod normalizer;
mod service;

pub use normalizer::{RelatedTerms, ShapeNormalizer};
pub use service::{DEFAULT_CACHE_TTL, MAX_COMPARE_KEYWORDS, TrendsService};

#[cfg(test)]
mod testing;
