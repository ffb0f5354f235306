#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/trends/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for the keyword trends pipeline.
//!
//! This crate provides the foundational abstractions:
//!
//! - [`TrendsProvider`](provider::TrendsProvider) - Upstream popularity data as tables
//! - [`TrendCache`](cache::TrendCache) - Best-effort key/value cache with TTL
//! - [`TrendResult`](types::TrendResult) - The response shape that is cached and served
//! - [`normalize`] - Table to record conversion with ranking and truncation rules

/// Cache trait for storing serialized results.
pub mod cache;
/// Error types for trends operations.
pub mod error;
/// Provider table to record shape conversion.
pub mod normalize;
/// Provider trait for fetching popularity tables.
pub mod provider;
/// Geographic resolution for region queries.
pub mod resolution;
/// Core data types (TrendQuery, TrendResult, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::{TrendCache, TrendCacheExt};
pub use error::{Result, TrendsError};
pub use provider::{RelatedQueries, TrendsProvider};
pub use resolution::Resolution;
pub use types::{
    DEFAULT_GEO, DEFAULT_TIMEFRAME, Facet, MAX_RANKED_ITEMS, RankedTerm, RegionScore,
    TimeSeriesPoint, TrendQuery, TrendResult,
};
