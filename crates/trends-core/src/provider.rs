//! Provider trait for fetching keyword popularity tables.
//!
//! Providers return polars [`DataFrame`]s whose layout is fixed by the column
//! constants in this module:
//!
//! - interest over time: [`DATE_COLUMN`] and [`SCORE_COLUMN`]
//! - interest by region: [`REGION_COLUMN`] and [`SCORE_COLUMN`]
//! - related queries: [`QUERY_COLUMN`] and [`VALUE_COLUMN`]
//!
//! Column names never depend on the keyword, so any keyword fits any table.

use async_trait::async_trait;
use polars::prelude::DataFrame;
use std::fmt::Debug;

use crate::{error::Result, resolution::Resolution, types::TrendQuery};

/// Timestamp column of an interest-over-time table.
pub const DATE_COLUMN: &str = "date";

/// Display name column of an interest-by-region table.
pub const REGION_COLUMN: &str = "geoName";

/// Popularity index column of the interest-over-time and interest-by-region
/// tables, for the keyword of the query.
pub const SCORE_COLUMN: &str = "score";

/// Term column of a related-queries table.
pub const QUERY_COLUMN: &str = "query";

/// Score column of a related-queries table.
///
/// In rising tables this column may hold strings, including the
/// [`BREAKOUT_SENTINEL`].
pub const VALUE_COLUMN: &str = "value";

/// Rising-table value meaning unbounded growth.
pub const BREAKOUT_SENTINEL: &str = "Breakout";

/// Related-query tables for one keyword.
///
/// Either table may be absent when the provider has nothing for the keyword.
#[derive(Clone, Debug, Default)]
pub struct RelatedQueries {
    /// Most popular related queries, in provider order.
    pub top: Option<DataFrame>,
    /// Fastest growing related queries, in provider order.
    pub rising: Option<DataFrame>,
}

/// Upstream source of keyword popularity tables.
///
/// Each call issues one provider query for the keyword, timeframe and geo of
/// `query`. Implementations report upstream trouble as errors; callers decide
/// how to degrade.
#[async_trait]
pub trait TrendsProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "Google Trends").
    fn name(&self) -> &str;

    /// Fetches the popularity index over time.
    ///
    /// Returns a DataFrame with a [`DATE_COLUMN`] and a [`SCORE_COLUMN`].
    async fn interest_over_time(&self, query: &TrendQuery) -> Result<DataFrame>;

    /// Fetches the popularity index per region.
    ///
    /// Returns a DataFrame with a [`REGION_COLUMN`] and a [`SCORE_COLUMN`].
    async fn interest_by_region(
        &self,
        query: &TrendQuery,
        resolution: Resolution,
    ) -> Result<DataFrame>;

    /// Fetches the top and rising related-query tables.
    async fn related_queries(&self, query: &TrendQuery) -> Result<RelatedQueries>;
}
