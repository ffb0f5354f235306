//! Core data types for keyword popularity data.
//!
//! This module defines the fundamental data structures:
//!
//! - [`TrendQuery`] - Validated (keyword, timeframe, geo) request
//! - [`TimeSeriesPoint`] - One sampled date of the popularity index
//! - [`RegionScore`] - Popularity index for one region
//! - [`RankedTerm`] - A related or rising search term
//! - [`TrendResult`] - The aggregate response, and the unit of caching
//! - [`Facet`] - One normalized sequence plus whether its fetch degraded

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, TrendsError};

/// Default provider timeframe expression.
pub const DEFAULT_TIMEFRAME: &str = "today 12-m";

/// Default geo filter.
pub const DEFAULT_GEO: &str = "US";

/// Maximum number of entries kept in region and ranked-term lists.
pub const MAX_RANKED_ITEMS: usize = 20;

/// Prefix shared by every trends cache key.
const CACHE_KEY_PREFIX: &str = "trends";

/// A validated request for keyword popularity data.
///
/// The keyword is kept exactly as supplied; normalization only happens when
/// building the cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrendQuery {
    keyword: String,
    timeframe: String,
    geo: String,
}

impl TrendQuery {
    /// Creates a query for a keyword with the default timeframe and geo.
    ///
    /// # Errors
    /// Returns [`TrendsError::InvalidParameter`] if the keyword is empty or
    /// whitespace only.
    pub fn new(keyword: impl Into<String>) -> Result<Self> {
        let keyword = keyword.into();
        if keyword.trim().is_empty() {
            return Err(TrendsError::InvalidParameter(
                "keyword must not be empty".to_string(),
            ));
        }

        Ok(Self {
            keyword,
            timeframe: DEFAULT_TIMEFRAME.to_string(),
            geo: DEFAULT_GEO.to_string(),
        })
    }

    /// Sets the provider timeframe expression (e.g. "today 3-m").
    #[must_use]
    pub fn with_timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.timeframe = timeframe.into();
        self
    }

    /// Sets the geo filter; an empty string means worldwide.
    #[must_use]
    pub fn with_geo(mut self, geo: impl Into<String>) -> Self {
        self.geo = geo.into();
        self
    }

    /// Returns the keyword as supplied.
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Returns the timeframe expression.
    #[must_use]
    pub fn timeframe(&self) -> &str {
        &self.timeframe
    }

    /// Returns the geo filter.
    #[must_use]
    pub fn geo(&self) -> &str {
        &self.geo
    }

    /// Builds the deterministic cache key for this query.
    ///
    /// The keyword is lowercased and each whitespace run becomes a single `_`,
    /// so "Spectrum  Internet" and "spectrum internet" share a key. Timeframe
    /// and geo are kept verbatim. `%` and `:` are escaped in every component so
    /// a separator inside a value cannot alias another query.
    #[must_use]
    pub fn cache_key(&self) -> String {
        let keyword = self
            .keyword
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_");

        format!(
            "{}:{}:{}:{}",
            CACHE_KEY_PREFIX,
            escape_key_component(&keyword),
            escape_key_component(&self.timeframe),
            escape_key_component(&self.geo)
        )
    }
}

impl fmt::Display for TrendQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let geo = if self.geo.is_empty() {
            "worldwide"
        } else {
            &self.geo
        };
        write!(f, "{} [{}, {}]", self.keyword, self.timeframe, geo)
    }
}

fn escape_key_component(component: &str) -> String {
    component.replace('%', "%25").replace(':', "%3A")
}

/// One sampled date of the popularity index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Calendar day (YYYY-MM-DD).
    pub date: String,
    /// Popularity index (0-100).
    pub value: u32,
    /// Keyword the point belongs to.
    pub keyword: String,
}

impl TimeSeriesPoint {
    /// Creates a new time series point.
    #[must_use]
    pub fn new(date: impl Into<String>, value: u32, keyword: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            value,
            keyword: keyword.into(),
        }
    }
}

/// Popularity index for one region.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionScore {
    /// Region display name.
    pub region: String,
    /// Popularity index (0-100).
    pub value: u32,
}

impl RegionScore {
    /// Creates a new region score.
    #[must_use]
    pub fn new(region: impl Into<String>, value: u32) -> Self {
        Self {
            region: region.into(),
            value,
        }
    }
}

/// A related or rising search term.
///
/// For rising terms the value is a growth percentage and may exceed 100.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedTerm {
    /// The search term.
    pub text: String,
    /// Relative score.
    pub value: u32,
}

impl RankedTerm {
    /// Creates a new ranked term.
    #[must_use]
    pub fn new(text: impl Into<String>, value: u32) -> Self {
        Self {
            text: text.into(),
            value,
        }
    }
}

/// Aggregate popularity data for one keyword.
///
/// This exact shape is written to the cache and returned to callers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendResult {
    /// Keyword as requested.
    pub keyword: String,
    /// Chronological popularity series.
    pub interest_over_time: Vec<TimeSeriesPoint>,
    /// Top regions, highest score first.
    pub interest_by_region: Vec<RegionScore>,
    /// Top related queries in provider order.
    pub related_queries: Vec<RankedTerm>,
    /// Rising queries in provider order.
    pub rising_queries: Vec<RankedTerm>,
}

impl TrendResult {
    /// Creates a result with all facets empty.
    #[must_use]
    pub fn empty(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Default::default()
        }
    }

    /// Returns true if every facet is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interest_over_time.is_empty()
            && self.interest_by_region.is_empty()
            && self.related_queries.is_empty()
            && self.rising_queries.is_empty()
    }

    /// Checks the list-shape invariants of this result.
    ///
    /// # Errors
    /// Returns [`TrendsError::InvalidParameter`] if a list is over length,
    /// regions are unsorted, or a region score is zero.
    pub fn validate(&self) -> Result<()> {
        if self.keyword.trim().is_empty() {
            return Err(TrendsError::InvalidParameter(
                "result keyword must not be empty".to_string(),
            ));
        }

        for (name, len) in [
            ("interest_by_region", self.interest_by_region.len()),
            ("related_queries", self.related_queries.len()),
            ("rising_queries", self.rising_queries.len()),
        ] {
            if len > MAX_RANKED_ITEMS {
                return Err(TrendsError::InvalidParameter(format!(
                    "{name} has {len} entries, maximum is {MAX_RANKED_ITEMS}"
                )));
            }
        }

        if self.interest_by_region.iter().any(|r| r.value == 0) {
            return Err(TrendsError::InvalidParameter(
                "interest_by_region contains a zero score".to_string(),
            ));
        }

        if self
            .interest_by_region
            .windows(2)
            .any(|pair| pair[0].value < pair[1].value)
        {
            return Err(TrendsError::InvalidParameter(
                "interest_by_region is not sorted by descending value".to_string(),
            ));
        }

        Ok(())
    }
}

/// One normalized sequence from a fail-soft fetch.
///
/// An empty facet is ambiguous on its own: the provider may have no data, or
/// the fetch may have failed. `failure` records the latter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Facet<T> {
    data: T,
    failure: Option<String>,
}

impl<T> Facet<T> {
    /// Creates a facet from successfully fetched data.
    #[must_use]
    pub const fn fetched(data: T) -> Self {
        Self {
            data,
            failure: None,
        }
    }

    /// Returns the upstream failure message, if the fetch degraded.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Returns true if the fetch failed and the data is a placeholder.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }

    /// Returns the facet data.
    #[must_use]
    pub const fn data(&self) -> &T {
        &self.data
    }

    /// Consumes the facet and returns its data.
    #[must_use]
    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T: Default> Facet<T> {
    /// Creates an empty facet for a failed fetch.
    #[must_use]
    pub fn degraded(failure: impl Into<String>) -> Self {
        Self {
            data: T::default(),
            failure: Some(failure.into()),
        }
    }
}
