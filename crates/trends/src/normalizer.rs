//! Fail-soft fetches that turn provider tables into response facets.

use std::sync::Arc;

use tracing::{instrument, warn};

use trends_core::{
    Facet, RankedTerm, RegionScore, Resolution, Result, TimeSeriesPoint, TrendQuery,
    TrendsProvider, normalize,
};

/// Top and rising related terms, in that order.
pub type RelatedTerms = (Vec<RankedTerm>, Vec<RankedTerm>);

/// Runs one provider query per facet and normalizes the table it returns.
///
/// Each operation is independent and never fails: a provider or table error
/// is logged and the facet comes back empty and marked degraded.
#[derive(Debug, Clone)]
pub struct ShapeNormalizer {
    provider: Arc<dyn TrendsProvider>,
    resolution: Resolution,
}

impl ShapeNormalizer {
    /// Create a normalizer over a provider, using region-level resolution.
    #[must_use]
    pub fn new(provider: Arc<dyn TrendsProvider>) -> Self {
        Self {
            provider,
            resolution: Resolution::Region,
        }
    }

    /// Set the resolution used for interest-by-region queries.
    #[must_use]
    pub const fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Returns the name of the underlying provider.
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Fetch the chronological popularity series for a query.
    #[instrument(skip(self), fields(query = %query, provider = self.provider.name()))]
    pub async fn fetch_time_series(&self, query: &TrendQuery) -> Facet<Vec<TimeSeriesPoint>> {
        settle("interest_over_time", self.try_time_series(query).await)
    }

    /// Fetch the top regions for a query, highest score first.
    #[instrument(skip(self), fields(query = %query, provider = self.provider.name()))]
    pub async fn fetch_region_scores(&self, query: &TrendQuery) -> Facet<Vec<RegionScore>> {
        settle("interest_by_region", self.try_region_scores(query).await)
    }

    /// Fetch the top and rising related terms for a query.
    ///
    /// A failure in either table degrades both halves.
    #[instrument(skip(self), fields(query = %query, provider = self.provider.name()))]
    pub async fn fetch_related_and_rising(&self, query: &TrendQuery) -> Facet<RelatedTerms> {
        settle("related_queries", self.try_related_and_rising(query).await)
    }

    async fn try_time_series(&self, query: &TrendQuery) -> Result<Vec<TimeSeriesPoint>> {
        let frame = self.provider.interest_over_time(query).await?;
        normalize::time_series(&frame, query.keyword())
    }

    async fn try_region_scores(&self, query: &TrendQuery) -> Result<Vec<RegionScore>> {
        let frame = self
            .provider
            .interest_by_region(query, self.resolution)
            .await?;
        normalize::region_scores(&frame)
    }

    async fn try_related_and_rising(&self, query: &TrendQuery) -> Result<RelatedTerms> {
        let tables = self.provider.related_queries(query).await?;

        let top = tables
            .top
            .as_ref()
            .map(normalize::top_terms)
            .transpose()?
            .unwrap_or_default();
        let rising = tables
            .rising
            .as_ref()
            .map(normalize::rising_terms)
            .transpose()?
            .unwrap_or_default();

        Ok((top, rising))
    }
}

/// Turn a fetch result into a facet, logging the failure if there was one.
fn settle<T: Default>(facet: &str, result: Result<T>) -> Facet<T> {
    match result {
        Ok(data) => Facet::fetched(data),
        Err(e) => {
            warn!(facet, error = %e, "Provider fetch failed, returning empty facet");
            Facet::degraded(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeProvider, KEYWORD, spectrum_query};
    use polars::prelude::*;
    use trends_core::RelatedQueries;
    use trends_core::provider::{QUERY_COLUMN, VALUE_COLUMN};

    #[tokio::test]
    async fn test_fetches_normalize_provider_tables() {
        let normalizer = ShapeNormalizer::new(Arc::new(FakeProvider::spectrum()));
        let query = spectrum_query();

        let series = normalizer.fetch_time_series(&query).await;
        assert!(!series.is_degraded());
        assert_eq!(
            series.into_data(),
            vec![TimeSeriesPoint::new("2024-02-01", 75, KEYWORD)]
        );

        let regions = normalizer.fetch_region_scores(&query).await;
        assert_eq!(regions.into_data(), vec![RegionScore::new("California", 100)]);

        let (top, rising) = normalizer.fetch_related_and_rising(&query).await.into_data();
        assert_eq!(top, vec![RankedTerm::new("spectrum internet", 100)]);
        assert_eq!(rising, vec![RankedTerm::new("spectrum mobile", 1250)]);
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_each_facet() {
        let normalizer = ShapeNormalizer::new(Arc::new(FakeProvider::failing()));
        let query = spectrum_query();

        let series = normalizer.fetch_time_series(&query).await;
        assert!(series.is_degraded());
        assert!(series.data().is_empty());

        let regions = normalizer.fetch_region_scores(&query).await;
        assert!(regions.is_degraded());
        assert!(regions.data().is_empty());

        let related = normalizer.fetch_related_and_rising(&query).await;
        assert!(related.is_degraded());
        assert_eq!(related.into_data(), (Vec::new(), Vec::new()));
    }

    #[tokio::test]
    async fn test_missing_tables_yield_empty_halves() {
        let rising = DataFrame::new(vec![
            Column::new(QUERY_COLUMN.into(), vec!["spectrum outage"]),
            Column::new(VALUE_COLUMN.into(), vec!["Breakout"]),
        ])
        .unwrap();
        let provider = FakeProvider {
            related: Some(RelatedQueries {
                top: None,
                rising: Some(rising),
            }),
            ..FakeProvider::empty()
        };
        let normalizer = ShapeNormalizer::new(Arc::new(provider));

        let related = normalizer.fetch_related_and_rising(&spectrum_query()).await;
        assert!(!related.is_degraded());
        let (top, rising) = related.into_data();
        assert!(top.is_empty());
        assert_eq!(rising, vec![RankedTerm::new("spectrum outage", 100)]);
    }

    #[tokio::test]
    async fn test_bad_rising_value_degrades_both_halves() {
        let top = DataFrame::new(vec![
            Column::new(QUERY_COLUMN.into(), vec!["spectrum internet"]),
            Column::new(VALUE_COLUMN.into(), vec![100i64]),
        ])
        .unwrap();
        let rising = DataFrame::new(vec![
            Column::new(QUERY_COLUMN.into(), vec!["spectrum mobile"]),
            Column::new(VALUE_COLUMN.into(), vec!["+1,250%"]),
        ])
        .unwrap();
        let provider = FakeProvider {
            related: Some(RelatedQueries {
                top: Some(top),
                rising: Some(rising),
            }),
            ..FakeProvider::empty()
        };
        let normalizer = ShapeNormalizer::new(Arc::new(provider));

        let related = normalizer.fetch_related_and_rising(&spectrum_query()).await;
        assert!(related.is_degraded());
        assert_eq!(related.into_data(), (Vec::new(), Vec::new()));
    }

    #[tokio::test]
    async fn test_resolution_is_forwarded() {
        let provider = Arc::new(FakeProvider::empty());
        let normalizer =
            ShapeNormalizer::new(provider.clone()).with_resolution(Resolution::City);

        normalizer.fetch_region_scores(&spectrum_query()).await;
        assert_eq!(provider.last_resolution(), Some(Resolution::City));
        assert_eq!(normalizer.provider_name(), "fake");
    }
}
