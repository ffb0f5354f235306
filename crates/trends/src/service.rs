//! Cache-aside orchestration of trends requests.

use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tracing::{debug, info, instrument, warn};

use trends_core::{
    RegionScore, Result, TimeSeriesPoint, TrendCache, TrendCacheExt, TrendQuery, TrendResult,
    TrendsError, TrendsProvider,
};

use crate::normalizer::ShapeNormalizer;

/// Lifetime of cached results unless overridden with [`TrendsService::with_ttl`].
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Maximum number of keywords accepted by [`TrendsService::compare`].
pub const MAX_COMPARE_KEYWORDS: usize = 5;

/// Cache-aside controller for trends queries.
///
/// Hits are served straight from the cache. Misses fetch every facet through
/// the [`ShapeNormalizer`] concurrently, assemble a [`TrendResult`] and write
/// it back under the same key. Cache trouble and provider trouble both degrade
/// quietly; neither fails a request.
///
/// Concurrent identical misses may both fetch and both write; the last write
/// wins.
#[derive(Debug, Clone)]
pub struct TrendsService {
    normalizer: ShapeNormalizer,
    cache: Arc<dyn TrendCache>,
    ttl: Duration,
}

impl TrendsService {
    /// Create a service over a provider and a cache with the default TTL.
    #[must_use]
    pub fn new(provider: Arc<dyn TrendsProvider>, cache: Arc<dyn TrendCache>) -> Self {
        Self::with_normalizer(ShapeNormalizer::new(provider), cache)
    }

    /// Create a service over a preconfigured normalizer.
    #[must_use]
    pub fn with_normalizer(normalizer: ShapeNormalizer, cache: Arc<dyn TrendCache>) -> Self {
        Self {
            normalizer,
            cache,
            ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Set the TTL applied to every result this service caches.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns the cache this service reads and writes.
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn TrendCache> {
        &self.cache
    }

    /// Returns the TTL applied to cached results.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fetch all facets for a query, from the cache when possible.
    ///
    /// A cached entry that no longer decodes or violates the result
    /// invariants is ignored and overwritten.
    ///
    /// # Errors
    /// Returns [`TrendsError::Other`] if the assembled result breaks its own
    /// invariants. Provider failures are never errors here.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn get_trends(&self, query: &TrendQuery) -> Result<TrendResult> {
        let key = query.cache_key();

        if let Some(cached) = self.cache.get_json::<TrendResult>(&key).await {
            match cached.validate() {
                Ok(()) => {
                    info!("Returning cached data");
                    return Ok(cached);
                }
                Err(e) => warn!(key = %key, error = %e, "Ignoring invalid cache entry"),
            }
        }

        info!("Fetching fresh data");

        let (over_time, by_region, related) = futures::join!(
            self.normalizer.fetch_time_series(query),
            self.normalizer.fetch_region_scores(query),
            self.normalizer.fetch_related_and_rising(query),
        );

        let degraded = [
            over_time.is_degraded(),
            by_region.is_degraded(),
            related.is_degraded(),
        ]
        .into_iter()
        .filter(|d| *d)
        .count();
        if degraded > 0 {
            warn!(degraded, "Assembled result with degraded facets");
        }

        let (related_queries, rising_queries) = related.into_data();
        let result = TrendResult {
            keyword: query.keyword().to_string(),
            interest_over_time: over_time.into_data(),
            interest_by_region: by_region.into_data(),
            related_queries,
            rising_queries,
        };

        result
            .validate()
            .map_err(|e| TrendsError::Other(format!("assembled result is malformed: {e}")))?;

        self.cache.set_json(&key, &result, Some(self.ttl)).await;
        Ok(result)
    }

    /// Fetch only the top regions for a query, bypassing the cache.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn get_region_only(&self, query: &TrendQuery) -> Vec<RegionScore> {
        self.normalizer.fetch_region_scores(query).await.into_data()
    }

    /// Fetch only the popularity series for a query, bypassing the cache.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn get_interest_over_time_only(&self, query: &TrendQuery) -> Vec<TimeSeriesPoint> {
        self.normalizer.fetch_time_series(query).await.into_data()
    }

    /// Fetch full results for up to [`MAX_COMPARE_KEYWORDS`] keywords.
    ///
    /// Keywords are trimmed and all validated before any fetch starts. Results
    /// come back in input order.
    ///
    /// # Errors
    /// Returns [`TrendsError::TooManyKeywords`] for more than
    /// [`MAX_COMPARE_KEYWORDS`] keywords, and [`TrendsError::Keyword`] naming
    /// the first keyword that is invalid or whose fetch failed.
    #[instrument(skip(self, keywords), fields(count = keywords.len()))]
    pub async fn compare<S: AsRef<str>>(
        &self,
        keywords: &[S],
        timeframe: &str,
        geo: &str,
    ) -> Result<Vec<TrendResult>> {
        if keywords.len() > MAX_COMPARE_KEYWORDS {
            return Err(TrendsError::TooManyKeywords {
                max: MAX_COMPARE_KEYWORDS,
                got: keywords.len(),
            });
        }

        let queries = keywords
            .iter()
            .map(|keyword| {
                let keyword = keyword.as_ref().trim();
                TrendQuery::new(keyword)
                    .map(|q| q.with_timeframe(timeframe).with_geo(geo))
                    .map_err(|e| tag_keyword(keyword, e))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Comparing {} keywords", queries.len());

        try_join_all(queries.iter().map(|query| async move {
            self.get_trends(query)
                .await
                .map_err(|e| tag_keyword(query.keyword(), e))
        }))
        .await
    }

    /// Drop the cached result for a query, if any.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn invalidate(&self, query: &TrendQuery) {
        self.cache.delete(&query.cache_key()).await;
    }
}

fn tag_keyword(keyword: &str, source: TrendsError) -> TrendsError {
    TrendsError::Keyword {
        keyword: keyword.to_string(),
        source: Box::new(source),
    }
}
