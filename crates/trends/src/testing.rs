//! Test doubles for the provider seam.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use polars::prelude::*;
use trends_core::provider::{DATE_COLUMN, QUERY_COLUMN, REGION_COLUMN, SCORE_COLUMN, VALUE_COLUMN};
use trends_core::{RelatedQueries, Resolution, Result, TrendQuery, TrendsError, TrendsProvider};

pub(crate) const KEYWORD: &str = "Spectrum Internet";

pub(crate) fn spectrum_query() -> TrendQuery {
    TrendQuery::new(KEYWORD)
        .unwrap()
        .with_timeframe("today 12-m")
        .with_geo("US")
}

/// Provider serving fixed tables; a `None` table fails with a network error.
#[derive(Debug)]
pub(crate) struct FakeProvider {
    pub(crate) over_time: Option<DataFrame>,
    pub(crate) by_region: Option<DataFrame>,
    pub(crate) related: Option<RelatedQueries>,
    pub(crate) calls: AtomicUsize,
    pub(crate) resolution: Mutex<Option<Resolution>>,
}

impl FakeProvider {
    pub(crate) fn empty() -> Self {
        Self {
            over_time: Some(DataFrame::empty()),
            by_region: Some(DataFrame::empty()),
            related: Some(RelatedQueries::default()),
            calls: AtomicUsize::new(0),
            resolution: Mutex::new(None),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            over_time: None,
            by_region: None,
            related: None,
            ..Self::empty()
        }
    }

    /// One row per facet, matching the documented end-to-end example.
    pub(crate) fn spectrum() -> Self {
        let over_time = DataFrame::new(vec![
            Column::new(DATE_COLUMN.into(), vec!["2024-02-01 00:00:00"]),
            Column::new(SCORE_COLUMN.into(), vec![75i64]),
        ])
        .unwrap();
        let by_region = DataFrame::new(vec![
            Column::new(REGION_COLUMN.into(), vec!["California"]),
            Column::new(SCORE_COLUMN.into(), vec![100i64]),
        ])
        .unwrap();
        let top = DataFrame::new(vec![
            Column::new(QUERY_COLUMN.into(), vec!["spectrum internet"]),
            Column::new(VALUE_COLUMN.into(), vec![100i64]),
        ])
        .unwrap();
        let rising = DataFrame::new(vec![
            Column::new(QUERY_COLUMN.into(), vec!["spectrum mobile"]),
            Column::new(VALUE_COLUMN.into(), vec!["1250"]),
        ])
        .unwrap();

        Self {
            over_time: Some(over_time),
            by_region: Some(by_region),
            related: Some(RelatedQueries {
                top: Some(top),
                rising: Some(rising),
            }),
            ..Self::empty()
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn last_resolution(&self) -> Option<Resolution> {
        *self.resolution.lock().unwrap()
    }

    fn serve<T: Clone>(&self, table: &Option<T>) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        table
            .clone()
            .ok_or_else(|| TrendsError::Network("upstream unavailable".to_string()))
    }
}

#[async_trait]
impl TrendsProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    async fn interest_over_time(&self, _query: &TrendQuery) -> Result<DataFrame> {
        self.serve(&self.over_time)
    }

    async fn interest_by_region(
        &self,
        _query: &TrendQuery,
        resolution: Resolution,
    ) -> Result<DataFrame> {
        *self.resolution.lock().unwrap() = Some(resolution);
        self.serve(&self.by_region)
    }

    async fn related_queries(&self, _query: &TrendQuery) -> Result<RelatedQueries> {
        self.serve(&self.related)
    }
}
