#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/trends/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Google Trends data provider.
//!
//! This crate provides a Google Trends data provider that implements the
//! [`TrendsProvider`] trait from `trends-core`.
//!
//! # Features
//!
//! - Interest over time via the `multiline` widget
//! - Interest by region at a chosen [`Resolution`] via the `comparedgeo` widget
//! - Top and rising related queries via the `relatedsearches` widget
//! - Explicit connect and request timeouts so a hung upstream cannot stall callers
//!
//! # Example
//!
//! ```no_run
//! use trends_google::GoogleTrendsProvider;
//! use trends_core::{TrendQuery, TrendsProvider};
//!
//! # async fn example() -> trends_core::Result<()> {
//! let provider = GoogleTrendsProvider::new()?;
//! let query = TrendQuery::new("Spectrum Internet")?;
//!
//! let df = provider.interest_over_time(&query).await?;
//! println!("Fetched {} rows", df.height());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, warn};
use trends_core::provider::{
    BREAKOUT_SENTINEL, DATE_COLUMN, QUERY_COLUMN, REGION_COLUMN, SCORE_COLUMN, VALUE_COLUMN,
};
use trends_core::{RelatedQueries, Resolution, Result, TrendQuery, TrendsError, TrendsProvider};

/// Google Trends landing page, fetched once to obtain session cookies.
const HOME_URL: &str = "https://trends.google.com/trends/explore";

/// Explore API URL, which hands out widget tokens.
const EXPLORE_URL: &str = "https://trends.google.com/trends/api/explore";

/// Widget data API base URL.
const WIDGET_DATA_URL: &str = "https://trends.google.com/trends/api/widgetdata";

/// Default interface language.
const DEFAULT_HL: &str = "en-US";

/// Default timezone offset in minutes, as the web UI sends it.
const DEFAULT_TZ: i32 = 360;

/// Upper bound on establishing a connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on waiting for each read once connected.
const READ_TIMEOUT: Duration = Duration::from_secs(25);

/// Upper bound on a whole request, so a trickling response cannot stall callers.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// User agent for HTTP requests.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Provider name reported by [`TrendsProvider::name`].
const PROVIDER_NAME: &str = "Google Trends";

/// Google Trends data provider.
///
/// Implements [`TrendsProvider`]. Each fetch requests a fresh explore token
/// for the query and then the matching widget's data.
#[derive(Debug)]
pub struct GoogleTrendsProvider {
    client: reqwest::Client,
    hl: String,
    tz: i32,
    cookies: OnceCell<()>,
}

impl GoogleTrendsProvider {
    /// Create a new Google Trends provider with default settings.
    ///
    /// # Errors
    /// Returns [`TrendsError::Network`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TrendsError::Network(e.to_string()))?;

        Ok(Self::with_client(client))
    }

    /// Create a new Google Trends provider with a custom HTTP client.
    ///
    /// The client should keep a cookie store; Google rejects widget requests
    /// from sessions without one.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            hl: DEFAULT_HL.to_string(),
            tz: DEFAULT_TZ,
            cookies: OnceCell::new(),
        }
    }

    /// Set the interface language and timezone offset (minutes) sent upstream.
    #[must_use]
    pub fn with_locale(mut self, hl: impl Into<String>, tz: i32) -> Self {
        self.hl = hl.into();
        self.tz = tz;
        self
    }

    /// Fetch the landing page once so later calls carry session cookies.
    ///
    /// A failure is logged and retried on the next call.
    async fn prime_cookies(&self) {
        let primed = self
            .cookies
            .get_or_try_init(|| async {
                self.client
                    .get(HOME_URL)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|e| TrendsError::Network(e.to_string()))
            })
            .await;

        if let Err(e) = primed {
            warn!(error = %e, "Failed to obtain Google Trends cookies");
        }
    }

    /// Request explore widgets for a query.
    async fn explore(&self, query: &TrendQuery) -> Result<Vec<Widget>> {
        self.prime_cookies().await;

        let payload = serde_json::json!({
            "comparisonItem": [{
                "keyword": query.keyword(),
                "time": query.timeframe(),
                "geo": query.geo(),
            }],
            "category": 0,
            "property": "",
        });

        debug!(query = %query, "Requesting explore widgets");

        let response = self
            .client
            .post(EXPLORE_URL)
            .query(&[
                ("hl", self.hl.clone()),
                ("tz", self.tz.to_string()),
                ("req", payload.to_string()),
            ])
            .send()
            .await
            .map_err(|e| TrendsError::Network(e.to_string()))?;

        let body = Self::read_body(response, "explore").await?;
        let explore: ExploreResponse = parse_guarded(&body)?;
        Ok(explore.widgets)
    }

    /// Fetch the data behind one explore widget.
    async fn widget_data<T: DeserializeOwned>(&self, endpoint: &str, widget: &Widget) -> Result<T> {
        let url = format!("{}/{}", WIDGET_DATA_URL, endpoint);
        debug!("Fetching widget data: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("hl", self.hl.clone()),
                ("tz", self.tz.to_string()),
                ("req", widget.request.to_string()),
                ("token", widget.token.clone()),
            ])
            .send()
            .await
            .map_err(|e| TrendsError::Network(e.to_string()))?;

        let body = Self::read_body(response, endpoint).await?;
        parse_guarded(&body)
    }

    /// Map HTTP status to errors and return the response text.
    async fn read_body(response: reqwest::Response, endpoint: &str) -> Result<String> {
        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TrendsError::RateLimited {
                provider: PROVIDER_NAME.to_string(),
                retry_after: retry_after(response.headers()),
            });
        }

        if !response.status().is_success() {
            return Err(TrendsError::Network(format!(
                "HTTP {} for {}",
                response.status(),
                endpoint
            )));
        }

        response
            .text()
            .await
            .map_err(|e| TrendsError::Network(e.to_string()))
    }
}

#[async_trait]
impl TrendsProvider for GoogleTrendsProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn interest_over_time(&self, query: &TrendQuery) -> Result<DataFrame> {
        let widgets = self.explore(query).await?;
        let widget = find_widget(&widgets, "TIMESERIES")
            .ok_or_else(|| TrendsError::Parse("explore returned no TIMESERIES widget".to_string()))?;

        let response: MultilineResponse = self.widget_data("multiline", widget).await?;
        timeline_frame(response)
    }

    async fn interest_by_region(
        &self,
        query: &TrendQuery,
        resolution: Resolution,
    ) -> Result<DataFrame> {
        let widgets = self.explore(query).await?;
        let mut widget = find_widget(&widgets, "GEO_MAP")
            .cloned()
            .ok_or_else(|| TrendsError::Parse("explore returned no GEO_MAP widget".to_string()))?;

        if let Some(request) = widget.request.as_object_mut() {
            request.insert("resolution".to_string(), resolution.as_str().into());
            request.insert("includeLowSearchVolumeGeos".to_string(), false.into());
        }

        let response: GeoMapResponse = self.widget_data("comparedgeo", &widget).await?;
        geo_frame(response)
    }

    async fn related_queries(&self, query: &TrendQuery) -> Result<RelatedQueries> {
        let widgets = self.explore(query).await?;
        let Some(widget) = find_widget(&widgets, "RELATED_QUERIES") else {
            debug!(query = %query, "No related queries widget");
            return Ok(RelatedQueries::default());
        };

        let response: RelatedSearchesResponse =
            self.widget_data("relatedsearches", widget).await?;
        related_frames(response)
    }
}

/// Find the first widget whose id starts with `prefix`.
///
/// Related-query widget ids carry a numeric suffix (e.g. `RELATED_QUERIES_0`).
fn find_widget<'a>(widgets: &'a [Widget], prefix: &str) -> Option<&'a Widget> {
    widgets.iter().find(|w| w.id.starts_with(prefix))
}

/// Strip the anti-hijacking prefix (`)]}'` and friends) and decode JSON.
fn parse_guarded<T: DeserializeOwned>(body: &str) -> Result<T> {
    let start = body
        .find('{')
        .ok_or_else(|| TrendsError::Parse("response contains no JSON object".to_string()))?;
    serde_json::from_str(&body[start..]).map_err(|e| TrendsError::Parse(e.to_string()))
}

/// Render a unix timestamp (seconds, as a string) as `YYYY-MM-DD HH:MM:SS`.
fn format_timestamp(raw: &str) -> Result<String> {
    let secs: i64 = raw
        .parse()
        .map_err(|_| TrendsError::Parse(format!("invalid timestamp {raw:?}")))?;
    DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .ok_or_else(|| TrendsError::Parse(format!("timestamp {secs} out of range")))
}

/// Read the `Retry-After` header, in either delta-seconds or HTTP-date form.
///
/// A date in the past means retry now.
fn retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    let raw = headers.get(reqwest::header::RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(secs) = raw.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let at = DateTime::parse_from_rfc2822(raw).ok()?.with_timezone(&Utc);
    Some((at - Utc::now()).to_std().unwrap_or(Duration::ZERO))
}

/// Build the interest-over-time table.
fn timeline_frame(response: MultilineResponse) -> Result<DataFrame> {
    let points = response.default.timeline_data;

    let dates = points
        .iter()
        .map(|p| format_timestamp(&p.time))
        .collect::<Result<Vec<_>>>()?;
    let values: Vec<Option<i64>> = points.iter().map(|p| p.value.first().copied()).collect();

    DataFrame::new(vec![
        Column::new(DATE_COLUMN.into(), dates),
        Column::new(SCORE_COLUMN.into(), values),
    ])
    .map_err(|e| TrendsError::Parse(e.to_string()))
}

/// Build the interest-by-region table.
fn geo_frame(response: GeoMapResponse) -> Result<DataFrame> {
    let rows = response.default.geo_map_data;

    let regions: Vec<String> = rows.iter().map(|r| r.geo_name.clone()).collect();
    let values: Vec<Option<i64>> = rows.iter().map(|r| r.value.first().copied()).collect();

    DataFrame::new(vec![
        Column::new(REGION_COLUMN.into(), regions),
        Column::new(SCORE_COLUMN.into(), values),
    ])
    .map_err(|e| TrendsError::Parse(e.to_string()))
}

/// Build the top and rising related-query tables.
///
/// The first ranked list is "top", the second "rising". Rising values are kept
/// as strings so the breakout sentinel survives.
fn related_frames(response: RelatedSearchesResponse) -> Result<RelatedQueries> {
    let mut lists = response.default.ranked_list.into_iter();
    let top = lists.next().map(|l| l.ranked_keyword).unwrap_or_default();
    let rising = lists.next().map(|l| l.ranked_keyword).unwrap_or_default();

    let top = if top.is_empty() {
        None
    } else {
        let queries: Vec<String> = top.iter().map(|k| k.query.clone()).collect();
        let values: Vec<i64> = top.iter().map(|k| k.value).collect();
        Some(
            DataFrame::new(vec![
                Column::new(QUERY_COLUMN.into(), queries),
                Column::new(VALUE_COLUMN.into(), values),
            ])
            .map_err(|e| TrendsError::Parse(e.to_string()))?,
        )
    };

    let rising = if rising.is_empty() {
        None
    } else {
        let queries: Vec<String> = rising.iter().map(|k| k.query.clone()).collect();
        let values: Vec<String> = rising
            .iter()
            .map(|k| {
                if k.formatted_value.as_deref() == Some(BREAKOUT_SENTINEL) {
                    BREAKOUT_SENTINEL.to_string()
                } else {
                    k.value.to_string()
                }
            })
            .collect();
        Some(
            DataFrame::new(vec![
                Column::new(QUERY_COLUMN.into(), queries),
                Column::new(VALUE_COLUMN.into(), values),
            ])
            .map_err(|e| TrendsError::Parse(e.to_string()))?,
        )
    };

    Ok(RelatedQueries { top, rising })
}

// ============================================================================
// Google Trends API Response Types
// ============================================================================

/// Explore API response.
#[derive(Debug, Deserialize)]
struct ExploreResponse {
    #[serde(default)]
    widgets: Vec<Widget>,
}

/// One explore widget; `request` is echoed back verbatim to widgetdata.
#[derive(Debug, Clone, Deserialize)]
struct Widget {
    id: String,
    token: String,
    request: serde_json::Value,
}

/// Multiline (interest over time) response.
#[derive(Debug, Deserialize)]
struct MultilineResponse {
    default: MultilineData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MultilineData {
    #[serde(default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
struct TimelinePoint {
    time: String,
    #[serde(default)]
    value: Vec<i64>,
}

/// Compared-geo (interest by region) response.
#[derive(Debug, Deserialize)]
struct GeoMapResponse {
    default: GeoMapData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeoMapData {
    #[serde(default)]
    geo_map_data: Vec<GeoRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeoRow {
    geo_name: String,
    #[serde(default)]
    value: Vec<i64>,
}

/// Related-searches response.
#[derive(Debug, Deserialize)]
struct RelatedSearchesResponse {
    default: RelatedSearchesData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelatedSearchesData {
    #[serde(default)]
    ranked_list: Vec<RankedList>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankedList {
    #[serde(default)]
    ranked_keyword: Vec<RankedKeyword>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankedKeyword {
    query: String,
    value: i64,
    formatted_value: Option<String>,
}
