//! HTTP tests driving the router without a network.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use clap::Parser;
use polars::prelude::*;
use serde_json::{Value, json};
use tower::ServiceExt;
use trends::provider::{DATE_COLUMN, QUERY_COLUMN, REGION_COLUMN, SCORE_COLUMN, VALUE_COLUMN};
use trends::{
    InMemoryCache, NoopCache, RelatedQueries, Resolution, TrendCache, TrendQuery, TrendsProvider,
    TrendsService,
};
use trends_server::{AppState, Settings, build_router};

const KEYWORD: &str = "Spectrum Internet";

/// Serves the same single-row tables for every keyword.
#[derive(Debug, Default)]
struct StubProvider {
    calls: AtomicUsize,
}

impl StubProvider {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrendsProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn interest_over_time(&self, _query: &TrendQuery) -> trends::Result<DataFrame> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(DataFrame::new(vec![
            Column::new(DATE_COLUMN.into(), vec!["2024-02-01 00:00:00"]),
            Column::new(SCORE_COLUMN.into(), vec![75i64]),
        ])
        .unwrap())
    }

    async fn interest_by_region(
        &self,
        _query: &TrendQuery,
        _resolution: Resolution,
    ) -> trends::Result<DataFrame> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(DataFrame::new(vec![
            Column::new(REGION_COLUMN.into(), vec!["California", "Alaska"]),
            Column::new(SCORE_COLUMN.into(), vec![100i64, 0]),
        ])
        .unwrap())
    }

    async fn related_queries(&self, _query: &TrendQuery) -> trends::Result<RelatedQueries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
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
        Ok(RelatedQueries {
            top: Some(top),
            rising: Some(rising),
        })
    }
}

fn settings() -> Settings {
    Settings::parse_from(["trends-server", "--environment", "test"])
}

fn app_with(provider: Arc<StubProvider>, cache: Arc<dyn TrendCache>) -> Router {
    let service = TrendsService::new(provider, cache);
    build_router(AppState::new(service, settings()))
}

fn app() -> (Router, Arc<StubProvider>) {
    let provider = Arc::new(StubProvider::default());
    let app = app_with(provider.clone(), Arc::new(InMemoryCache::new()));
    (app, provider)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_trends_end_to_end() {
    let (app, provider) = app();
    let body = json!({ "keyword": KEYWORD, "timeframe": "today 12-m", "geo": "US" });

    let (status, value) = send(app, post_json("/api/trends", &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        value,
        json!({
            "keyword": KEYWORD,
            "interest_over_time": [
                { "date": "2024-02-01", "value": 75, "keyword": KEYWORD }
            ],
            "interest_by_region": [{ "region": "California", "value": 100 }],
            "related_queries": [{ "text": "spectrum internet", "value": 100 }],
            "rising_queries": [{ "text": "spectrum mobile", "value": 1250 }],
        })
    );
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn test_trends_defaults_and_cache() {
    let provider = Arc::new(StubProvider::default());
    let cache = Arc::new(InMemoryCache::new());
    let app = app_with(provider.clone(), cache.clone());
    let body = json!({ "keyword": KEYWORD });

    let (status, _) = send(app.clone(), post_json("/api/trends", &body)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(app, post_json("/api/trends", &body)).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(provider.calls(), 3);
    let key = TrendQuery::new(KEYWORD).unwrap().cache_key();
    assert_eq!(key, "trends:spectrum_internet:today 12-m:US");
    assert!(cache.get(&key).await.is_some());
}

#[tokio::test]
async fn test_trends_rejects_blank_keyword() {
    let (app, provider) = app();

    let (status, value) = send(app, post_json("/api/trends", &json!({ "keyword": "  " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["detail"].as_str().unwrap().contains("keyword"));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_trends_rejects_malformed_body() {
    let (app, _) = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/trends")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"keyword\":"))
        .unwrap();

    let (status, value) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["detail"].is_string());
}

#[tokio::test]
async fn test_trends_rejects_missing_keyword() {
    let (app, _) = app();

    let (status, value) = send(app, post_json("/api/trends", &json!({ "geo": "US" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["detail"].is_string());
}

#[tokio::test]
async fn test_region_projection() {
    let (app, _) = app();
    let body = json!({ "keyword": KEYWORD });

    let (status, value) = send(app, post_json("/api/trends/region", &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        value,
        json!({ "interest_by_region": [{ "region": "California", "value": 100 }] })
    );
}

#[tokio::test]
async fn test_overtime_projection() {
    let (app, _) = app();
    let body = json!({ "keyword": KEYWORD });

    let (status, value) = send(app, post_json("/api/trends/overtime", &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        value,
        json!({
            "interest_over_time": [
                { "date": "2024-02-01", "value": 75, "keyword": KEYWORD }
            ]
        })
    );
}

#[tokio::test]
async fn test_compare_five_keywords() {
    let (app, _) = app();

    let (status, value) = send(app, get("/api/trends/compare?keywords=a,b,%20c,d,e")).await;

    assert_eq!(status, StatusCode::OK);
    let keywords: Vec<&str> = value["comparisons"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["keyword"].as_str().unwrap())
        .collect();
    assert_eq!(keywords, ["a", "b", "c", "d", "e"]);
}

#[tokio::test]
async fn test_compare_rejects_six_keywords() {
    let (app, provider) = app();

    let (status, value) = send(app, get("/api/trends/compare?keywords=a,b,c,d,e,f")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["detail"].as_str().unwrap().contains("Maximum 5"));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_compare_rejects_empty_segment() {
    let (app, provider) = app();

    let (status, _) = send(app, get("/api/trends/compare?keywords=a,,b")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_compare_requires_keywords() {
    let (app, _) = app();

    let (status, value) = send(app, get("/api/trends/compare?geo=US")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["detail"].is_string());
}

#[tokio::test]
async fn test_health_reports_cache_status() {
    let (app, _) = app();
    let (status, value) = send(app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["status"], "healthy");
    assert_eq!(value["environment"], "test");
    assert_eq!(value["cache_status"], "connected");

    let app = app_with(Arc::new(StubProvider::default()), Arc::new(NoopCache::new()));
    let (_, value) = send(app, get("/health")).await;
    assert_eq!(value["cache_status"], "disconnected");
}

#[tokio::test]
async fn test_root_banner() {
    let (app, _) = app();

    let (status, value) = send(app, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["message"], "Trends Insights API");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_cors_preflight_allows_frontend() {
    let (app, _) = app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/trends")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
}
