//! Request handlers and router assembly.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};
use trends::{DEFAULT_GEO, DEFAULT_TIMEFRAME, TrendCache, TrendQuery, TrendResult};

use crate::config::Settings;
use crate::error::ApiError;
use crate::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Body of the single-keyword endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct TrendRequest {
    /// Search term.
    pub keyword: String,
    /// Provider timeframe expression.
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    /// Region code; empty means worldwide.
    #[serde(default = "default_geo")]
    pub geo: String,
}

impl TrendRequest {
    fn into_query(self) -> Result<TrendQuery, ApiError> {
        Ok(TrendQuery::new(self.keyword)?
            .with_timeframe(self.timeframe)
            .with_geo(self.geo))
    }
}

/// Query string of the compare endpoint.
#[derive(Debug, Clone, Deserialize)]
struct CompareParams {
    keywords: String,
    #[serde(default = "default_timeframe")]
    timeframe: String,
    #[serde(default = "default_geo")]
    geo: String,
}

fn default_timeframe() -> String {
    DEFAULT_TIMEFRAME.to_string()
}

fn default_geo() -> String {
    DEFAULT_GEO.to_string()
}

fn parse_body(body: Result<Json<TrendRequest>, JsonRejection>) -> Result<TrendQuery, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    request.into_query()
}

/// Build the router with all endpoints.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.settings);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/trends", post(get_trends))
        .route("/api/trends/region", post(get_region))
        .route("/api/trends/overtime", post(get_overtime))
        .route("/api/trends/compare", get(compare_trends))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let origin = match HeaderValue::from_str(&settings.frontend_url) {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(e) => {
            warn!(url = %settings.frontend_url, error = %e, "Invalid frontend URL, allowing any origin");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn root(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "message": state.settings.app_name,
        "version": state.settings.app_version,
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let cache_status = if state.service.cache().is_connected().await {
        "connected"
    } else {
        "disconnected"
    };

    Json(json!({
        "status": "healthy",
        "version": state.settings.app_version,
        "environment": state.settings.environment,
        "cache_status": cache_status,
    }))
}

async fn get_trends(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TrendRequest>, JsonRejection>,
) -> ApiResult<TrendResult> {
    let query = parse_body(body)?;
    info!(%query, "Trends request");

    let result = state
        .service
        .get_trends(&query)
        .await
        .map_err(|e| ApiError::fetch("trends data", e))?;
    Ok(Json(result))
}

async fn get_region(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TrendRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let query = parse_body(body)?;
    let regions = state.service.get_region_only(&query).await;
    Ok(Json(json!({ "interest_by_region": regions })))
}

async fn get_overtime(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TrendRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let query = parse_body(body)?;
    let series = state.service.get_interest_over_time_only(&query).await;
    Ok(Json(json!({ "interest_over_time": series })))
}

async fn compare_trends(
    State(state): State<Arc<AppState>>,
    params: Result<Query<CompareParams>, QueryRejection>,
) -> ApiResult<Value> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let keywords: Vec<&str> = params.keywords.split(',').collect();

    let comparisons = state
        .service
        .compare(&keywords, &params.timeframe, &params.geo)
        .await?;
    Ok(Json(json!({ "comparisons": comparisons })))
}
