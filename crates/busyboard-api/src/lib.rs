//! # busyboard-api — HTTP Surface
//!
//! Axum service over the busyboard-core domain library:
//!
//! - `POST /v1/reports` — validated, rate-limited report submission.
//! - `GET /v1/summary` — ranked, optionally-anonymized aggregation.
//! - `GET /health/liveness`, `GET /health/readiness` — probes.
//! - `GET /metrics` — Prometheus exposition.
//! - `GET /openapi.json` — generated API document.
//!
//! [`app`] builds the full router from an [`AppState`]; tests drive it
//! in-process through `tower::ServiceExt` with the in-memory store.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod identity;
pub mod middleware;
pub mod network;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, Extension};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::metrics::{metrics_middleware, ApiMetrics};
use crate::state::AppState;

/// Submission bodies are three short strings; anything bigger is noise.
const BODY_LIMIT: usize = 16 * 1024;

/// Build the application router with a fresh metrics registry.
pub fn app(state: AppState) -> Router {
    app_with_metrics(state, ApiMetrics::new())
}

/// Build the application router around an existing metrics registry
/// (tests assert on counters through their own handle).
pub fn app_with_metrics(state: AppState, metrics: ApiMetrics) -> Router {
    Router::new()
        .route("/v1/reports", post(routes::reports::submit))
        .route("/v1/summary", get(routes::summary::summary))
        .route("/health/liveness", get(routes::health::liveness))
        .route("/health/readiness", get(routes::health::readiness))
        .route("/metrics", get(serve_metrics))
        .route("/openapi.json", get(openapi::openapi_json))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(Extension(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn serve_metrics(Extension(metrics): Extension<ApiMetrics>) -> impl IntoResponse {
    match metrics.gather_and_encode() {
        Ok(body) => (StatusCode::OK, body),
        Err(err) => {
            tracing::error!(error = %err, "metrics encoding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, String::new())
        }
    }
}
