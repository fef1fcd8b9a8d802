//! # Report Submission Route
//!
//! `POST /v1/reports`. Resolves the source identity, gates on the
//! trusted networks, then hands the entry to the core write path. The
//! checks run in a fixed order so every rejection maps to exactly one
//! reason: identity → network → body shape → validation → daily cap →
//! dedup → store.

use std::net::SocketAddr;

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use busyboard_core::{submit_report, ReportEntry};

use crate::error::{AppError, SubmitResponse};
use crate::extractors::extract_json;
use crate::identity::extract_source_identity;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Submission body. `number` and `section` may be omitted (residence
/// reports carry only a code).
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReportRequest {
    pub code: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub section: String,
}

/// Submit one "class is busy" report.
#[utoipa::path(
    post,
    path = "/v1/reports",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Report accepted", body = SubmitResponse),
        (status = 400, description = "Entry failed validation", body = SubmitResponse),
        (status = 429, description = "Untrusted source, daily cap, or duplicate", body = SubmitResponse),
        (status = 503, description = "Store unavailable", body = SubmitResponse),
    ),
    tag = "reports"
)]
pub async fn submit(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Json<ReportRequest>, JsonRejection>,
) -> Response {
    let remote = connect_info.map(|ConnectInfo(addr)| addr);
    match handle(&state, &headers, remote, body).await {
        Ok(()) => {
            metrics.report_accepted();
            Json(SubmitResponse::accepted()).into_response()
        }
        Err(err) => {
            metrics.report_rejected(err.reason());
            err.into_response()
        }
    }
}

async fn handle(
    state: &AppState,
    headers: &HeaderMap,
    remote: Option<SocketAddr>,
    body: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<(), AppError> {
    let identity =
        extract_source_identity(headers, remote).map_err(|_| AppError::NoIdentity)?;

    if !state.networks.contains(&identity) {
        tracing::info!(%identity, "submission from untrusted source");
        return Err(AppError::UntrustedSource);
    }

    let request = extract_json(body)?;
    let entry = ReportEntry::new(request.code, request.number, request.section);

    // The submitter's local date buckets both rate limits.
    let today = chrono::Local::now().date_naive();
    submit_report(
        state.store.as_ref(),
        &state.catalog,
        &state.rules,
        &state.limits,
        &identity,
        &entry,
        today,
    )
    .await?;

    Ok(())
}
