//! # Summary Route
//!
//! `GET /v1/summary`. Unconditionally public: no identity or network
//! check applies to reads. A store fault is reported in-band via the
//! `error` flag with an empty list, always HTTP 200, so dashboard
//! clients keep one decode path.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;
use utoipa::ToSchema;

use busyboard_core::summarize;

use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Ranked summary payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    /// True when the store scan failed; `courses` is empty.
    pub error: bool,
    pub courses: Vec<CourseSummary>,
}

/// One ranked entry in the summary.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub rank: u32,
    pub code: String,
    pub number: String,
    pub section: String,
    pub name: String,
    pub report_count: u32,
}

/// Ranked summary of the most-reported entries.
#[utoipa::path(
    get,
    path = "/v1/summary",
    responses(
        (status = 200, description = "Ranked summary (error flag set on store fault)", body = SummaryResponse),
    ),
    tag = "summary"
)]
pub async fn summary(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
) -> Json<SummaryResponse> {
    let result = summarize(state.store.as_ref(), &state.catalog, &state.summary).await;
    metrics.summary_generated();

    let courses = result
        .courses
        .into_iter()
        .map(|c| CourseSummary {
            rank: c.rank,
            code: c.code,
            number: c.number,
            section: c.section,
            name: c.name,
            report_count: c.reports,
        })
        .collect();

    Json(SummaryResponse {
        error: result.error,
        courses,
    })
}
