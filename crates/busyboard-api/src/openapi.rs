//! # OpenAPI Document
//!
//! Generated from the handler annotations and served at `/openapi.json`.

use axum::Json;
use utoipa::OpenApi;

use crate::error::SubmitResponse;
use crate::routes::reports::ReportRequest;
use crate::routes::summary::{CourseSummary, SummaryResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "busyboard API",
        description = "Anonymous class-is-busy reporting: rate-limited submissions and ranked summaries.",
        license(name = "MIT")
    ),
    paths(
        crate::routes::reports::submit,
        crate::routes::summary::summary,
    ),
    components(schemas(ReportRequest, SubmitResponse, SummaryResponse, CourseSummary)),
    tags(
        (name = "reports", description = "Report submission"),
        (name = "summary", description = "Ranked aggregation"),
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document as JSON.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_both_operations() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/v1/reports"));
        assert!(doc.paths.paths.contains_key("/v1/summary"));
    }

    #[test]
    fn document_serializes() {
        let json = ApiDoc::openapi().to_json().unwrap();
        assert!(json.contains("busyboard API"));
        assert!(json.contains("SummaryResponse"));
    }
}
