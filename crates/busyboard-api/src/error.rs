//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from busyboard-core to HTTP status codes and the
//! JSON rejection body `{error, message, allowRetry}`. The `allowRetry`
//! flag tells the client whether resubmitting makes sense: fixable input
//! and transient faults are retryable; rate limits and untrusted sources
//! are not. Internal fault details are never exposed to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use busyboard_core::{StoreError, SubmitError};

/// JSON body of every submission response, success or rejection.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    /// Whether the submission was rejected.
    pub error: bool,
    /// Human-readable reason; empty on success.
    pub message: String,
    /// Whether resubmitting is sensible (after fixing the entry or
    /// waiting out a transient fault).
    pub allow_retry: bool,
}

impl SubmitResponse {
    /// Body of an accepted submission.
    pub fn accepted() -> Self {
        Self {
            error: false,
            message: String::new(),
            allow_retry: true,
        }
    }
}

/// Application-level error implementing [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// The entry failed validation (400). User-correctable.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The source address is outside the trusted networks (429,
    /// matching the service this replaces). Not retryable by the same
    /// path.
    #[error("source address not in a trusted network")]
    UntrustedSource,

    /// The identity exhausted its daily submission cap (429).
    #[error("daily submission cap exceeded")]
    DailyCapExceeded,

    /// The identity already reported this entry within the dedup window
    /// (429).
    #[error("entry already reported today")]
    DuplicateEntry,

    /// No source address could be resolved from the request (500).
    /// A server-side fault, not the user's.
    #[error("could not resolve a source address")]
    NoIdentity,

    /// The store is unreachable (503). Message is logged, not returned.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AppError {
    /// HTTP status for this error.
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::UntrustedSource | Self::DailyCapExceeded | Self::DuplicateEntry => {
                StatusCode::TOO_MANY_REQUESTS
            }
            Self::NoIdentity => StatusCode::INTERNAL_SERVER_ERROR,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Whether resubmission is sensible for this rejection.
    fn allow_retry(&self) -> bool {
        match self {
            // Fix the entry and try again.
            Self::Validation(_) => true,
            // Transient server-side faults.
            Self::NoIdentity | Self::StoreUnavailable(_) => true,
            // Don't retry now: wrong network or rate limited.
            Self::UntrustedSource | Self::DailyCapExceeded | Self::DuplicateEntry => false,
        }
    }

    /// Client-facing message. Fault details stay in the logs.
    fn message(&self) -> String {
        match self {
            Self::Validation(msg) => format!("There was an error with your entry: {msg}"),
            Self::UntrustedSource => {
                "You must be connected to the campus network or its VPN.".to_string()
            }
            Self::DailyCapExceeded => "Too many reports for today.".to_string(),
            Self::DuplicateEntry => {
                "You can't report the same entry twice in one day.".to_string()
            }
            Self::NoIdentity | Self::StoreUnavailable(_) => {
                "It's not you! Something went wrong, try again later.".to_string()
            }
        }
    }

    /// Metrics label for rejection counters.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::UntrustedSource => "untrusted_source",
            Self::DailyCapExceeded => "daily_cap",
            Self::DuplicateEntry => "duplicate",
            Self::NoIdentity => "no_identity",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server-side faults for operator visibility.
        match &self {
            Self::StoreUnavailable(_) => tracing::error!(error = %self, "store fault"),
            Self::NoIdentity => tracing::error!("no source identity resolved"),
            _ => {}
        }

        let body = SubmitResponse {
            error: true,
            message: self.message(),
            allow_retry: self.allow_retry(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Validation(e) => Self::Validation(e.to_string()),
            SubmitError::DailyCapExceeded => Self::DailyCapExceeded,
            SubmitError::DuplicateEntry => Self::DuplicateEntry,
            SubmitError::Store(e) => Self::from(e),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        let StoreError::Unavailable(msg) = err;
        Self::StoreUnavailable(msg)
    }
}

#[cfg(test)]
mod tests {
    use busyboard_core::ValidationError;
    use http_body_util::BodyExt;

    use super::*;

    async fn response_parts(err: AppError) -> (StatusCode, SubmitResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: SubmitResponse = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn validation_is_bad_request_and_retryable() {
        let (status, body) =
            response_parts(AppError::Validation("unknown course code: XXXX".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error);
        assert!(body.allow_retry);
        assert!(body.message.contains("XXXX"));
    }

    #[tokio::test]
    async fn rate_limits_are_429_and_not_retryable() {
        for err in [AppError::DailyCapExceeded, AppError::DuplicateEntry] {
            let (status, body) = response_parts(err).await;
            assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
            assert!(!body.allow_retry);
        }
    }

    #[tokio::test]
    async fn untrusted_source_is_429_and_not_retryable() {
        let (status, body) = response_parts(AppError::UntrustedSource).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(!body.allow_retry);
        assert!(body.message.contains("network"));
    }

    #[tokio::test]
    async fn store_fault_is_503_and_hides_details() {
        let (status, body) =
            response_parts(AppError::StoreUnavailable("connection refused".into())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.allow_retry);
        assert!(
            !body.message.contains("connection refused"),
            "fault details must not leak: {}",
            body.message
        );
    }

    #[tokio::test]
    async fn no_identity_is_a_server_fault() {
        let (status, body) = response_parts(AppError::NoIdentity).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.allow_retry);
    }

    #[test]
    fn submit_error_conversion_keeps_the_class() {
        let err = AppError::from(SubmitError::Validation(ValidationError::UnknownCourse(
            "ZZZZ".into(),
        )));
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.reason(), "validation");

        let err = AppError::from(SubmitError::DailyCapExceeded);
        assert!(matches!(err, AppError::DailyCapExceeded));

        let err = AppError::from(SubmitError::Store(StoreError::Unavailable("down".into())));
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }

    #[test]
    fn accepted_body_serializes_camel_case() {
        let json = serde_json::to_string(&SubmitResponse::accepted()).unwrap();
        assert!(json.contains("allowRetry"));
        assert!(json.contains("\"error\":false"));
    }
}
