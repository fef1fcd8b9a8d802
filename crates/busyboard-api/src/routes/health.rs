//! # Health Probes
//!
//! Liveness answers as long as the process serves requests; readiness
//! additionally pings the store so a dead backend takes the instance out
//! of rotation.

use axum::extract::State;
use axum::http::StatusCode;

use crate::state::AppState;

/// Process is up.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Process is up and the store answers.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store.ping().await {
        Ok(()) => StatusCode::OK,
        Err(err) => {
            tracing::warn!(error = %err, "readiness probe: store unreachable");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
