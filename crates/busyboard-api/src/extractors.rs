//! # JSON Extraction Helper
//!
//! Maps axum's JSON rejection into the application error type so
//! handlers keep a single error path.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Extract a JSON body, mapping deserialization errors to
/// [`AppError::Validation`].
///
/// Handlers take `Result<Json<T>, JsonRejection>` and call:
/// ```ignore
/// let req = extract_json(body)?;
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::Validation(err.body_text()))
}
