//! # HTTP Route Handlers
//!
//! - [`reports`] — `POST /v1/reports`, the submission write path.
//! - [`summary`] — `GET /v1/summary`, the ranked aggregation read path.
//! - [`health`] — liveness and readiness probes.

pub mod health;
pub mod reports;
pub mod summary;
