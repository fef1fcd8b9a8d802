//! # HTTP Middleware
//!
//! - [`metrics`] — Prometheus request metrics and domain counters.

pub mod metrics;
