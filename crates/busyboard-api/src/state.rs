//! # Shared Application State
//!
//! Everything a handler needs, assembled once at startup. All fields are
//! immutable after construction; the store's interior mutability is the
//! only shared mutable state in the process.

use std::sync::Arc;

use busyboard_core::{CourseCatalog, KeyStore, RateLimitConfig, SummaryConfig, ValidationRules};

use crate::network::TrustedNetworks;

/// Handler state, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    /// Expiring key store (Redis in production, in-memory in tests).
    pub store: Arc<dyn KeyStore>,
    /// Course code → display name catalog.
    pub catalog: Arc<CourseCatalog>,
    /// Field bounds and per-kind validation rules.
    pub rules: Arc<ValidationRules>,
    /// CIDR ranges submissions must originate from.
    pub networks: Arc<TrustedNetworks>,
    /// Daily cap and dedup switch.
    pub limits: RateLimitConfig,
    /// Summary anonymization, floor, and ceiling.
    pub summary: SummaryConfig,
}
