//! # Core Error Taxonomy
//!
//! Structured error types for the domain core. The split matters to
//! callers: validation and rate-limit rejections are definitive (the
//! submission was refused), store faults are transient infrastructure
//! failures, and malformed keys are a per-key condition the aggregator
//! skips rather than a fatal scan error.

use thiserror::Error;

/// A report entry failed validation. User-correctable; never persisted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A field exceeds its maximum length.
    #[error("field `{field}` exceeds {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    /// The subject code is not present in the course catalog.
    #[error("unknown course code: {0}")]
    UnknownCourse(String),

    /// The course number does not match the 3-digit `[1-5][0-9]{2}` form.
    #[error("invalid course number: {0:?}")]
    InvalidNumber(String),

    /// The section matches the rejected section pattern.
    #[error("invalid section: {0:?}")]
    InvalidSection(String),
}

/// The backing key-value store could not complete an operation.
///
/// Every backend fault (network, timeout, protocol) collapses into
/// `Unavailable` — callers only need to know the failure is transient
/// and retryable, not which layer produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store is unreachable or failed mid-operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A stored key could not be decoded back into a report entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The key is shorter than the fixed prefix + suffix, or its body
    /// does not split into the three report fields.
    #[error("malformed report key: {0:?}")]
    Malformed(String),
}

/// Outcome of the write path: validate, rate-limit, persist.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The entry was rejected by the validator.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The source identity exhausted its daily submission cap.
    #[error("daily submission cap exceeded")]
    DailyCapExceeded,

    /// The same identity already reported this entry within the dedup window.
    #[error("entry already reported by this source today")]
    DuplicateEntry,

    /// The store failed; the submission may be retried later.
    #[error(transparent)]
    Store(#[from] StoreError),
}
