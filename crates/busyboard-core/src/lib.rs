//! # busyboard-core — Anonymous "Class Is Busy" Reporting Domain
//!
//! Domain library for the busyboard service. Users submit anonymous
//! "class is busy" reports keyed by course/section; the service
//! rate-limits per source identity and per identity+entry, and produces
//! a ranked, optionally-anonymized summary of the most-reported entries.
//!
//! ## Modules
//!
//! - [`catalog`] — immutable subject-code → name catalog, residence
//!   sentinel.
//! - [`validator`] — field bounds, catalog membership, per-kind rules,
//!   residence normalization.
//! - [`keyspace`] — report key grammar, random disambiguator, codec.
//! - [`store`] — expiring key-value store contract plus the in-memory
//!   implementation with a manual clock.
//! - [`ratelimit`] — daily counter and hourly dedup lock over digest
//!   keys.
//! - [`aggregate`] — scan, group, count, rank, truncate.
//! - [`submit`] — the write-path orchestration.
//! - [`error`] — the core error taxonomy.
//!
//! ## Data flow
//!
//! ```text
//! write: validator → ratelimit → keyspace → store
//! read:  store → aggregate → ranked summary
//! ```
//!
//! All coordination between concurrent submissions is delegated to the
//! store's atomic primitives; the library holds no request-path locks.

pub mod aggregate;
pub mod catalog;
pub mod error;
pub mod keyspace;
pub mod ratelimit;
pub mod store;
pub mod submit;
pub mod validator;

pub use aggregate::{summarize, RankedCourse, Summary, SummaryConfig};
pub use catalog::{is_residence, CourseCatalog, RESIDENCE_PREFIX};
pub use error::{KeyError, StoreError, SubmitError, ValidationError};
pub use keyspace::{decode_report, encode_report, new_disambiguator, REPORT_PREFIX};
pub use ratelimit::RateLimitConfig;
pub use store::{KeyStore, MemoryStore};
pub use submit::{submit_report, REPORT_TTL};
pub use validator::{validate, ReportEntry, ValidationRules};
