//! # Submission Flow
//!
//! The write path: validate → daily counter → dedup lock → encode →
//! store with the retention TTL.
//!
//! ## Ordering caveat
//!
//! The daily counter is incremented before the dedup lock is checked and
//! the two are not one transaction. A submission can pass the daily
//! check, fail the dedup check, and still have consumed a unit of daily
//! quota. That slight over-counting of attempts is accepted behavior
//! carried over from the system this service is compatible with — do not
//! reorder the checks without flagging the change.

use std::time::Duration;

use chrono::NaiveDate;

use crate::catalog::CourseCatalog;
use crate::error::SubmitError;
use crate::keyspace::{encode_report, new_disambiguator};
use crate::ratelimit::{check_daily, try_lock_entry, RateLimitConfig};
use crate::store::KeyStore;
use crate::validator::{validate, ReportEntry, ValidationRules};

/// Retention window of a stored report: one week, after which the store
/// reclaims the key. There is no explicit delete path.
pub const REPORT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Validate, rate-limit, and persist one report.
///
/// `date` is the submitter's local date, passed in so the rate-limit
/// buckets are testable with a pinned calendar.
pub async fn submit_report(
    store: &dyn KeyStore,
    catalog: &CourseCatalog,
    rules: &ValidationRules,
    limits: &RateLimitConfig,
    identity: &str,
    entry: &ReportEntry,
    date: NaiveDate,
) -> Result<(), SubmitError> {
    let entry = validate(entry, catalog, rules)?;

    if !check_daily(store, identity, date, limits.max_daily).await? {
        return Err(SubmitError::DailyCapExceeded);
    }

    // The daily counter above stays incremented even if the dedup lock
    // rejects the submission; attempts count against the cap.
    if limits.dedup_enabled && !try_lock_entry(store, identity, &entry, date).await? {
        return Err(SubmitError::DuplicateEntry);
    }

    let key = encode_report(&entry, new_disambiguator());
    store.set(&key, REPORT_TTL).await?;

    tracing::info!(code = %entry.code, number = %entry.number, "report stored");
    Ok(())
}
