//! # Dual Rate Limiting
//!
//! Two independent limiting policies built on the store's atomic
//! primitives, each keyed by a SHA-256 digest of (identity, scope, time
//! bucket) under the `rl:` prefix:
//!
//! - **Daily counter** — `increment` on a digest of identity + local
//!   date, 24-hour TTL refreshed after each increment. The window is
//!   "one day from first increment", not calendar-midnight-aligned: the
//!   date component in the digest rotates the key daily while the TTL
//!   bounds stragglers.
//! - **Hourly dedup lock** — `set_if_absent` on a digest of identity +
//!   entry code+number + local date, 1-hour TTL. A `false` return means
//!   the submission is rejected outright, never queued or retried.
//!
//! The two checks are NOT combined into one transaction; see
//! [`crate::submit`] for the preserved ordering consequence.

use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use sha2::{Digest, Sha256};

use crate::error::StoreError;
use crate::store::KeyStore;
use crate::validator::ReportEntry;

/// Prefix shared by all rate-limit keys.
pub const LIMIT_PREFIX: &str = "rl:";

/// TTL of the daily submission counter.
pub const DAILY_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// TTL of the per-entry dedup lock.
pub const DEDUP_TTL: Duration = Duration::from_secs(60 * 60);

/// Domain tag mixed into every digest so rate-limit keys cannot collide
/// with digests computed elsewhere over the same inputs.
const DIGEST_DOMAIN: &str = "busyboard-rl";

/// Rate limiting knobs, fixed at startup.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum submissions per identity per day.
    pub max_daily: i64,
    /// Whether the per-entry dedup lock is enforced. Disabled in test
    /// mode so repeated submissions can exercise the rest of the path.
    pub dedup_enabled: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_daily: 10,
            dedup_enabled: true,
        }
    }
}

fn digest_key(payload: &str) -> String {
    let digest = Sha256::digest(payload.as_bytes());
    format!("{LIMIT_PREFIX}{}", hex::encode(digest))
}

/// Store key of the daily counter for an identity on a given local date.
pub fn daily_key(identity: &str, date: NaiveDate) -> String {
    digest_key(&format!(
        "{DIGEST_DOMAIN}:{identity}:{}:{}:{}",
        date.day(),
        date.month(),
        date.year()
    ))
}

/// Store key of the dedup lock for an (identity, entry) pair on a given
/// local date. Only the entry's code and number participate — reporting
/// two sections of the same course counts as the same entry.
pub fn dedup_key(identity: &str, entry: &ReportEntry, date: NaiveDate) -> String {
    digest_key(&format!(
        "{DIGEST_DOMAIN}:{identity}:{}{}:{}:{}:{}",
        entry.code,
        entry.number,
        date.day(),
        date.month(),
        date.year()
    ))
}

/// Count this submission against the identity's daily cap.
///
/// Increments first, then refreshes the 24-hour expiry; a failed expiry
/// refresh is logged and tolerated (the counter still limits correctly
/// within the day). Returns whether the submission is allowed.
pub async fn check_daily(
    store: &dyn KeyStore,
    identity: &str,
    date: NaiveDate,
    max_daily: i64,
) -> Result<bool, StoreError> {
    let key = daily_key(identity, date);
    let count = store.increment(&key).await?;
    if let Err(err) = store.set_expiry(&key, DAILY_TTL).await {
        tracing::warn!(error = %err, "failed to refresh daily counter expiry");
    }
    Ok(count <= max_daily)
}

/// Take the hourly dedup lock for this (identity, entry) pair.
///
/// Returns `false` when the pair was already reported within the current
/// window, in which case the submission is rejected.
pub async fn try_lock_entry(
    store: &dyn KeyStore,
    identity: &str,
    entry: &ReportEntry,
    date: NaiveDate,
) -> Result<bool, StoreError> {
    store
        .set_if_absent(&dedup_key(identity, entry, date), DEDUP_TTL)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn keys_carry_the_limit_prefix_and_a_hex_digest() {
        let key = daily_key("10.0.0.1", date());
        assert!(key.starts_with(LIMIT_PREFIX));
        let digest = &key[LIMIT_PREFIX.len()..];
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn daily_keys_differ_by_identity_and_date() {
        let d = date();
        assert_ne!(daily_key("10.0.0.1", d), daily_key("10.0.0.2", d));
        assert_ne!(
            daily_key("10.0.0.1", d),
            daily_key("10.0.0.1", d.succ_opt().unwrap())
        );
        // Deterministic for the same inputs.
        assert_eq!(daily_key("10.0.0.1", d), daily_key("10.0.0.1", d));
    }

    #[test]
    fn dedup_key_ignores_section() {
        let d = date();
        let a = ReportEntry::new("CPSC", "310", "101");
        let b = ReportEntry::new("CPSC", "310", "202");
        let c = ReportEntry::new("CPSC", "320", "101");
        assert_eq!(dedup_key("id", &a, d), dedup_key("id", &b, d));
        assert_ne!(dedup_key("id", &a, d), dedup_key("id", &c, d));
    }

    #[tokio::test]
    async fn daily_cap_allows_up_to_max_then_blocks() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            assert!(check_daily(&store, "10.0.0.1", date(), 3).await.unwrap());
        }
        assert!(!check_daily(&store, "10.0.0.1", date(), 3).await.unwrap());
        // Another identity is unaffected.
        assert!(check_daily(&store, "10.0.0.2", date(), 3).await.unwrap());
    }

    #[tokio::test]
    async fn daily_counter_resets_after_ttl() {
        let store = MemoryStore::new();
        assert!(check_daily(&store, "10.0.0.1", date(), 1).await.unwrap());
        assert!(!check_daily(&store, "10.0.0.1", date(), 1).await.unwrap());

        store.advance(DAILY_TTL + Duration::from_secs(1));
        assert!(check_daily(&store, "10.0.0.1", date(), 1).await.unwrap());
    }

    #[tokio::test]
    async fn dedup_lock_blocks_within_the_hour_and_reopens_after() {
        let store = MemoryStore::new();
        let entry = ReportEntry::new("CPSC", "310", "");

        assert!(try_lock_entry(&store, "id", &entry, date()).await.unwrap());
        assert!(!try_lock_entry(&store, "id", &entry, date()).await.unwrap());

        store.advance(DEDUP_TTL + Duration::from_secs(1));
        assert!(try_lock_entry(&store, "id", &entry, date()).await.unwrap());
    }

    #[tokio::test]
    async fn daily_and_dedup_windows_are_independent() {
        let store = MemoryStore::new();
        let entry = ReportEntry::new("CPSC", "310", "");

        assert!(check_daily(&store, "id", date(), 10).await.unwrap());
        assert!(try_lock_entry(&store, "id", &entry, date()).await.unwrap());

        // After the dedup hour the lock reopens but the daily counter
        // keeps counting.
        store.advance(DEDUP_TTL + Duration::from_secs(1));
        assert!(try_lock_entry(&store, "id", &entry, date()).await.unwrap());
        assert_eq!(
            store.increment(&daily_key("id", date())).await.unwrap(),
            2,
            "daily counter should still be live"
        );
    }
}
