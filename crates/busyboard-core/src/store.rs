//! # Expiring Key Store Contract
//!
//! The store is an external service (Redis in production) consumed
//! through the [`KeyStore`] trait. The usage contract is part of the
//! core's correctness:
//!
//! - every key carries a time-to-live and the backend reclaims expired
//!   keys; a key never outlives its TTL,
//! - `set_if_absent` is atomic and returns `false` without error when the
//!   key is already present,
//! - `increment` is atomic, creates missing counters at zero, and does
//!   NOT attach a TTL on creation (the caller follows up with
//!   [`KeyStore::set_expiry`]),
//! - `scan_prefix` is a point-in-time best-effort snapshot, not
//!   linearizable with concurrent writers.
//!
//! Every call can fail (network or backend fault) and maps to
//! [`StoreError::Unavailable`].
//!
//! [`MemoryStore`] implements the same contract in-process with a
//! manually advanceable clock, for tests and local development.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::StoreError;

/// Async key-value store with per-key TTLs and atomic primitives.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Set a key (empty value) with a time-to-live.
    async fn set(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Set a key with a TTL only if it is absent.
    ///
    /// Returns `false` (not an error) when the key already exists.
    async fn set_if_absent(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Atomically increment a counter, creating it at zero if absent.
    /// Returns the post-increment value.
    async fn increment(&self, key: &str) -> Result<i64, StoreError>;

    /// Set or replace the TTL of an existing key. A missing key is not an
    /// error; the call is a no-op.
    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;

    /// List live keys under a prefix. Best-effort: writes concurrent with
    /// the scan may or may not appear.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Health check.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: i64,
    /// Deadline on the store's virtual timeline; `None` means no TTL.
    expires_at: Option<Duration>,
}

/// In-memory [`KeyStore`] with TTL semantics and a manual clock.
///
/// Time does not pass on its own: [`MemoryStore::advance`] moves the
/// clock, and expired entries are reclaimed lazily on access. This makes
/// TTL behavior (daily counter reset, dedup window expiry) directly
/// testable without sleeping.
///
/// The lock is `parking_lot` and is never held across an `.await` point;
/// all operations are short synchronous critical sections.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    now: Duration,
    entries: HashMap<String, Entry>,
}

impl Inner {
    fn is_live(&self, key: &str) -> bool {
        match self.entries.get(key) {
            Some(entry) => entry.expires_at.map_or(true, |t| self.now < t),
            None => false,
        }
    }

    fn drop_if_expired(&mut self, key: &str) {
        if self.entries.contains_key(key) && !self.is_live(key) {
            self.entries.remove(key);
        }
    }
}

impl MemoryStore {
    /// Create an empty store with its clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the virtual clock, letting TTLs elapse.
    pub fn advance(&self, by: Duration) {
        let mut inner = self.inner.lock();
        inner.now += by;
        let now = inner.now;
        inner
            .entries
            .retain(|_, entry| entry.expires_at.map_or(true, |t| now < t));
    }

    /// Number of live keys (test helper).
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the store holds no live keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn set(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let expires_at = Some(inner.now + ttl);
        inner.entries.insert(
            key.to_string(),
            Entry {
                value: 0,
                expires_at,
            },
        );
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock();
        inner.drop_if_expired(key);
        if inner.is_live(key) {
            return Ok(false);
        }
        let expires_at = Some(inner.now + ttl);
        inner.entries.insert(
            key.to_string(),
            Entry {
                value: 0,
                expires_at,
            },
        );
        Ok(true)
    }

    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock();
        inner.drop_if_expired(key);
        let entry = inner.entries.entry(key.to_string()).or_insert(Entry {
            value: 0,
            expires_at: None,
        });
        entry.value += 1;
        Ok(entry.value)
    }

    async fn set_expiry(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        inner.drop_if_expired(key);
        let deadline = inner.now + ttl;
        if let Some(entry) = inner.entries.get_mut(key) {
            entry.expires_at = Some(deadline);
        }
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock();
        let mut keys: Vec<String> = inner
            .entries
            .keys()
            .filter(|k| k.starts_with(prefix) && inner.is_live(k))
            .cloned()
            .collect();
        // Deterministic order for callers; the contract itself only
        // promises a best-effort sequence.
        keys.sort();
        Ok(keys)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
