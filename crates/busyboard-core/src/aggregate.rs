//! # Summary Aggregation
//!
//! Turns the raw report keyspace into a ranked summary:
//!
//! 1. scan all live keys under the report prefix,
//! 2. decode each key (malformed keys are logged and skipped, never
//!    fatal to the scan),
//! 3. when anonymization is on, collapse each entry to (code, number)
//!    BEFORE counting — section and disambiguator granularity is
//!    discarded ahead of the grouping step, which is the privacy
//!    boundary,
//! 4. tally in first-seen order, stable-sort descending by count,
//! 5. assign competition ranks (exact ties share a rank),
//! 6. stop at the entry ceiling or when a group falls below the
//!    minimum-reports floor (both hard stops; the input is sorted, so
//!    everything after the floor is lower still).
//!
//! The ceiling truncates at exactly `max_entries`, splitting a tie group
//! that straddles the boundary.
//!
//! A store fault never yields a partial summary: the result is an empty
//! list with the error flag set.

use std::collections::HashMap;

use serde::Serialize;

use crate::catalog::CourseCatalog;
use crate::keyspace::{decode_report, REPORT_PREFIX};
use crate::store::KeyStore;
use crate::validator::ReportEntry;

/// Aggregation knobs, fixed at startup.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Collapse section/disambiguator detail before counting.
    pub anonymize: bool,
    /// Minimum report count for a group to appear in the summary.
    pub min_reports: u32,
    /// Maximum number of summary entries.
    pub max_entries: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            anonymize: true,
            min_reports: 5,
            max_entries: 20,
        }
    }
}

/// One ranked summary entry. Derived on every request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCourse {
    /// Competition rank: tied counts share a rank, the next distinct
    /// count gets the previous rank plus one.
    pub rank: u32,
    pub code: String,
    pub number: String,
    pub section: String,
    /// Display name from the catalog; empty when the code is no longer
    /// catalogued.
    pub name: String,
    pub reports: u32,
}

/// Ranked summary, or an explicitly empty one when the store failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub error: bool,
    pub courses: Vec<RankedCourse>,
}

impl Summary {
    fn failed() -> Self {
        Self {
            error: true,
            courses: Vec::new(),
        }
    }
}

/// Scan the report keyspace and produce the ranked summary.
///
/// Best-effort snapshot: reports written while the scan runs may or may
/// not be counted, and keys expiring mid-aggregation simply drop out.
pub async fn summarize(
    store: &dyn KeyStore,
    catalog: &CourseCatalog,
    config: &SummaryConfig,
) -> Summary {
    let keys = match store.scan_prefix(REPORT_PREFIX).await {
        Ok(keys) => keys,
        Err(err) => {
            tracing::error!(error = %err, "report scan failed, returning error summary");
            return Summary::failed();
        }
    };

    // Tally in first-seen order so exact ties rank deterministically.
    let mut index: HashMap<ReportEntry, usize> = HashMap::new();
    let mut tallies: Vec<(ReportEntry, u32)> = Vec::new();
    for key in &keys {
        let entry = match decode_report(key) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping undecodable report key");
                continue;
            }
        };
        let group = if config.anonymize {
            ReportEntry::new(entry.code, entry.number, "")
        } else {
            entry
        };
        match index.get(&group) {
            Some(&i) => tallies[i].1 += 1,
            None => {
                index.insert(group.clone(), tallies.len());
                tallies.push((group, 1));
            }
        }
    }

    // Stable sort: equal counts keep first-seen order.
    tallies.sort_by(|a, b| b.1.cmp(&a.1));

    let mut courses = Vec::new();
    let mut rank = 0u32;
    let mut last_count: Option<u32> = None;
    for (entry, count) in tallies {
        if courses.len() >= config.max_entries {
            break;
        }
        if count < config.min_reports {
            // Input is sorted descending; everything after is lower.
            break;
        }
        if last_count != Some(count) {
            rank += 1;
        }
        courses.push(RankedCourse {
            rank,
            name: catalog.name(&entry.code).to_string(),
            code: entry.code,
            number: entry.number,
            section: entry.section,
            reports: count,
        });
        last_count = Some(count);
    }

    tracing::debug!(
        scanned = keys.len(),
        emitted = courses.len(),
        "generated report summary"
    );
    Summary {
        error: false,
        courses,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::error::StoreError;
    use crate::keyspace::encode_report;
    use crate::store::MemoryStore;

    const TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

    fn catalog() -> CourseCatalog {
        CourseCatalog::from_map(std::collections::HashMap::from([
            ("CPSC".to_string(), "Computer Science".to_string()),
            ("MATH".to_string(), "Mathematics".to_string()),
            ("BIOL".to_string(), "Biology".to_string()),
            ("CHEM".to_string(), "Chemistry".to_string()),
            ("PHYS".to_string(), "Physics".to_string()),
            ("STAT".to_string(), "Statistics".to_string()),
        ]))
    }

    /// Seed `count` independent reports of the same entry, each with its
    /// own disambiguator as independent users would produce.
    async fn seed(store: &MemoryStore, entry: &ReportEntry, count: u32, disamb: &mut u32) {
        for _ in 0..count {
            store.set(&encode_report(entry, *disamb), TTL).await.unwrap();
            *disamb += 1;
        }
    }

    fn config(anonymize: bool, min_reports: u32, max_entries: usize) -> SummaryConfig {
        SummaryConfig {
            anonymize,
            min_reports,
            max_entries,
        }
    }

    #[tokio::test]
    async fn empty_store_gives_empty_summary_without_error() {
        let store = MemoryStore::new();
        let summary = summarize(&store, &catalog(), &SummaryConfig::default()).await;
        assert!(!summary.error);
        assert!(summary.courses.is_empty());
    }

    #[tokio::test]
    async fn ties_share_rank_and_floor_short_circuits() {
        let store = MemoryStore::new();
        let mut d = 10_000;
        // Counts [5, 5, 3, 3, 3, 1] with min_reports = 2.
        seed(&store, &ReportEntry::new("CPSC", "310", ""), 5, &mut d).await;
        seed(&store, &ReportEntry::new("MATH", "200", ""), 5, &mut d).await;
        seed(&store, &ReportEntry::new("BIOL", "112", ""), 3, &mut d).await;
        seed(&store, &ReportEntry::new("CHEM", "121", ""), 3, &mut d).await;
        seed(&store, &ReportEntry::new("PHYS", "101", ""), 3, &mut d).await;
        seed(&store, &ReportEntry::new("STAT", "200", ""), 1, &mut d).await;

        let summary = summarize(&store, &catalog(), &config(true, 2, 20)).await;
        assert!(!summary.error);
        let ranks: Vec<u32> = summary.courses.iter().map(|c| c.rank).collect();
        assert_eq!(ranks, vec![1, 1, 2, 2, 2]);
        let counts: Vec<u32> = summary.courses.iter().map(|c| c.reports).collect();
        assert_eq!(counts, vec![5, 5, 3, 3, 3]);
        // The count=1 group is cut by the floor, not the ceiling.
        assert!(!summary.courses.iter().any(|c| c.code == "STAT"));
    }

    #[tokio::test]
    async fn ceiling_truncates_mid_tie_group() {
        let store = MemoryStore::new();
        let mut d = 10_000;
        // Counts [9, 7, 7, 5] with max_entries = 2: the second 7-count
        // group is cut even though it ties the rank at the boundary.
        seed(&store, &ReportEntry::new("CPSC", "310", ""), 9, &mut d).await;
        seed(&store, &ReportEntry::new("BIOL", "112", ""), 7, &mut d).await;
        seed(&store, &ReportEntry::new("CHEM", "121", ""), 7, &mut d).await;
        seed(&store, &ReportEntry::new("MATH", "200", ""), 5, &mut d).await;

        let summary = summarize(&store, &catalog(), &config(true, 1, 2)).await;
        assert_eq!(summary.courses.len(), 2);
        assert_eq!(summary.courses[0].reports, 9);
        assert_eq!(summary.courses[0].rank, 1);
        assert_eq!(summary.courses[1].reports, 7);
        assert_eq!(summary.courses[1].rank, 2);
    }

    #[tokio::test]
    async fn anonymization_collapses_sections_before_counting() {
        let store = MemoryStore::new();
        let mut d = 10_000;
        seed(&store, &ReportEntry::new("CPSC", "310", "T1A"), 2, &mut d).await;
        seed(&store, &ReportEntry::new("CPSC", "310", "T2B"), 3, &mut d).await;

        let anon = summarize(&store, &catalog(), &config(true, 1, 20)).await;
        assert_eq!(anon.courses.len(), 1);
        assert_eq!(anon.courses[0].reports, 5);
        assert_eq!(anon.courses[0].section, "");

        let plain = summarize(&store, &catalog(), &config(false, 1, 20)).await;
        assert_eq!(plain.courses.len(), 2);
        // Anonymization never increases the distinct group count.
        assert!(anon.courses.len() <= plain.courses.len());
    }

    #[tokio::test]
    async fn malformed_keys_are_skipped_not_fatal() {
        let store = MemoryStore::new();
        let mut d = 10_000;
        seed(&store, &ReportEntry::new("CPSC", "310", ""), 2, &mut d).await;
        store.set("r:bad", TTL).await.unwrap();

        let summary = summarize(&store, &catalog(), &config(true, 1, 20)).await;
        assert!(!summary.error);
        assert_eq!(summary.courses.len(), 1);
        assert_eq!(summary.courses[0].reports, 2);
    }

    #[tokio::test]
    async fn names_come_from_the_catalog() {
        let store = MemoryStore::new();
        let mut d = 10_000;
        seed(&store, &ReportEntry::new("CPSC", "310", ""), 1, &mut d).await;

        let summary = summarize(&store, &catalog(), &config(true, 1, 20)).await;
        assert_eq!(summary.courses[0].name, "Computer Science");
    }

    struct FailingStore;

    #[async_trait]
    impl KeyStore for FailingStore {
        async fn set(&self, _: &str, _: Duration) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn set_if_absent(&self, _: &str, _: Duration) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn increment(&self, _: &str) -> Result<i64, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn set_expiry(&self, _: &str, _: Duration) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn scan_prefix(&self, _: &str) -> Result<Vec<String>, StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".into()))
        }
    }

    #[tokio::test]
    async fn store_fault_yields_flagged_empty_summary() {
        let summary = summarize(&FailingStore, &catalog(), &SummaryConfig::default()).await;
        assert!(summary.error);
        assert!(summary.courses.is_empty());
    }
}
