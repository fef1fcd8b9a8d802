//! # Course Catalog
//!
//! Immutable mapping from subject code to display name, loaded once at
//! process start and read-only for the rest of the process lifetime.
//! Codes beginning with the [`RESIDENCE_PREFIX`] sentinel denote
//! residence entries rather than numbered course sections.

use std::collections::HashMap;

/// Two-character sentinel marking residence codes (e.g. `0RTP`).
pub const RESIDENCE_PREFIX: &str = "0R";

/// Immutable subject-code → display-name catalog.
///
/// Construction happens once at startup; there is no mutation API.
/// Handlers share it behind an `Arc` without further synchronization.
#[derive(Debug, Clone, Default)]
pub struct CourseCatalog {
    courses: HashMap<String, String>,
}

impl CourseCatalog {
    /// Build a catalog from an already-loaded code → name map.
    pub fn from_map(courses: HashMap<String, String>) -> Self {
        Self { courses }
    }

    /// Whether the catalog knows this subject code.
    pub fn contains(&self, code: &str) -> bool {
        self.courses.contains_key(code)
    }

    /// Display name for a subject code, or the empty string when absent.
    ///
    /// Absent codes can surface during aggregation if the catalog file
    /// changed between deployments; the summary still lists the code.
    pub fn name(&self, code: &str) -> &str {
        self.courses.get(code).map(String::as_str).unwrap_or("")
    }

    /// Number of catalogued subject codes.
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }
}

/// Whether a subject code denotes a residence entry.
pub fn is_residence(code: &str) -> bool {
    code.starts_with(RESIDENCE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CourseCatalog {
        CourseCatalog::from_map(HashMap::from([
            ("CPSC".to_string(), "Computer Science".to_string()),
            ("MATH".to_string(), "Mathematics".to_string()),
            ("0RTP".to_string(), "Totem Park".to_string()),
        ]))
    }

    #[test]
    fn contains_known_codes() {
        let c = catalog();
        assert!(c.contains("CPSC"));
        assert!(c.contains("0RTP"));
        assert!(!c.contains("PHYS"));
    }

    #[test]
    fn name_lookup_falls_back_to_empty() {
        let c = catalog();
        assert_eq!(c.name("MATH"), "Mathematics");
        assert_eq!(c.name("PHYS"), "");
    }

    #[test]
    fn residence_detection_is_prefix_based() {
        assert!(is_residence("0RTP"));
        assert!(is_residence("0R"));
        assert!(!is_residence("CPSC"));
        // Short codes must not panic.
        assert!(!is_residence("0"));
        assert!(!is_residence(""));
    }
}
