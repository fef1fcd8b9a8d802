//! # Report Validator
//!
//! Pure validation of submitted report entries against the course catalog
//! and the per-kind field rules. Validation also normalizes: residence
//! entries have their number and section forced empty, and the normalized
//! entry is what gets persisted.
//!
//! ## Section polarity
//!
//! The number rule is positive (the number MUST match `^[1-5][0-9]{2}$`)
//! while the section rule is negative (the section must NOT match
//! `^[L0-9][0-9][0-9A-Za-z]$`). The inverted section check is preserved
//! from the upstream behavior this service is compatible with; changing
//! it would change which submissions are accepted.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::catalog::{is_residence, CourseCatalog};
use crate::error::ValidationError;

/// Maximum length of a subject code.
pub const MAX_CODE_LEN: usize = 4;
/// Maximum length of a course number.
pub const MAX_NUMBER_LEN: usize = 3;
/// Maximum length of a section identifier.
pub const MAX_SECTION_LEN: usize = 3;

/// A submitted report: subject code plus optional number and section.
///
/// Residence reports carry only the code; numbered course reports carry
/// all three fields. Field lengths are bounded by [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Subject code, at most 4 characters.
    pub code: String,
    /// Course number, at most 3 characters.
    #[serde(default)]
    pub number: String,
    /// Section identifier, at most 3 characters.
    #[serde(default)]
    pub section: String,
}

impl ReportEntry {
    /// Convenience constructor used throughout the tests.
    pub fn new(
        code: impl Into<String>,
        number: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            number: number.into(),
            section: section.into(),
        }
    }
}

/// Compiled field rules, built once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    number: Regex,
    section: Regex,
}

impl ValidationRules {
    /// Compile the field rules.
    ///
    /// The patterns are fixed at compile time, so compilation cannot fail
    /// for any input; `expect` documents that invariant.
    pub fn new() -> Self {
        Self {
            number: Regex::new(r"^[1-5][0-9]{2}$").expect("number pattern is valid"),
            section: Regex::new(r"^[L0-9][0-9][0-9A-Za-z]$").expect("section pattern is valid"),
        }
    }
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a submitted entry, returning the normalized entry to persist.
///
/// Rules, in order:
/// 1. Field length bounds (4 / 3 / 3).
/// 2. The code must exist in the catalog.
/// 3. Residence codes: number and section are cleared; the entry is valid.
/// 4. Numbered courses: the number must match the number rule and the
///    section must NOT match the section rule (see module docs).
pub fn validate(
    entry: &ReportEntry,
    catalog: &CourseCatalog,
    rules: &ValidationRules,
) -> Result<ReportEntry, ValidationError> {
    if entry.code.len() > MAX_CODE_LEN {
        return Err(ValidationError::FieldTooLong {
            field: "code",
            max: MAX_CODE_LEN,
        });
    }
    if entry.number.len() > MAX_NUMBER_LEN {
        return Err(ValidationError::FieldTooLong {
            field: "number",
            max: MAX_NUMBER_LEN,
        });
    }
    if entry.section.len() > MAX_SECTION_LEN {
        return Err(ValidationError::FieldTooLong {
            field: "section",
            max: MAX_SECTION_LEN,
        });
    }

    if !catalog.contains(&entry.code) {
        return Err(ValidationError::UnknownCourse(entry.code.clone()));
    }

    if is_residence(&entry.code) {
        // Residence reports carry no number or section regardless of input.
        return Ok(ReportEntry::new(entry.code.clone(), "", ""));
    }

    if !rules.number.is_match(&entry.number) {
        return Err(ValidationError::InvalidNumber(entry.number.clone()));
    }
    // Inverted check: a section MATCHING the pattern is rejected.
    if rules.section.is_match(&entry.section) {
        return Err(ValidationError::InvalidSection(entry.section.clone()));
    }

    Ok(entry.clone())
}
