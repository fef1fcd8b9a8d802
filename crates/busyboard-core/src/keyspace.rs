//! # Report Key Codec
//!
//! Reports are persisted as opaque keys in the expiring store:
//!
//! ```text
//! r:<code>:<number>:<section>:<disambiguator>
//! ```
//!
//! The disambiguator is a uniform random integer in `10000..=99999`
//! (always five digits, so the suffix is a fixed six characters). It
//! exists so that many independent users reporting the identical entry
//! within the retention window produce distinct keys; collisions are
//! astronomically unlikely and deliberately unhandled — a collision
//! overcounts a single report by one.
//!
//! The code (catalog-bounded) and number (digit-only) never contain the
//! `:` delimiter, and the section is the last field before the suffix,
//! so encoding needs no escaping and decoding splits unambiguously.

use rand::Rng;

use crate::error::KeyError;
use crate::validator::ReportEntry;

/// Prefix shared by all report keys; [`crate::aggregate`] scans it.
pub const REPORT_PREFIX: &str = "r:";

/// Inclusive lower bound of the disambiguator range.
pub const DISAMBIGUATOR_MIN: u32 = 10_000;
/// Inclusive upper bound of the disambiguator range.
pub const DISAMBIGUATOR_MAX: u32 = 99_999;

/// Length of the fixed `:<ddddd>` disambiguator suffix.
const SUFFIX_LEN: usize = 6;

/// Draw a fresh random disambiguator.
pub fn new_disambiguator() -> u32 {
    rand::thread_rng().gen_range(DISAMBIGUATOR_MIN..=DISAMBIGUATOR_MAX)
}

/// Encode a validated entry into its stored key.
///
/// The caller is responsible for `disambiguator` being within the fixed
/// five-digit range; [`new_disambiguator`] produces one.
pub fn encode_report(entry: &ReportEntry, disambiguator: u32) -> String {
    format!(
        "{REPORT_PREFIX}{}:{}:{}:{disambiguator}",
        entry.code, entry.number, entry.section
    )
}

/// Decode a stored key back into its report fields.
///
/// Strips the fixed prefix and the six-character disambiguator suffix,
/// then splits the remaining body into code, number, and section. A key
/// from a healthy store always decodes; anything else is
/// [`KeyError::Malformed`], which aggregation skips per key rather than
/// failing the whole scan.
pub fn decode_report(key: &str) -> Result<ReportEntry, KeyError> {
    let body = key
        .strip_prefix(REPORT_PREFIX)
        .ok_or_else(|| KeyError::Malformed(key.to_string()))?;
    if body.len() < SUFFIX_LEN || !body.is_char_boundary(body.len() - SUFFIX_LEN) {
        return Err(KeyError::Malformed(key.to_string()));
    }
    let body = &body[..body.len() - SUFFIX_LEN];

    let mut parts = body.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(code), Some(number), Some(section)) => {
            Ok(ReportEntry::new(code, number, section))
        }
        _ => Err(KeyError::Malformed(key.to_string())),
    }
}
