//! # Startup Configuration
//!
//! Loaders for the two JSON data files read once at boot:
//!
//! - the course catalog, an object mapping subject code to display name;
//! - the trusted networks, an array of CIDR strings.
//!
//! Both fail fast with the offending path in the error chain. Test mode
//! appends loopback and private ranges so a local client passes the
//! network check.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Context;

use busyboard_core::CourseCatalog;

use crate::network::TrustedNetworks;

/// Load the course catalog from a JSON object of `code: name` pairs.
pub fn load_catalog(path: &Path) -> anyhow::Result<CourseCatalog> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading course catalog {}", path.display()))?;
    let map: HashMap<String, String> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing course catalog {}", path.display()))?;
    anyhow::ensure!(!map.is_empty(), "course catalog {} is empty", path.display());
    Ok(CourseCatalog::from_map(map))
}

/// Load the trusted networks from a JSON array of CIDR strings.
///
/// `test_mode` appends the local ranges after the configured ones.
pub fn load_networks(path: &Path, test_mode: bool) -> anyhow::Result<TrustedNetworks> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading trusted networks {}", path.display()))?;
    let cidrs: Vec<String> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing trusted networks {}", path.display()))?;
    let networks = TrustedNetworks::from_cidrs(&cidrs)
        .with_context(|| format!("invalid CIDR in {}", path.display()))?;
    Ok(if test_mode {
        networks.with_local_ranges()
    } else {
        networks
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn temp_file(contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "busyboard-config-test-{}-{}.json",
            std::process::id(),
            contents.len()
        ));
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn catalog_loads_code_name_pairs() {
        let path = temp_file(r#"{"CPSC": "Computer Science", "MATH": "Mathematics"}"#);
        let catalog = load_catalog(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.name("CPSC"), "Computer Science");
        fs::remove_file(path).ok();
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let path = temp_file("{}");
        let err = load_catalog(&path).unwrap_err();
        assert!(err.to_string().contains("empty"));
        fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_catalog(Path::new("/nonexistent/courses.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/courses.json"));
    }

    #[test]
    fn networks_load_and_test_mode_appends_local() {
        let path = temp_file(r#"["142.103.0.0/16"]"#);
        let strict = load_networks(&path, false).unwrap();
        assert!(strict.contains("142.103.1.1"));
        assert!(!strict.contains("127.0.0.1"));

        let test = load_networks(&path, true).unwrap();
        assert!(test.contains("142.103.1.1"));
        assert!(test.contains("127.0.0.1"));
        fs::remove_file(path).ok();
    }

    #[test]
    fn bad_cidr_fails_with_the_range() {
        let path = temp_file(r#"["not-a-range"]"#);
        let err = load_networks(&path, false).unwrap_err();
        assert!(format!("{err:#}").contains("not-a-range"));
        fs::remove_file(path).ok();
    }
}
