//! Golden conformance fixtures
//!
//! A fixture records the runtime layout the Go compiler produced for a known
//! file tree under one release. Checking a [`Bundle`] against it proves that
//! the hash profile and the entry order both match that release.
//!
//! ```json
//! {
//!   "runtime": "go1.22",
//!   "profile": "not-sha256",
//!   "files": [
//!     { "name": "testdata/", "data": "", "hash_hex": "00000000000000000000000000000000" },
//!     { "name": "testdata/data1.txt", "data": "hello data1", "hash_hex": "94eb448b..." }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Bundle, BundleEntry};
use crate::error::Result;
use crate::error::bundle::mismatch;
use crate::error::config::parse_failed;
use crate::error::fs::read_failed;
use crate::hash::{ContentHash, HashProfile};

/// One runtime entry of a fixture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureFile {
    pub name: String,
    /// UTF-8 contents; empty for directories
    #[serde(default)]
    pub data: String,
    pub hash_hex: String,
}

/// Runtime layout captured for one Go release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub runtime: String,
    pub profile: HashProfile,
    pub files: Vec<FixtureFile>,
}

impl Fixture {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| read_failed(path, &e))?;
        serde_json::from_str(&json)
            .map_err(|e| parse_failed(path.display().to_string(), e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Record the runtime layout of a bundle
    pub fn capture(runtime: impl Into<String>, bundle: &Bundle) -> Self {
        let files = bundle
            .runtime_files()
            .into_iter()
            .map(|entry| FixtureFile {
                data: String::from_utf8_lossy(&entry.data).into_owned(),
                hash_hex: entry.hash.to_hex(),
                name: entry.name,
            })
            .collect();
        Self {
            runtime: runtime.into(),
            profile: bundle.profile(),
            files,
        }
    }

    /// Compare a bundle with the fixture entry by entry
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EmbedError::ConformanceMismatch`] describing
    /// the first difference.
    pub fn check(&self, bundle: &Bundle) -> Result<()> {
        if bundle.profile() != self.profile {
            return Err(mismatch(
                &self.runtime,
                format!(
                    "bundle built with profile {}, fixture uses {}",
                    bundle.profile(),
                    self.profile
                ),
            ));
        }

        let actual = bundle.runtime_files();
        for (i, expected) in self.files.iter().enumerate() {
            let Some(entry) = actual.get(i) else {
                return Err(mismatch(
                    &self.runtime,
                    format!("entry {i}: missing {}", expected.name),
                ));
            };
            if let Some(message) = compare(expected, entry) {
                return Err(mismatch(&self.runtime, format!("entry {i}: {message}")));
            }
        }
        if let Some(extra) = actual.get(self.files.len()) {
            return Err(mismatch(
                &self.runtime,
                format!("entry {}: unexpected {}", self.files.len(), extra.name),
            ));
        }
        Ok(())
    }
}

fn compare(expected: &FixtureFile, entry: &BundleEntry) -> Option<String> {
    if expected.name != entry.name {
        return Some(format!("expected {}, found {}", expected.name, entry.name));
    }
    if expected.data.as_bytes() != entry.data.as_slice() {
        return Some(format!("{}: contents differ", entry.name));
    }
    match ContentHash::from_hex(&expected.hash_hex) {
        Some(hash) if hash == entry.hash => None,
        Some(_) => Some(format!(
            "{}: hash {} does not match {}",
            entry.name, entry.hash, expected.hash_hex
        )),
        None => Some(format!("{}: malformed hash {}", entry.name, expected.hash_hex)),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::bundle::build;
    use crate::error::EmbedError;
    use crate::resolver::ResolvedFile;

    fn bundle(profile: HashProfile) -> Bundle {
        let files = [("testdata/data1.txt", "hello data1"), ("testdata/data2.txt", "hello data2")]
            .into_iter()
            .map(|(name, data)| ResolvedFile {
                name: name.to_string(),
                data: data.as_bytes().to_vec(),
                source_path: PathBuf::from(name),
                patterns: vec!["testdata".to_string()],
            });
        build(files, profile)
    }

    const GO_1_18: &str = r#"{
        "runtime": "go1.18",
        "profile": "sha256",
        "files": [
            {"name": "testdata/", "hash_hex": "00000000000000000000000000000000"},
            {"name": "testdata/data1.txt", "data": "hello data1", "hash_hex": "6b14bb74fb7b3acf2f16dce88cfc6e22"},
            {"name": "testdata/data2.txt", "data": "hello data2", "hash_hex": "76cc65be62d4c3f5b35a540caee1f031"}
        ]
    }"#;

    #[test]
    fn test_check_matching_fixture() {
        let fixture = Fixture::from_json(GO_1_18).unwrap_or_else(|e| panic!("{e}"));
        assert!(fixture.check(&bundle(HashProfile::Sha256)).is_ok());
    }

    #[test]
    fn test_check_reports_wrong_profile() {
        let fixture = Fixture::from_json(GO_1_18).unwrap_or_else(|e| panic!("{e}"));
        let err = fixture.check(&bundle(HashProfile::NotSha256)).err();
        assert!(matches!(err, Some(EmbedError::ConformanceMismatch { .. })));
    }

    #[test]
    fn test_check_reports_first_difference() {
        let mut fixture = Fixture::from_json(GO_1_18).unwrap_or_else(|e| panic!("{e}"));
        fixture.files[2].hash_hex = "00".repeat(16);
        let err = fixture.check(&bundle(HashProfile::Sha256)).err();
        let Some(EmbedError::ConformanceMismatch { runtime, message }) = err else {
            panic!("expected mismatch, got {err:?}");
        };
        assert_eq!(runtime, "go1.18");
        assert!(message.starts_with("entry 2: testdata/data2.txt: hash"), "{message}");

        fixture.files.pop();
        let err = fixture.check(&bundle(HashProfile::Sha256)).err();
        assert!(err.is_some_and(|e| e.to_string().contains("unexpected testdata/data2.txt")));
    }

    #[test]
    fn test_capture_matches_check() {
        let bundle = bundle(HashProfile::Sha256FirstByteInverted);
        let fixture = Fixture::capture("go1.24", &bundle);
        assert_eq!(fixture.files.len(), 3);
        assert_eq!(fixture.files[1].hash_hex, "9414bb74fb7b3acf2f16dce88cfc6e22");
        let reparsed = fixture
            .to_json()
            .and_then(|json| Fixture::from_json(&json))
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(reparsed.check(&bundle).is_ok());
    }
}
