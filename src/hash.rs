//! Content hashing for embedded files
//!
//! The Go runtime stores a 16-byte content hash next to every embedded file.
//! How that hash is derived from SHA-256 changed between releases, so the
//! algorithm is a [`HashProfile`] chosen by the caller, never guessed.
//!
//! Bundle fingerprints use BLAKE3 and are unrelated to the runtime hash.

use std::fmt;
use std::str::FromStr;

use blake3::Hasher;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::config::unknown_runtime;
use crate::error::{EmbedError, Result};

/// Length of a runtime content hash in bytes
pub const HASH_LEN: usize = 16;

/// Hash prefix for BLAKE3 fingerprints
pub const FINGERPRINT_PREFIX: &str = "blake3:";

/// Digest-plus-transform matching one family of Go releases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashProfile {
    /// Plain SHA-256 (go1.16 to go1.18)
    Sha256,
    /// SHA-256 with every byte inverted (go1.19 to go1.23)
    NotSha256,
    /// SHA-256 with the first byte inverted (go1.24)
    Sha256FirstByteInverted,
}

impl HashProfile {
    pub const ALL: [HashProfile; 3] = [
        HashProfile::Sha256,
        HashProfile::NotSha256,
        HashProfile::Sha256FirstByteInverted,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HashProfile::Sha256 => "sha256",
            HashProfile::NotSha256 => "not-sha256",
            HashProfile::Sha256FirstByteInverted => "sha256-first-byte-inverted",
        }
    }

    /// Look up the profile of a Go release such as `go1.22` or `go1.22.3`
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::UnknownRuntime`] for versions outside the
    /// registry, including releases newer than the last known one.
    pub fn for_runtime(version: &str) -> Result<Self> {
        let minor = parse_minor(version).ok_or_else(|| unknown_runtime(version))?;
        match minor {
            16..=18 => Ok(HashProfile::Sha256),
            19..=23 => Ok(HashProfile::NotSha256),
            24 => Ok(HashProfile::Sha256FirstByteInverted),
            _ => Err(unknown_runtime(version)),
        }
    }

    /// Hash file contents the way the matching runtime does
    pub fn hash(self, data: &[u8]) -> ContentHash {
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&Sha256::digest(data));
        match self {
            HashProfile::Sha256 => {}
            HashProfile::NotSha256 => digest.iter_mut().for_each(|b| *b = !*b),
            HashProfile::Sha256FirstByteInverted => digest[0] ^= 0xff,
        }
        let mut hash = [0u8; HASH_LEN];
        hash.copy_from_slice(&digest[..HASH_LEN]);
        ContentHash(hash)
    }
}

/// Minor version of a `go1.N[.patch]` string, tolerating pre-release suffixes
fn parse_minor(version: &str) -> Option<u32> {
    let rest = version.trim().strip_prefix("go").unwrap_or(version.trim());
    let rest = rest.strip_prefix("1.")?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let tail = &rest[digits.len()..];
    if !(tail.is_empty()
        || tail.starts_with('.')
        || tail.starts_with("rc")
        || tail.starts_with("beta"))
    {
        return None;
    }
    digits.parse().ok()
}

impl fmt::Display for HashProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashProfile {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self> {
        HashProfile::ALL
            .into_iter()
            .find(|profile| profile.name() == s)
            .ok_or_else(|| EmbedError::UnknownProfile {
                name: s.to_string(),
            })
    }
}

/// Runtime content hash of one embedded file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(pub [u8; HASH_LEN]);

impl ContentHash {
    /// Hash carried by directory entries
    pub const ZERO: ContentHash = ContentHash([0; HASH_LEN]);

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; HASH_LEN]
    }

    /// Parse the lowercase or uppercase hex form
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let hash: [u8; HASH_LEN] = bytes.try_into().ok()?;
        Some(ContentHash(hash))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Incremental BLAKE3 fingerprint over named byte strings
#[derive(Default)]
pub struct Fingerprint {
    hasher: Hasher,
}

impl Fingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one named record, separated so that concatenations cannot collide
    pub fn update(&mut self, name: &str, data: &[u8], hash: &ContentHash) {
        self.hasher.update(name.as_bytes());
        self.hasher.update(b"\0");
        self.hasher.update(&(data.len() as u64).to_le_bytes());
        self.hasher.update(data);
        self.hasher.update(hash.as_bytes());
    }

    pub fn finish(&self) -> String {
        format!("{}{}", FINGERPRINT_PREFIX, self.hasher.finalize().to_hex())
    }
}

/// Verify a fingerprint matches the expected value
pub fn verify_fingerprint(expected: &str, actual: &str) -> bool {
    let normalize = |h: &str| {
        if h.starts_with(FINGERPRINT_PREFIX) {
            h.to_string()
        } else {
            format!("{}{}", FINGERPRINT_PREFIX, h)
        }
    };
    normalize(expected) == normalize(actual)
}
