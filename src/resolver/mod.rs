//! Pattern resolution for `//go:embed`
//!
//! This module handles:
//! - Validating patterns and rejecting paths that leave the package directory
//! - Expanding directories and globs with hidden-file exclusion
//! - Deduplicating files matched by several patterns
//! - Detecting patterns that disagree about a hidden file
//!
//! Patterns are processed in the sorted order of the [`PatternSet`], so the
//! first error and the output order are reproducible. Resolution stops at the
//! first pattern that fails.

pub mod pattern;
pub mod walk;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::declare::{EmbedKind, EmbedVar};
use crate::directive::PatternSet;
use crate::error::resolve::{invalid_pattern, no_match, unreadable};
use crate::error::{EmbedError, Result};
use crate::path_utils::is_within;
use pattern::EmbedPattern;
use walk::PackageDir;

/// Options for a single [`Resolver::load`] call
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Checked before each pattern, never inside one
    pub deadline: Option<Instant>,
}

impl LoadOptions {
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }
}

/// A file selected for embedding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedFile {
    /// Slash-separated path relative to the package directory
    pub name: String,
    #[serde(skip)]
    pub data: Vec<u8>,
    pub source_path: PathBuf,
    /// Patterns that matched this file, sorted
    pub patterns: Vec<String>,
}

/// Files selected by a pattern set
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Sorted by name, byte-wise
    pub files: Vec<ResolvedFile>,
    /// File names matched by each pattern
    pub matches: BTreeMap<String, Vec<String>>,
}

impl Resolution {
    pub fn names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }
}

/// File found by at least one pattern, before its contents are read
struct Candidate {
    path: PathBuf,
    patterns: Vec<String>,
}

/// Resolves embed patterns against a package directory
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    options: LoadOptions,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: LoadOptions) -> Self {
        Self { options }
    }

    /// Resolve every pattern and load the matched files
    ///
    /// # Errors
    ///
    /// Fails on the first pattern that is invalid, matches nothing, or
    /// reaches outside the package directory, and when two patterns disagree
    /// on whether a hidden file is embedded.
    pub fn resolve(&self, base: &Path, patterns: &PatternSet) -> Result<Resolution> {
        let dir = PackageDir::open(base)?;
        let mut candidates: BTreeMap<String, Candidate> = BTreeMap::new();
        let mut skipped: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        let mut matches = BTreeMap::new();

        for raw in patterns.patterns() {
            if self
                .options
                .deadline
                .is_some_and(|deadline| Instant::now() >= deadline)
            {
                return Err(EmbedError::DeadlineExceeded {
                    pattern: raw.to_string(),
                });
            }

            let pos = patterns.position(raw);
            let pattern = EmbedPattern::parse(raw).map_err(|reason| invalid_pattern(&pos, raw, reason))?;
            let expansion = walk::expand(&dir, &pattern, &pos)?;
            if expansion.files.is_empty() {
                return Err(no_match(&pos, raw));
            }

            let mut names = Vec::with_capacity(expansion.files.len());
            for found in expansion.files {
                names.push(found.name.clone());
                candidates
                    .entry(found.name)
                    .or_insert_with(|| Candidate {
                        path: found.path,
                        patterns: Vec::new(),
                    })
                    .patterns
                    .push(raw.to_string());
            }
            matches.insert(raw.to_string(), names);
            if !expansion.skipped.is_empty() {
                skipped.insert(raw, expansion.skipped);
            }
        }

        check_conflicts(patterns, &candidates, &skipped)?;

        let files = candidates
            .into_iter()
            .map(|(name, candidate)| read_candidate(patterns, name, candidate))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            base = %base.display(),
            patterns = patterns.len(),
            files = files.len(),
            "resolved go:embed patterns"
        );
        Ok(Resolution { files, matches })
    }

    /// Load the files matched by a pattern set, sorted by name
    pub fn load(&self, base: &Path, patterns: &PatternSet) -> Result<Vec<ResolvedFile>> {
        self.resolve(base, patterns).map(|resolution| resolution.files)
    }

    /// Load the files of one embedded variable
    ///
    /// `string` and `[]byte` variables hold the contents of exactly one file.
    pub fn load_var(&self, base: &Path, var: &EmbedVar) -> Result<Vec<ResolvedFile>> {
        let files = self.load(base, &var.patterns)?;
        if var.kind != EmbedKind::Files && files.len() > 1 {
            return Err(EmbedError::MultipleFiles {
                pos: var.position.clone(),
                ty: var.kind.to_string(),
            });
        }
        Ok(files)
    }
}

/// Read a matched file, blaming the first pattern that matched it
fn read_candidate(patterns: &PatternSet, name: String, candidate: Candidate) -> Result<ResolvedFile> {
    let data = std::fs::read(&candidate.path).map_err(|e| {
        let first = candidate.patterns.first().map_or("", String::as_str);
        unreadable(&patterns.position(first), first, &name, &e)
    })?;
    Ok(ResolvedFile {
        name,
        data,
        source_path: candidate.path,
        patterns: candidate.patterns,
    })
}

/// Fail when a file embedded by one pattern was skipped as hidden by another
fn check_conflicts(
    patterns: &PatternSet,
    candidates: &BTreeMap<String, Candidate>,
    skipped: &BTreeMap<&str, Vec<String>>,
) -> Result<()> {
    for (name, candidate) in candidates {
        for (other, hidden) in skipped {
            if candidate.patterns.iter().any(|p| p == other) {
                continue;
            }
            if let Some(entry) = hidden.iter().find(|entry| is_within(name, entry)) {
                let pattern = &candidate.patterns[0];
                return Err(EmbedError::Conflict {
                    pos: patterns.position(pattern),
                    pattern: pattern.clone(),
                    path: entry.clone(),
                    other: (*other).to_string(),
                    other_pos: patterns.position(other),
                });
            }
        }
    }
    Ok(())
}
