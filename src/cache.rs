//! Process-wide memoization of built bundles
//!
//! A compilation unit's patterns do not change while the process runs, so a
//! bundle built once for a (directory, patterns, profile) key is reused for
//! the rest of the process. Entries are written once and never evicted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::bundle::Bundle;
use crate::directive::PatternSet;
use crate::error::Result;
use crate::hash::HashProfile;

/// Identity of a built bundle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Canonical package directory
    pub base: PathBuf,
    /// Sorted, deduplicated patterns
    pub patterns: Vec<String>,
    pub profile: HashProfile,
}

impl CacheKey {
    pub fn new(base: &Path, patterns: &PatternSet, profile: HashProfile) -> Self {
        let base = dunce::canonicalize(base).unwrap_or_else(|_| base.to_path_buf());
        Self {
            base,
            patterns: patterns.sorted(),
            profile,
        }
    }
}

/// Write-once bundle cache
#[derive(Debug, Default)]
pub struct BundleCache {
    entries: Mutex<HashMap<CacheKey, Arc<Bundle>>>,
}

static GLOBAL: OnceLock<BundleCache> = OnceLock::new();

impl BundleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by the whole process
    pub fn global() -> &'static BundleCache {
        GLOBAL.get_or_init(BundleCache::new)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Arc<Bundle>>> {
        // A panic while holding the lock cannot leave a half-written entry
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<Bundle>> {
        self.lock().get(key).cloned()
    }

    /// Return the cached bundle for `key`, building it on a miss
    ///
    /// The lock is not held while building. When two callers race on the same
    /// key, the first stored bundle wins and both receive it. Failed builds
    /// are not cached.
    pub fn get_or_build<F>(&self, key: CacheKey, build: F) -> Result<Arc<Bundle>>
    where
        F: FnOnce() -> Result<Bundle>,
    {
        if let Some(bundle) = self.get(&key) {
            tracing::debug!(base = %key.base.display(), "bundle cache hit");
            return Ok(bundle);
        }

        tracing::debug!(base = %key.base.display(), patterns = key.patterns.len(), "bundle cache miss");
        let bundle = Arc::new(build()?);
        Ok(Arc::clone(self.lock().entry(key).or_insert(bundle)))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::bundle::build;
    use crate::error::EmbedError;

    fn key(patterns: &[&str], profile: HashProfile) -> CacheKey {
        CacheKey::new(
            Path::new("/nonexistent/pkg"),
            &PatternSet::from_patterns(patterns.iter().copied()),
            profile,
        )
    }

    #[test]
    fn test_builds_once_per_key() {
        let cache = BundleCache::new();
        let calls = Cell::new(0);
        let make = || {
            calls.set(calls.get() + 1);
            Ok(build(Vec::new(), HashProfile::Sha256))
        };

        let first = cache
            .get_or_build(key(&["b", "a"], HashProfile::Sha256), make)
            .unwrap_or_else(|e| panic!("{e}"));
        let second = cache
            .get_or_build(key(&["a", "b", "a"], HashProfile::Sha256), make)
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.get(), 1);

        cache
            .get_or_build(key(&["a", "b"], HashProfile::NotSha256), make)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let cache = BundleCache::new();
        let failed = cache.get_or_build(key(&["x"], HashProfile::Sha256), || {
            Err(EmbedError::NoMatch {
                pos: Default::default(),
                pattern: "x".to_string(),
            })
        });
        assert!(failed.is_err());
        assert!(cache.is_empty());
    }
}
