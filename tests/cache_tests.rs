//! Tests for the process-wide bundle cache used by `resolve_bundle`

mod common;

use std::sync::Arc;

use common::TestWorkspace;
use goembed::{BundleCache, CacheKey, EmbedConfig, EmbedError, HashProfile, PatternSet, resolve_bundle};
use serial_test::serial;

#[test]
#[serial]
fn test_cached_bundle_is_reused() {
    let workspace = TestWorkspace::from_fixture("embedtest");
    let patterns = PatternSet::from_patterns(["testdata"]);
    let config = EmbedConfig::for_runtime("go1.22");

    let first = resolve_bundle(&workspace.path, &patterns, &config).expect("bundle builds");
    // The cache is never invalidated within a process
    workspace.write_file("testdata/data3.txt", "hello data3");
    let second = resolve_bundle(&workspace.path, &patterns, &config).expect("bundle builds");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(second.len(), 2);

    let key = CacheKey::new(&workspace.path, &patterns, HashProfile::NotSha256);
    assert!(BundleCache::global().get(&key).is_some());
}

#[test]
#[serial]
fn test_profile_is_part_of_the_key() {
    let workspace = TestWorkspace::from_fixture("embedtest");
    let patterns = PatternSet::from_patterns(["testdata"]);

    let old = resolve_bundle(&workspace.path, &patterns, &EmbedConfig::for_runtime("go1.18"))
        .expect("bundle builds");
    let new = resolve_bundle(&workspace.path, &patterns, &EmbedConfig::for_runtime("go1.24"))
        .expect("bundle builds");

    assert_eq!(old.profile(), HashProfile::Sha256);
    assert_eq!(new.profile(), HashProfile::Sha256FirstByteInverted);
    assert_ne!(old.fingerprint(), new.fingerprint());
}

#[test]
#[serial]
fn test_cache_disabled_rebuilds() {
    let workspace = TestWorkspace::from_fixture("embedtest");
    let patterns = PatternSet::from_patterns(["testdata"]);
    let config = EmbedConfig {
        cache: false,
        ..EmbedConfig::with_profile(HashProfile::Sha256)
    };

    let first = resolve_bundle(&workspace.path, &patterns, &config).expect("bundle builds");
    workspace.write_file("testdata/data3.txt", "hello data3");
    let second = resolve_bundle(&workspace.path, &patterns, &config).expect("bundle builds");

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.len(), 3);
    let key = CacheKey::new(&workspace.path, &patterns, HashProfile::Sha256);
    assert!(BundleCache::global().get(&key).is_none());
}

#[test]
#[serial]
fn test_failures_are_not_cached() {
    let workspace = TestWorkspace::from_fixture("embedtest");
    let patterns = PatternSet::from_patterns(["static"]);
    let config = EmbedConfig::for_runtime("go1.20");

    let err = resolve_bundle(&workspace.path, &patterns, &config).err();
    assert!(matches!(err, Some(EmbedError::NoMatch { .. })), "{err:?}");

    workspace.write_file("static/app.js", "console.log(1)");
    let bundle = resolve_bundle(&workspace.path, &patterns, &config).expect("bundle builds");
    assert_eq!(bundle.names(), vec!["static/app.js"]);
}

#[test]
fn test_unconfigured_profile_is_an_error() {
    let workspace = TestWorkspace::from_fixture("embedtest");
    let err = resolve_bundle(
        &workspace.path,
        &PatternSet::from_patterns(["testdata"]),
        &EmbedConfig::default(),
    )
    .err();
    assert!(matches!(err, Some(EmbedError::UnknownRuntime { .. })), "{err:?}");
}
