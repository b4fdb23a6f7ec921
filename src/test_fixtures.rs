//! Test fixtures and utilities for reducing test setup duplication.
//!
//! Most resolver and bundle tests need a throwaway package directory with a
//! few files in it. This module builds one with a single call.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_fixtures::create_package;
//!
//! #[test]
//! fn my_test() {
//!     let (temp, dir) = create_package(&[
//!         ("testdata/data1.txt", "hello data1"),
//!         ("testdata/.hidden", "secret"),
//!     ]);
//! }
//! ```

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Base directory for test temp dirs
///
/// Never relative, so a `TMPDIR=tmp` environment cannot place package trees
/// under the crate being tested.
fn temp_dir_base() -> PathBuf {
    let base = std::env::temp_dir();
    if base.is_absolute() {
        base
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&base))
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Create a temp directory in the system temp location.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new_in(temp_dir_base()).expect("Failed to create temp directory")
}

/// Create test files below `base`.
///
/// Takes a list of (path, content) tuples. A path ending in `/` creates an
/// empty directory instead of a file.
///
/// # Panics
///
/// Panics if any file cannot be created.
pub fn create_test_files(base: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = base.join(path);
        if path.ends_with('/') {
            std::fs::create_dir_all(&full_path).expect("Failed to create directory");
            continue;
        }
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&full_path, content).expect("Failed to write test file");
    }
}

/// Create a package directory holding the given files.
///
/// Returns the `TempDir` (which cleans up on drop) and the package path. The
/// package lives one level below the temp root so tests can place files
/// outside of it.
///
/// # Panics
///
/// Panics if any file cannot be created.
#[must_use]
pub fn create_package(files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let temp = create_temp_dir();
    let dir = temp.path().join("pkg");
    std::fs::create_dir_all(&dir).expect("Failed to create package directory");
    create_test_files(&dir, files);
    (temp, dir)
}

/// Create a symbolic link at `link` pointing to `target`.
///
/// # Panics
///
/// Panics if the link cannot be created.
#[cfg(unix)]
pub fn create_symlink(target: &Path, link: &Path) {
    std::os::unix::fs::symlink(target, link).expect("Failed to create symlink");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_temp_dir() {
        let temp = create_temp_dir();
        assert!(temp.path().exists());
    }

    #[test]
    fn test_create_package() {
        let (temp, dir) = create_package(&[("a/b.txt", "b"), ("empty/", "")]);
        assert!(dir.starts_with(temp.path()));
        assert!(dir.join("a/b.txt").is_file());
        assert!(dir.join("empty").is_dir());
    }
}
