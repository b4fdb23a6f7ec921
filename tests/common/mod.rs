//! Common test utilities for goembed integration tests

#![allow(dead_code, clippy::expect_used)]

use std::path::{Path, PathBuf};

use goembed::SourceFile;
use goembed::bundle::schema::Fixture;
use tempfile::TempDir;

/// A throwaway Go package directory for integration tests
pub struct TestWorkspace {
    /// Temporary directory
    pub temp: TempDir,
    /// Path to the package directory
    pub path: PathBuf,
}

impl TestWorkspace {
    /// Create an empty package directory one level below the temp root
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().join("pkg");
        std::fs::create_dir_all(&path).expect("Failed to create package directory");
        Self { temp, path }
    }

    /// Create a workspace holding a copy of a fixture package
    pub fn from_fixture(name: &str) -> Self {
        let workspace = Self::new();
        copy_dir_recursive(&fixtures_dir().join("packages").join(name), &workspace.path)
            .expect("Failed to copy fixture package");
        workspace
    }

    /// Write a file in the package
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Write a file next to the package, outside of it
    pub fn write_outside(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.temp.path().join(path);
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Create an empty directory in the package
    pub fn create_dir(&self, path: &str) {
        std::fs::create_dir_all(self.path.join(path)).expect("Failed to create directory");
    }

    /// Check if a file exists in the package
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Parse a Go source file of the package
    pub fn source(&self, name: &str) -> SourceFile {
        SourceFile::read(&self.path.join(name)).expect("Failed to read Go source")
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Root of the checked-in test fixtures
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("common")
        .join("fixtures")
}

/// Golden runtime layout captured for a Go release
pub fn conformance_fixture(runtime: &str) -> Fixture {
    Fixture::load(&fixtures_dir().join("conformance").join(format!("{runtime}.json")))
        .expect("Failed to load conformance fixture")
}

/// Recursively copy a directory
fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    if !dst.exists() {
        std::fs::create_dir_all(dst)?;
    }

    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if file_type.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_creation() {
        let workspace = TestWorkspace::new();
        assert!(workspace.path.exists());
        assert!(workspace.path.starts_with(workspace.temp.path()));
    }

    #[test]
    fn test_workspace_from_fixture() {
        let workspace = TestWorkspace::from_fixture("embedtest");
        assert!(workspace.file_exists("embed.go"));
        assert!(workspace.file_exists("testdata/data1.txt"));
        assert!(workspace.file_exists("testdata/data2.txt"));
    }
}
