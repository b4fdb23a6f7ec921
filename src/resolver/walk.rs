//! Pattern expansion against the package directory
//!
//! Patterns are expanded one element at a time: literal elements are looked
//! up directly, glob elements are matched with `wax` against the sorted entries
//! of each candidate directory. Every match is then classified as a file, a
//! directory to walk, or an error.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use wax::{CandidatePath, Glob, Pattern};

use super::pattern::{EmbedPattern, Segment};
use crate::error::Result;
use crate::error::fs::read_failed;
use crate::error::resolve::{empty_directory, invalid_pattern, outside_tree, unreadable};
use crate::path_utils::{is_hidden_name, is_vcs_name, join_rel, to_forward_slashes};
use crate::source::Position;

/// Marker file of a Go module root
const MODULE_FILE: &str = "go.mod";

/// The package directory patterns are resolved against
#[derive(Debug, Clone)]
pub struct PackageDir {
    root: PathBuf,
    canonical_root: PathBuf,
}

impl PackageDir {
    pub fn open(root: &Path) -> Result<Self> {
        let canonical_root = dunce::canonicalize(root).map_err(|e| read_failed(root, &e))?;
        Ok(Self {
            root: root.to_path_buf(),
            canonical_root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn canonical_root(&self) -> &Path {
        &self.canonical_root
    }

    fn path(&self, rel: &str) -> PathBuf {
        if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }
}

/// A file reached by a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Slash-separated path relative to the package directory
    pub name: String,
    pub path: PathBuf,
}

/// Everything one pattern expanded to
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    pub files: Vec<Match>,
    /// Hidden files and directories left out of the expansion
    pub skipped: Vec<String>,
}

/// Expand a validated pattern into the files it embeds
///
/// An empty result means the pattern matched nothing; a matched directory
/// without embeddable files is reported here as [`EmbedError::EmptyDirectory`].
///
/// [`EmbedError::EmptyDirectory`]: crate::error::EmbedError::EmptyDirectory
pub fn expand(dir: &PackageDir, pattern: &EmbedPattern<'_>, pos: &Position) -> Result<Expansion> {
    let mut expansion = Expansion::default();
    let mut frontier = vec![String::new()];

    for (index, segment) in pattern.segments().iter().enumerate() {
        if index > 0 {
            frontier.retain(|rel| dir.path(rel).is_dir());
        }
        frontier = if segment.meta {
            match_segment(dir, &frontier, segment, pattern, pos, &mut expansion.skipped)?
        } else {
            let name = segment.literal();
            frontier
                .iter()
                .map(|rel| join_rel(rel, &name))
                .filter(|rel| fs::symlink_metadata(dir.path(rel)).is_ok())
                .collect()
        };
        if frontier.is_empty() {
            break;
        }
    }

    for rel in frontier {
        classify(dir, &rel, pattern, pos, &mut expansion)?;
    }

    tracing::debug!(
        pattern = pattern.raw,
        files = expansion.files.len(),
        skipped = expansion.skipped.len(),
        "expanded pattern"
    );
    Ok(expansion)
}

/// Match a glob element against the entries of every frontier directory
fn match_segment(
    dir: &PackageDir,
    frontier: &[String],
    segment: &Segment<'_>,
    pattern: &EmbedPattern<'_>,
    pos: &Position,
    skipped: &mut Vec<String>,
) -> Result<Vec<String>> {
    let expr = segment
        .to_wax()
        .map_err(|reason| invalid_pattern(pos, pattern.raw, reason))?;
    let glob = Glob::new(&expr).map_err(|e| invalid_pattern(pos, pattern.raw, e.to_string()))?;

    let mut next = Vec::new();
    for rel in frontier {
        let parent = dir.path(rel);
        let mut names: Vec<OsString> = fs::read_dir(&parent)
            .map_err(|e| unreadable(pos, pattern.raw, rel.as_str(), &e))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name())
            .collect();
        names.sort();

        for os_name in names {
            let lossy = os_name.to_string_lossy();
            if glob.matched(&CandidatePath::from(&*lossy)).is_none() || is_vcs_name(&lossy) {
                continue;
            }
            let name = utf8_name(&os_name, rel, pattern, pos)?;
            let child = join_rel(rel, name);
            if is_hidden_name(name) && !pattern.all && !segment.names_hidden() {
                tracing::trace!(pattern = pattern.raw, path = %child, "skipping hidden match");
                skipped.push(child);
                continue;
            }
            next.push(child);
        }
    }
    Ok(next)
}

/// Turn one matched path into embedded files
fn classify(
    dir: &PackageDir,
    rel: &str,
    pattern: &EmbedPattern<'_>,
    pos: &Position,
    expansion: &mut Expansion,
) -> Result<()> {
    if let Some(name) = rel.split('/').find(|elem| is_vcs_name(elem)) {
        return Err(invalid_pattern(
            pos,
            pattern.raw,
            format!("cannot embed {rel}: invalid name {name}"),
        ));
    }
    check_module_boundary(dir, rel, pattern, pos)?;

    let path = dir.path(rel);
    let meta = fs::symlink_metadata(&path).map_err(|e| unreadable(pos, pattern.raw, rel, &e))?;
    let file_type = meta.file_type();

    if file_type.is_symlink() {
        if let Some(target) = resolve_link(dir, &path, rel, pattern.raw, pos)? {
            if target.is_file() {
                expansion.files.push(Match {
                    name: rel.to_string(),
                    path,
                });
            }
        }
        return Ok(());
    }

    ensure_inside(dir, &path, rel, pattern.raw, pos)?;

    if file_type.is_dir() {
        let before = expansion.files.len();
        walk_directory(dir, rel, pattern, pos, expansion)?;
        if expansion.files.len() == before {
            return Err(empty_directory(pos, pattern.raw, rel));
        }
    } else if file_type.is_file() {
        expansion.files.push(Match {
            name: rel.to_string(),
            path,
        });
    } else {
        tracing::trace!(path = %rel, "skipping irregular file");
    }
    Ok(())
}

/// Embed every file below a matched directory
fn walk_directory(
    dir: &PackageDir,
    rel: &str,
    pattern: &EmbedPattern<'_>,
    pos: &Position,
    expansion: &mut Expansion,
) -> Result<()> {
    let mut entries = WalkDir::new(dir.path(rel))
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = entries.next() {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .and_then(|p| p.strip_prefix(dir.root()).ok())
                .map_or_else(|| rel.to_string(), to_forward_slashes);
            unreadable(pos, pattern.raw, path, &std::io::Error::from(e))
        })?;
        if entry.depth() == 0 {
            continue;
        }
        let parent = entry
            .path()
            .parent()
            .and_then(|p| p.strip_prefix(dir.root()).ok())
            .map(to_forward_slashes)
            .unwrap_or_else(|| rel.to_string());
        let name = utf8_name(entry.file_name(), &parent, pattern, pos)?;
        let child = join_rel(&parent, name);
        let file_type = entry.file_type();

        if is_vcs_name(name) {
            if file_type.is_dir() {
                entries.skip_current_dir();
            }
            continue;
        }
        if !pattern.all && is_hidden_name(name) {
            tracing::trace!(pattern = pattern.raw, path = %child, "skipping hidden entry");
            expansion.skipped.push(child);
            if file_type.is_dir() {
                entries.skip_current_dir();
            }
            continue;
        }

        if file_type.is_dir() {
            if entry.path().join(MODULE_FILE).exists() {
                tracing::trace!(path = %child, "skipping nested module");
                entries.skip_current_dir();
            }
        } else if file_type.is_symlink() {
            let path = entry.path().to_path_buf();
            if let Some(target) = resolve_link(dir, &path, &child, pattern.raw, pos)? {
                if target.is_file() {
                    expansion.files.push(Match { name: child, path });
                }
            }
        } else if file_type.is_file() {
            expansion.files.push(Match {
                name: child,
                path: entry.into_path(),
            });
        } else {
            tracing::trace!(path = %child, "skipping irregular file");
        }
    }
    Ok(())
}

/// Embedded names must be UTF-8 so they round-trip to the file they came from
fn utf8_name<'n>(
    name: &'n OsStr,
    parent: &str,
    pattern: &EmbedPattern<'_>,
    pos: &Position,
) -> Result<&'n str> {
    name.to_str().ok_or_else(|| {
        let lossy = name.to_string_lossy();
        invalid_pattern(
            pos,
            pattern.raw,
            format!("cannot embed {}: invalid name {lossy}", join_rel(parent, &lossy)),
        )
    })
}

/// A match may not sit inside a nested module, nor be one
fn check_module_boundary(
    dir: &PackageDir,
    rel: &str,
    pattern: &EmbedPattern<'_>,
    pos: &Position,
) -> Result<()> {
    let mut prefix = rel;
    loop {
        if dir.path(prefix).join(MODULE_FILE).is_file() {
            return Err(outside_tree(pos, pattern.raw, rel, "in different module"));
        }
        match prefix.rfind('/') {
            Some(idx) => prefix = &prefix[..idx],
            None => return Ok(()),
        }
    }
}

/// Resolve a symbolic link, failing when it leaves the package directory
///
/// Returns `None` for links that point at directories, which are never
/// followed.
fn resolve_link(
    dir: &PackageDir,
    path: &Path,
    rel: &str,
    pattern: &str,
    pos: &Position,
) -> Result<Option<PathBuf>> {
    let target = dunce::canonicalize(path)
        .map_err(|e| outside_tree(pos, pattern, rel, format!("broken symbolic link: {e}")))?;
    if !target.starts_with(dir.canonical_root()) {
        return Err(outside_tree(
            pos,
            pattern,
            rel,
            "symbolic link points outside the package directory",
        ));
    }
    if target.is_dir() {
        tracing::trace!(path = %rel, "not following symlinked directory");
        return Ok(None);
    }
    Ok(Some(target))
}

/// Reject matches reached through a symlinked parent that leaves the tree
fn ensure_inside(
    dir: &PackageDir,
    path: &Path,
    rel: &str,
    pattern: &str,
    pos: &Position,
) -> Result<()> {
    let canonical = dunce::canonicalize(path).map_err(|e| unreadable(pos, pattern, rel, &e))?;
    if canonical.starts_with(dir.canonical_root()) {
        Ok(())
    } else {
        Err(outside_tree(
            pos,
            pattern,
            rel,
            "path resolves outside the package directory",
        ))
    }
}
