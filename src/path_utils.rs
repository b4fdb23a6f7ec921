//! Path utilities for embed resolution
//!
//! Embedded names are always slash-separated and relative to the package
//! directory, whatever the host platform uses.

use std::path::Path;

/// Version control directories never embedded, even with `all:`
const VCS_DIRS: &[&str] = &[".bzr", ".hg", ".git", ".svn"];

/// Convert a path to a string with forward slashes
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use goembed::path_utils::to_forward_slashes;
///
/// assert_eq!(to_forward_slashes(Path::new("static/css/site.css")), "static/css/site.css");
/// ```
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Whether a file or directory name is hidden from directory expansion
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_')
}

/// Whether a name is a version control directory
pub fn is_vcs_name(name: &str) -> bool {
    VCS_DIRS.contains(&name)
}

/// Append `name` to a slash-separated relative path
pub fn join_rel(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}/{name}")
    }
}

/// Whether `path` is `ancestor` itself or lies below it, comparing whole elements
pub fn is_within(path: &str, ancestor: &str) -> bool {
    path == ancestor
        || path
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('/'))
}
