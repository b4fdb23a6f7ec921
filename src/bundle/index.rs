//! Directory index and runtime ordering for bundles
//!
//! The runtime keeps embedded files in one sorted slice and finds directory
//! children by binary search. That only works with its own ordering, which
//! compares the parent directory first and the final element second, so
//! `a/z` sorts before `a.txt/b` even though `a.txt/b` is smaller byte-wise.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

/// Name the runtime uses for the root directory
pub const ROOT: &str = ".";

/// Split a runtime name into (directory, element, is directory)
///
/// Directory entries carry a trailing `/`. Top-level names live in `.`.
pub fn split(name: &str) -> (&str, &str, bool) {
    let (name, is_dir) = match name.strip_suffix('/') {
        Some(trimmed) => (trimmed, true),
        None => (name, false),
    };
    match name.rfind('/') {
        Some(i) => (&name[..i], &name[i + 1..], is_dir),
        None => (ROOT, name, is_dir),
    }
}

/// Runtime ordering of embedded names
pub fn runtime_order(a: &str, b: &str) -> Ordering {
    let (a_dir, a_elem, _) = split(a);
    let (b_dir, b_elem, _) = split(b);
    a_dir.cmp(b_dir).then_with(|| a_elem.cmp(b_elem))
}

/// One child of a directory
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DirEntry {
    /// Base name, without any `/`
    pub name: String,
    pub is_dir: bool,
}

/// Children of every directory implied by a set of file names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirIndex {
    dirs: BTreeMap<String, BTreeMap<String, bool>>,
}

impl DirIndex {
    /// Index slash-separated file names, adding every parent directory
    pub fn build<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut dirs: BTreeMap<String, BTreeMap<String, bool>> = BTreeMap::new();
        dirs.entry(ROOT.to_string()).or_default();

        for name in names {
            let mut is_dir = false;
            let mut current = name;
            loop {
                let (dir, elem, _) = split(current);
                let children = dirs.entry(dir.to_string()).or_default();
                let inserted = children.insert(elem.to_string(), is_dir).is_none();
                if dir == ROOT || !inserted {
                    break;
                }
                current = dir;
                is_dir = true;
            }
        }
        Self { dirs }
    }

    pub fn is_dir(&self, name: &str) -> bool {
        self.dirs.contains_key(name)
    }

    /// Children of a directory sorted by name, or `None` if it is not one
    pub fn children(&self, dir: &str) -> Option<Vec<DirEntry>> {
        self.dirs.get(dir).map(|children| {
            children
                .iter()
                .map(|(name, is_dir)| DirEntry {
                    name: name.clone(),
                    is_dir: *is_dir,
                })
                .collect()
        })
    }

    /// Every directory except the root, as runtime names with a trailing `/`
    pub fn directory_names(&self) -> impl Iterator<Item = String> + '_ {
        self.dirs
            .keys()
            .filter(|dir| dir.as_str() != ROOT)
            .map(|dir| format!("{dir}/"))
    }
}
