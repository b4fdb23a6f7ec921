//! Bundle building
//!
//! A [`Bundle`] is the set of resolved files with their runtime content
//! hashes, sorted by name, plus a directory index. It answers the same
//! questions as the runtime's embedded filesystem: open a file, read it, list
//! a directory. [`Bundle::runtime_files`] produces the exact entry list the Go
//! compiler stores for the same inputs.

pub mod index;
pub mod schema;

use serde::Serialize;

use crate::error::Result;
use crate::error::bundle::{is_directory, not_directory, not_exist};
use crate::hash::{ContentHash, Fingerprint, HashProfile};
use crate::resolver::ResolvedFile;
pub use index::DirEntry;
use index::{DirIndex, ROOT, runtime_order};

/// One embedded file, or a directory in the runtime layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleEntry {
    /// Slash-separated name; directories end in `/`
    pub name: String,
    #[serde(skip)]
    pub data: Vec<u8>,
    #[serde(serialize_with = "serialize_hash")]
    pub hash: ContentHash,
}

fn serialize_hash<S: serde::Serializer>(
    hash: &ContentHash,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&hash.to_hex())
}

impl BundleEntry {
    fn directory(name: String) -> Self {
        Self {
            name,
            data: Vec::new(),
            hash: ContentHash::ZERO,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }

    /// Final path element
    pub fn base_name(&self) -> &str {
        index::split(&self.name).1
    }
}

/// Result of [`Bundle::open`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<'a> {
    File(&'a BundleEntry),
    Dir(Vec<DirEntry>),
}

/// Hashed, sorted files ready to be embedded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    profile: HashProfile,
    entries: Vec<BundleEntry>,
    index: DirIndex,
}

/// Hash and order resolved files
///
/// Names are expected to be unique, as [`crate::resolver::Resolver`] returns
/// them; a repeated name keeps its first occurrence.
pub fn build(files: impl IntoIterator<Item = ResolvedFile>, profile: HashProfile) -> Bundle {
    let mut entries: Vec<BundleEntry> = files
        .into_iter()
        .map(|file| BundleEntry {
            hash: profile.hash(&file.data),
            name: file.name,
            data: file.data,
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries.dedup_by(|next, kept| next.name == kept.name);

    let index = DirIndex::build(entries.iter().map(|e| e.name.as_str()));
    tracing::debug!(files = entries.len(), profile = %profile, "built bundle");

    Bundle {
        profile,
        entries,
        index,
    }
}

impl Bundle {
    pub fn profile(&self) -> HashProfile {
        self.profile
    }

    /// Files sorted by name, byte-wise
    pub fn entries(&self) -> &[BundleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Entry list as the Go compiler lays it out
    ///
    /// Every parent directory gets an entry named `dir/` with no data and a
    /// zero hash, and entries follow the runtime's (directory, element) order.
    pub fn runtime_files(&self) -> Vec<BundleEntry> {
        let mut files: Vec<BundleEntry> = self
            .index
            .directory_names()
            .map(BundleEntry::directory)
            .chain(self.entries.iter().cloned())
            .collect();
        files.sort_by(|a, b| runtime_order(&a.name, &b.name));
        files
    }

    fn lookup(&self, name: &str) -> Option<&BundleEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Open a file or directory by its slash-separated name, `.` for the root
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EmbedError::NotExist`] for unknown or
    /// malformed names.
    pub fn open(&self, name: &str) -> Result<Node<'_>> {
        if !valid_name(name) {
            return Err(not_exist(name));
        }
        if let Some(entry) = self.lookup(name) {
            return Ok(Node::File(entry));
        }
        self.index
            .children(name)
            .map(Node::Dir)
            .ok_or_else(|| not_exist(name))
    }

    /// Contents of a file
    pub fn read_file(&self, name: &str) -> Result<&[u8]> {
        match self.open(name)? {
            Node::File(entry) => Ok(&entry.data),
            Node::Dir(_) => Err(is_directory(name)),
        }
    }

    /// Children of a directory, sorted by base name
    pub fn read_dir(&self, name: &str) -> Result<Vec<DirEntry>> {
        match self.open(name)? {
            Node::Dir(children) => Ok(children),
            Node::File(_) => Err(not_directory(name)),
        }
    }

    /// BLAKE3 digest over every name, content and hash
    pub fn fingerprint(&self) -> String {
        let mut fingerprint = Fingerprint::new();
        fingerprint.update(self.profile.name(), &[], &ContentHash::ZERO);
        for entry in &self.entries {
            fingerprint.update(&entry.name, &entry.data, &entry.hash);
        }
        fingerprint.finish()
    }
}

/// Whether a name is a valid embedded filesystem path
///
/// `.` names the root; otherwise no empty, `.` or `..` elements and no
/// leading or trailing slash.
pub fn valid_name(name: &str) -> bool {
    name == ROOT
        || (!name.is_empty()
            && name
                .split('/')
                .all(|elem| !matches!(elem, "" | "." | "..")))
}
