//! Error types and handling for goembed
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`directive`]: Directive parsing and declaration errors
//! - [`resolve`]: Pattern resolution errors
//! - [`bundle`]: Embedded filesystem read and conformance errors
//! - [`fs`]: File system errors
//! - [`config`]: Configuration and hash profile errors
//!
//! Every error raised while parsing or resolving a directive carries the
//! [`Position`] of the directive or pattern it originates from, printed as a
//! `file:line:column` prefix like the Go toolchain does.

pub mod bundle;
pub mod config;
pub mod directive;
pub mod fs;
pub mod resolve;


use miette::Diagnostic;
use thiserror::Error;

use crate::source::Position;

/// Main error type for goembed operations
#[derive(Error, Diagnostic, Debug)]
pub enum EmbedError {
    // Directive errors
    #[error("{pos}: go:embed only allowed in Go files that import \"embed\"")]
    #[diagnostic(
        code(goembed::directive::capability_missing),
        help("Add `import _ \"embed\"` to the file that declares the directive")
    )]
    CapabilityMissing { pos: Position },

    #[error("{pos}: invalid quoted string in //go:embed: {text}")]
    #[diagnostic(
        code(goembed::directive::malformed),
        help("Patterns are separated by spaces; quote patterns containing spaces with \"...\" or `...`")
    )]
    MalformedDirective { pos: Position, text: String },

    #[error("{pos}: invalid import path literal {literal}")]
    #[diagnostic(code(goembed::directive::invalid_import))]
    InvalidImport { pos: Position, literal: String },

    #[error("{pos}: misplaced go:embed directive")]
    #[diagnostic(
        code(goembed::directive::misplaced),
        help("go:embed must immediately precede a package-level var declaration with a single name")
    )]
    Misplaced { pos: Position },

    #[error("{pos}: go:embed cannot apply to var of type {ty}")]
    #[diagnostic(
        code(goembed::directive::invalid_type),
        help("Embedded variables must have type string, []byte or embed.FS")
    )]
    InvalidType { pos: Position, ty: String },

    #[error("{pos}: invalid go:embed: multiple files for type {ty}")]
    #[diagnostic(code(goembed::directive::multiple_files))]
    MultipleFiles { pos: Position, ty: String },

    // Resolution errors
    #[error("{pos}: pattern {pattern}: invalid pattern syntax: {reason}")]
    #[diagnostic(
        code(goembed::resolve::invalid_pattern),
        help("Patterns are slash-separated paths relative to the package directory")
    )]
    InvalidPattern {
        pos: Position,
        pattern: String,
        reason: String,
    },

    #[error("{pos}: pattern {pattern}: cannot embed {path}: {reason}")]
    #[diagnostic(code(goembed::resolve::outside_tree))]
    OutsideTree {
        pos: Position,
        pattern: String,
        path: String,
        reason: String,
    },

    #[error("{pos}: pattern {pattern}: cannot read {path}: {reason}")]
    #[diagnostic(code(goembed::resolve::unreadable))]
    Unreadable {
        pos: Position,
        pattern: String,
        path: String,
        reason: String,
    },

    #[error("{pos}: pattern {pattern}: no matching files found")]
    #[diagnostic(code(goembed::resolve::no_match))]
    NoMatch { pos: Position, pattern: String },

    #[error("{pos}: pattern {pattern}: cannot embed directory {path}: contains no embeddable files")]
    #[diagnostic(
        code(goembed::resolve::empty_directory),
        help("Files whose names begin with '.' or '_' are excluded; use the all: prefix to include them")
    )]
    EmptyDirectory {
        pos: Position,
        pattern: String,
        path: String,
    },

    #[error(
        "{pos}: pattern {pattern}: {path} is included here but excluded as hidden by pattern {other} at {other_pos}"
    )]
    #[diagnostic(
        code(goembed::resolve::conflict),
        help("Use the all: prefix on the directory pattern or drop the explicit pattern")
    )]
    Conflict {
        pos: Position,
        pattern: String,
        path: String,
        other: String,
        other_pos: Position,
    },

    #[error("Deadline exceeded before resolving pattern {pattern}")]
    #[diagnostic(code(goembed::resolve::deadline_exceeded))]
    DeadlineExceeded { pattern: String },

    // Bundle read errors
    #[error("open {name}: file does not exist")]
    #[diagnostic(code(goembed::bundle::not_exist))]
    NotExist { name: String },

    #[error("read {name}: is a directory")]
    #[diagnostic(code(goembed::bundle::is_directory))]
    IsDirectory { name: String },

    #[error("readdir {name}: not a directory")]
    #[diagnostic(code(goembed::bundle::not_directory))]
    NotDirectory { name: String },

    #[error("Bundle does not match {runtime} fixture: {message}")]
    #[diagnostic(code(goembed::bundle::conformance_mismatch))]
    ConformanceMismatch { runtime: String, message: String },

    // Configuration errors
    #[error("Unknown Go runtime version: {version}")]
    #[diagnostic(
        code(goembed::config::unknown_runtime),
        help("Supported runtimes: go1.16 through go1.24; set hash_profile explicitly for others")
    )]
    UnknownRuntime { version: String },

    #[error("Unknown hash profile: {name}")]
    #[diagnostic(
        code(goembed::config::unknown_profile),
        help("Valid profiles: sha256, not-sha256, sha256-first-byte-inverted")
    )]
    UnknownProfile { name: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(goembed::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(goembed::config::invalid))]
    ConfigInvalid { message: String },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(goembed::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(goembed::fs::io_error))]
    IoError { message: String },
}

impl EmbedError {
    /// Source position the error is attributed to, if any
    pub fn position(&self) -> Option<&Position> {
        match self {
            EmbedError::CapabilityMissing { pos }
            | EmbedError::MalformedDirective { pos, .. }
            | EmbedError::InvalidImport { pos, .. }
            | EmbedError::Misplaced { pos }
            | EmbedError::InvalidType { pos, .. }
            | EmbedError::MultipleFiles { pos, .. }
            | EmbedError::InvalidPattern { pos, .. }
            | EmbedError::OutsideTree { pos, .. }
            | EmbedError::Unreadable { pos, .. }
            | EmbedError::NoMatch { pos, .. }
            | EmbedError::EmptyDirectory { pos, .. }
            | EmbedError::Conflict { pos, .. } => Some(pos),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EmbedError {
    fn from(err: std::io::Error) -> Self {
        EmbedError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<walkdir::Error> for EmbedError {
    fn from(err: walkdir::Error) -> Self {
        let path = err
            .path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        EmbedError::FileReadFailed {
            path,
            reason: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for EmbedError {
    fn from(err: serde_yaml::Error) -> Self {
        EmbedError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for EmbedError {
    fn from(err: serde_json::Error) -> Self {
        EmbedError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, EmbedError>;

/// Errors collected from independent directives
///
/// A bad directive only aborts itself, so parsing reports every failure at
/// once instead of stopping at the first.
#[derive(Error, Diagnostic, Debug, Default)]
#[error("{} invalid go:embed directive(s)", .errors.len())]
#[diagnostic(code(goembed::directive::errors))]
pub struct ErrorList {
    #[related]
    pub errors: Vec<EmbedError>,
}

impl ErrorList {
    pub fn new(errors: Vec<EmbedError>) -> Self {
        Self { errors }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EmbedError> {
        self.errors.iter()
    }
}

impl IntoIterator for ErrorList {
    type Item = EmbedError;
    type IntoIter = std::vec::IntoIter<EmbedError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}
