//! Pattern resolution errors

use super::EmbedError;
use crate::source::Position;

/// Creates an invalid pattern error
pub fn invalid_pattern(
    pos: &Position,
    pattern: impl Into<String>,
    reason: impl Into<String>,
) -> EmbedError {
    EmbedError::InvalidPattern {
        pos: pos.clone(),
        pattern: pattern.into(),
        reason: reason.into(),
    }
}

/// Creates an outside tree error
pub fn outside_tree(
    pos: &Position,
    pattern: impl Into<String>,
    path: impl Into<String>,
    reason: impl Into<String>,
) -> EmbedError {
    EmbedError::OutsideTree {
        pos: pos.clone(),
        pattern: pattern.into(),
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an error for a matched path that could not be read
pub fn unreadable(
    pos: &Position,
    pattern: impl Into<String>,
    path: impl Into<String>,
    err: &std::io::Error,
) -> EmbedError {
    EmbedError::Unreadable {
        pos: pos.clone(),
        pattern: pattern.into(),
        path: path.into(),
        reason: err.to_string(),
    }
}

/// Creates a no match error
pub fn no_match(pos: &Position, pattern: impl Into<String>) -> EmbedError {
    EmbedError::NoMatch {
        pos: pos.clone(),
        pattern: pattern.into(),
    }
}

/// Creates an empty directory error
pub fn empty_directory(
    pos: &Position,
    pattern: impl Into<String>,
    path: impl Into<String>,
) -> EmbedError {
    EmbedError::EmptyDirectory {
        pos: pos.clone(),
        pattern: pattern.into(),
        path: path.into(),
    }
}
