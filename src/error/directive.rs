//! Directive parsing and declaration errors

use super::EmbedError;
use crate::source::Position;

/// Creates a capability missing error
pub fn capability_missing(pos: Position) -> EmbedError {
    EmbedError::CapabilityMissing { pos }
}

/// Creates a malformed directive error
pub fn malformed(pos: Position, text: impl Into<String>) -> EmbedError {
    EmbedError::MalformedDirective {
        pos,
        text: text.into(),
    }
}

/// Creates a misplaced directive error
pub fn misplaced(pos: Position) -> EmbedError {
    EmbedError::Misplaced { pos }
}

/// Creates an invalid variable type error
pub fn invalid_type(pos: Position, ty: impl Into<String>) -> EmbedError {
    EmbedError::InvalidType { pos, ty: ty.into() }
}
