//! Configuration and hash profile errors

use super::EmbedError;

/// Creates an unknown runtime error
pub fn unknown_runtime(version: impl Into<String>) -> EmbedError {
    EmbedError::UnknownRuntime {
        version: version.into(),
    }
}

/// Creates a configuration parse error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> EmbedError {
    EmbedError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid configuration error
pub fn invalid(message: impl Into<String>) -> EmbedError {
    EmbedError::ConfigInvalid {
        message: message.into(),
    }
}
