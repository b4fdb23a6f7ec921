//! File system errors

use std::path::Path;

use super::EmbedError;

/// Creates a file read error
pub fn read_failed(path: &Path, err: &std::io::Error) -> EmbedError {
    EmbedError::FileReadFailed {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> EmbedError {
    EmbedError::IoError {
        message: message.into(),
    }
}
