//! Embedded filesystem read and conformance errors

use super::EmbedError;

/// Creates a not exist error
pub fn not_exist(name: impl Into<String>) -> EmbedError {
    EmbedError::NotExist { name: name.into() }
}

/// Creates an is directory error
pub fn is_directory(name: impl Into<String>) -> EmbedError {
    EmbedError::IsDirectory { name: name.into() }
}

/// Creates a not directory error
pub fn not_directory(name: impl Into<String>) -> EmbedError {
    EmbedError::NotDirectory { name: name.into() }
}

/// Creates a conformance mismatch error
pub fn mismatch(runtime: impl Into<String>, message: impl Into<String>) -> EmbedError {
    EmbedError::ConformanceMismatch {
        runtime: runtime.into(),
        message: message.into(),
    }
}
