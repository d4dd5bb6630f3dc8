//! Error types for the Codelore knowledge engine

use thiserror::Error;

/// Result type alias for knowledge engine operations
pub type KnowledgeResult<T> = Result<T, KnowledgeError>;

/// Main error type for the knowledge engine
#[derive(Error, Debug)]
pub enum KnowledgeError {
    /// IO errors from the persistence layer
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Storage backend errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Import file was structurally invalid
    #[error("Import error: {0}")]
    Import(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

impl KnowledgeError {
    /// Create a new storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a new import error
    pub fn import(message: impl Into<String>) -> Self {
        Self::Import(message.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<anyhow::Error> for KnowledgeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KnowledgeError::storage("backend unavailable");
        assert_eq!(err.to_string(), "Storage error: backend unavailable");

        let err = KnowledgeError::import("missing metadata");
        assert_eq!(err.to_string(), "Import error: missing metadata");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: KnowledgeError = io.into();
        assert!(matches!(err, KnowledgeError::Io(_)));
    }

    #[test]
    fn test_from_anyhow() {
        let err: KnowledgeError = anyhow::anyhow!("wrapped").into();
        assert_eq!(err.to_string(), "Error: wrapped");
    }
}
