//! Error types for locus.

use thiserror::Error;

/// Result type alias using locus's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for locus operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Content row not found
    #[error("Content not found: {0}")]
    ContentNotFound(i64),

    /// Malformed input item (missing required field)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Duplicate natural key on insert
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Remote collaborator (library or completion service) failed
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),

    /// Completion/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::RemoteUnavailable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_content_not_found() {
        let err = Error::ContentNotFound(42);
        assert_eq!(err.to_string(), "Content not found: 42");
    }

    #[test]
    fn test_error_display_validation() {
        let err = Error::Validation("missing title".to_string());
        assert_eq!(err.to_string(), "Validation error: missing title");
    }

    #[test]
    fn test_error_display_conflict() {
        let err = Error::Conflict("duplicate zotero key".to_string());
        assert_eq!(err.to_string(), "Conflict: duplicate zotero key");
    }

    #[test]
    fn test_error_display_remote_unavailable() {
        let err = Error::RemoteUnavailable("connection refused".to_string());
        assert_eq!(err.to_string(), "Remote unavailable: connection refused");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
