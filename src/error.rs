//! Error types for analytics sessions.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur during session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The engine rejected opening the database location.
    #[error("Connection error: {0}")]
    Connection(String),

    /// An operation was attempted while no connection handle is open.
    #[error("Not connected to a database; call connect() first")]
    NotConnected,

    /// The engine rejected a statement (malformed SQL, missing object,
    /// constraint violation).
    #[error("Query error: {0}")]
    Query(#[from] duckdb::Error),

    /// A referenced input file does not exist. Checked by the wrapper
    /// before any SQL reaches the engine.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A table or view name that cannot be safely quoted into SQL.
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Row deserialization error.
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl SessionError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a deserialization error.
    pub fn deserialization(msg: impl Into<String>) -> Self {
        Self::Deserialization(msg.into())
    }

    /// Whether this error means the referenced input file was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether this error means the session had no open handle.
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Self::NotConnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SessionError::connection("corrupt database file");
        assert!(err.to_string().contains("Connection error"));
        assert!(err.to_string().contains("corrupt database file"));

        let err = SessionError::NotFound(PathBuf::from("/tmp/missing.csv"));
        assert!(err.to_string().contains("/tmp/missing.csv"));
    }

    #[test]
    fn test_error_predicates() {
        assert!(SessionError::NotFound(PathBuf::from("x")).is_not_found());
        assert!(SessionError::NotConnected.is_not_connected());
        assert!(!SessionError::NotConnected.is_not_found());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: SessionError = io.into();
        assert!(matches!(err, SessionError::Io(_)));
    }
}
