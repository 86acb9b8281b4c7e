//! Error handling module for the ticketing console
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Library operations return [`ConsoleError`]; the binary edges wrap them in anyhow.

use thiserror::Error;

/// Main error type for the ticketing console
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// IO errors (state files, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The request never completed (connection refused, DNS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Missing or rejected session
    #[error("Session error: {0}")]
    Session(String),

    /// Validation errors (draft fields, user input)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors (loading, parsing, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// State errors (mutex poisoning, worker gone)
    #[error("State error: {0}")]
    State(String),
}

/// Result type alias for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

// Convenient error constructors
impl ConsoleError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create an HTTP status error
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create a session error
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a state error
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// HTTP status carried by this error, if the backend answered at all
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConsoleError::config("bad base url");
        assert_eq!(err.to_string(), "Configuration error: bad base url");

        let err = ConsoleError::validation("qty must be a number");
        assert_eq!(err.to_string(), "Validation error: qty must be a number");
    }

    #[test]
    fn test_http_error_contains_status() {
        let err = ConsoleError::http(409, r#"{"error":"duplicate"}"#);
        assert_eq!(err.to_string(), r#"HTTP 409: {"error":"duplicate"}"#);
        assert_eq!(err.http_status(), Some(409));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ConsoleError = io_err.into();
        assert!(matches!(err, ConsoleError::Io(_)));
        assert_eq!(err.http_status(), None);
    }

    #[test]
    fn test_error_constructors() {
        let err = ConsoleError::network("connection refused");
        assert!(matches!(err, ConsoleError::Network(_)));

        let err = ConsoleError::session("not logged in");
        assert!(matches!(err, ConsoleError::Session(_)));
    }
}
