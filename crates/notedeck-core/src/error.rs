//! Error types for Notedeck Core

use thiserror::Error;

use crate::operation::Operation;

#[derive(Debug, Error)]
pub enum Error {
    /// No response was received from the backend.
    #[error("Transport error talking to {backend_url}: {reason}")]
    Transport { backend_url: String, reason: String },

    /// The backend answered with a non-success status.
    #[error("HTTP {status}{}", message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
    Status {
        status: u16,
        /// `message` field of a JSON error body, if there was one
        message: Option<String>,
        /// Raw response body text
        body: String,
    },

    /// A success response whose body could not be parsed.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Operation already in progress: {0}")]
    Busy(Operation),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Session store errors
    #[error("Session store error: {0}")]
    SessionStore(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for 401/403 responses, which mean the credential is no longer accepted.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, Error::Status { status: 401 | 403, .. })
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_rejection() {
        for status in [401, 403] {
            let err = Error::Status {
                status,
                message: None,
                body: String::new(),
            };
            assert!(err.is_auth_rejection());
        }

        let err = Error::Status {
            status: 404,
            message: None,
            body: "Note not found".to_string(),
        };
        assert!(!err.is_auth_rejection());
        assert!(!Error::NotAuthenticated.is_auth_rejection());
    }

    #[test]
    fn test_error_display_formatting() {
        let err = Error::Status {
            status: 400,
            message: Some("Email already exists".to_string()),
            body: r#"{"message":"Email already exists"}"#.to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 400: Email already exists");

        let err = Error::Status {
            status: 500,
            message: None,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500");
        assert_eq!(err.status(), Some(500));

        let err = Error::Busy(Operation::CreateNote);
        assert!(err.to_string().contains("create_note"));
    }
}
