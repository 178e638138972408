//! Egress error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EgressError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Backend returned {status_code}")]
    StatusError {
        status_code: u16,
        message: Option<String>,
        body: String,
    },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl EgressError {
    /// Convert into the shared error, naming the backend for transport failures.
    pub fn into_core(self, backend_url: &str) -> notedeck_core::Error {
        match self {
            EgressError::HttpError(e) => notedeck_core::Error::Transport {
                backend_url: backend_url.to_string(),
                reason: e.to_string(),
            },
            EgressError::StatusError {
                status_code,
                message,
                body,
            } => notedeck_core::Error::Status {
                status: status_code,
                message,
                body,
            },
            EgressError::ParseError(msg) => notedeck_core::Error::InvalidResponse(msg),
            EgressError::ConfigError(msg) => notedeck_core::Error::Config(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, EgressError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_keeps_message_and_body() {
        let err = EgressError::StatusError {
            status_code: 403,
            message: None,
            body: "Access denied".to_string(),
        }
        .into_core("http://localhost:8080");

        assert!(err.is_auth_rejection());
        match err {
            notedeck_core::Error::Status { body, .. } => assert_eq!(body, "Access denied"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_becomes_invalid_response() {
        let err = EgressError::ParseError("expected value".to_string()).into_core("http://x");
        assert!(matches!(err, notedeck_core::Error::InvalidResponse(_)));
    }

    #[test]
    fn test_error_display_formatting() {
        let err = EgressError::ConfigError("bad url".to_string());
        assert!(err.to_string().contains("Invalid configuration"));

        let err = EgressError::StatusError {
            status_code: 500,
            message: None,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "Backend returned 500");
    }
}
