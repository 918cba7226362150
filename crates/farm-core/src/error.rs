//! Error Types

use thiserror::Error;

/// Result type alias for farm portal operations
pub type Result<T> = std::result::Result<T, FarmError>;

/// HTTP statuses for which the backend payload carries a message meant for the user
pub const RETRYABLE_STATUSES: [u16; 6] = [400, 402, 429, 500, 502, 503];

/// Whether a backend status belongs to the user-facing (retryable) set
pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// Farm portal error types
#[derive(Error, Debug)]
pub enum FarmError {
    /// Backend answered with a non-success HTTP status
    #[error("Backend returned HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Backend {
        status: u16,
        message: Option<String>,
    },

    /// Payment processor rejected the request
    #[error("Payment processor error: {}", .0.as_deref().unwrap_or("no message"))]
    Processor(Option<String>),

    /// Request never produced a response (DNS, TLS, timeout, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Session missing or unusable
    #[error("Session error: {0}")]
    Session(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FarmError {
    /// Whether this error should be shown to the user rather than only logged
    pub fn is_user_facing(&self) -> bool {
        match self {
            Self::Backend { status, .. } => is_retryable_status(*status),
            Self::Processor(_) => true,
            _ => false,
        }
    }

    /// Message supplied by the remote side, if any
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Backend { message, .. } | Self::Processor(message) => {
                message.as_deref().filter(|m| !m.trim().is_empty())
            }
            _ => None,
        }
    }

    /// HTTP status of a backend failure
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        for status in [400, 402, 429, 500, 502, 503] {
            assert!(is_retryable_status(status));
        }
        assert!(!is_retryable_status(401));
        assert!(!is_retryable_status(404));
        assert!(!is_retryable_status(504));
    }

    #[test]
    fn test_backend_error_user_facing() {
        let err = FarmError::Backend {
            status: 500,
            message: Some("Card declined".into()),
        };
        assert!(err.is_user_facing());
        assert_eq!(err.user_message(), Some("Card declined"));

        let err = FarmError::Backend {
            status: 404,
            message: Some("Not found".into()),
        };
        assert!(!err.is_user_facing());
    }

    #[test]
    fn test_blank_message_is_ignored() {
        let err = FarmError::Processor(Some("   ".into()));
        assert!(err.is_user_facing());
        assert_eq!(err.user_message(), None);
    }

    #[test]
    fn test_display() {
        let err = FarmError::Backend {
            status: 429,
            message: None,
        };
        assert_eq!(err.to_string(), "Backend returned HTTP 429: no message");
    }
}
