//! Error types shared across Streamlay crates.

use std::fmt;

/// Boxed cause carried by network failures.
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for Streamlay operations.
#[derive(Debug, thiserror::Error)]
pub enum StreamlayError {
    #[error("{message}")]
    Validation {
        field: Option<&'static str>,
        message: String,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: BoxedCause,
    },

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Media error: {message}")]
    Media { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using StreamlayError.
pub type StreamlayResult<T> = Result<T, StreamlayError>;

/// How a failure should be presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed user input. Shown inline, blocks the action.
    Validation,
    /// Request failed or the server answered with a non-success status.
    Network,
    /// Playback or resource loading failure.
    Media,
    /// Anything else (illegal transitions, local I/O, bugs).
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Network => "network",
            ErrorKind::Media => "media",
            ErrorKind::Internal => "internal",
        };
        f.write_str(label)
    }
}

impl StreamlayError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            field: None,
            message: msg.into(),
        }
    }

    pub fn invalid_field(field: &'static str, msg: impl Into<String>) -> Self {
        Self::Validation {
            field: Some(field),
            message: msg.into(),
        }
    }

    pub fn network(msg: impl Into<String>, source: impl Into<BoxedCause>) -> Self {
        Self::Network {
            message: msg.into(),
            source: source.into(),
        }
    }

    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Classify this error for presentation.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Network { .. } | Self::Api { .. } => ErrorKind::Network,
            Self::Media { .. } => ErrorKind::Media,
            _ => ErrorKind::Internal,
        }
    }

    /// HTTP status code when the server rejected the request.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            StreamlayError::validation("Name is required").kind(),
            ErrorKind::Validation
        );
        assert_eq!(StreamlayError::api(500, "boom").kind(), ErrorKind::Network);
        assert_eq!(StreamlayError::media("bad").kind(), ErrorKind::Media);
        assert_eq!(StreamlayError::session("nope").kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_network_error_keeps_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = StreamlayError::network("GET /overlays failed", cause);
        assert_eq!(err.kind(), ErrorKind::Network);
        let source = err.source().expect("cause should be preserved");
        assert_eq!(source.to_string(), "refused");
    }

    #[test]
    fn test_validation_message_is_displayed_verbatim() {
        let err = StreamlayError::invalid_field("content", "Content is required");
        assert_eq!(err.to_string(), "Content is required");
        assert!(matches!(
            err,
            StreamlayError::Validation {
                field: Some("content"),
                ..
            }
        ));
    }

    #[test]
    fn test_status_only_for_api_errors() {
        assert_eq!(StreamlayError::api(404, "missing").status(), Some(404));
        assert_eq!(StreamlayError::media("x").status(), None);
    }
}
