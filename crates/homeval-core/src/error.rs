//! Error types for Homeval.

use thiserror::Error;

/// Main error type for Homeval operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HomevalError {
    /// A mutator was called with a name that is not a declared field of that kind.
    #[error("Invalid {kind} field: {name}")]
    InvalidField { kind: &'static str, name: String },

    /// The request never produced a response (connection refused, DNS, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The prediction service answered with a non-success status.
    #[error("Prediction service returned {status}: {body}")]
    TransportStatus { status: u16, body: String },

    /// The service answered successfully but without a usable price.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration could not be loaded or resolved.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl HomevalError {
    /// Create an invalid field error.
    pub fn invalid_field(kind: &'static str, name: impl Into<String>) -> Self {
        HomevalError::InvalidField {
            kind,
            name: name.into(),
        }
    }

    /// Returns true if this error came from talking to the prediction service.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            HomevalError::Transport(_) | HomevalError::TransportStatus { .. }
        )
    }

    /// Returns true if the service responded but the body was unusable.
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, HomevalError::MalformedResponse(_))
    }
}

/// Convenience Result type for Homeval operations.
pub type Result<T> = std::result::Result<T, HomevalError>;

impl From<serde_json::Error> for HomevalError {
    fn from(err: serde_json::Error) -> Self {
        HomevalError::SerializationError(err.to_string())
    }
}
