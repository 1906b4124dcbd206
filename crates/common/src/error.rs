//! Error types

use thiserror::Error;

/// Main error type for the webhook relay
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Malformed body: {0}")]
    MalformedBody(String),

    /// No source claims the event. Acknowledged, never surfaced as a failure.
    #[error("accepted, nothing to do")]
    UnrecognizedTransport,

    #[error("{reason}")]
    ValidationFailed { reason: String, code: u16 },

    #[error("{detail}")]
    EnrichmentFailed { detail: String, code: u16 },

    #[error("{detail}")]
    ForwardFailed { detail: String, code: u16 },

    /// Logged only, never propagated to the caller
    #[error("Notification failed: {0}")]
    NotificationFailed(String),
}

impl Error {
    pub fn validation(reason: impl Into<String>, code: u16) -> Self {
        Error::ValidationFailed {
            reason: reason.into(),
            code,
        }
    }

    /// Status code the caller sees for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MalformedBody(_) => 400,
            Error::UnrecognizedTransport => 200,
            Error::ValidationFailed { code, .. }
            | Error::EnrichmentFailed { code, .. }
            | Error::ForwardFailed { code, .. } => *code,
            Error::NotificationFailed(_) => 500,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
