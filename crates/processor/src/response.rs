//! Maps the pipeline's terminal state to a status/body pair

use common::models::BackendReply;
use common::{Error, SuccessBody};

pub const HEARTBEAT_MESSAGE: &str = "no body present 👍";
pub const UNRECOGNIZED_MESSAGE: &str = "accepted, nothing to do";

/// Where a pipeline run ended
#[derive(Debug, Clone, PartialEq)]
pub enum Terminal {
    NoBody,
    Unrecognized,
    Invalid(Error),
    Skipped(String),
    EnrichmentFailed(Error),
    ForwardFailed(Error),
    Forwarded(BackendReply),
    /// Valid event for a source with no destination configured
    Accepted,
}

/// What the caller receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: u16,
    pub body: String,
}

impl RelayResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn from_error(error: &Error) -> Self {
        Self::new(error.status_code(), error.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Build the caller's response. The notifier never feeds into this.
pub fn build(terminal: &Terminal, success: &SuccessBody) -> RelayResponse {
    match terminal {
        Terminal::NoBody => RelayResponse::ok(HEARTBEAT_MESSAGE),
        Terminal::Unrecognized => RelayResponse::from_error(&Error::UnrecognizedTransport),
        Terminal::Skipped(subtype) => RelayResponse::ok(format!("processed {} event", subtype)),
        Terminal::Invalid(e) | Terminal::EnrichmentFailed(e) | Terminal::ForwardFailed(e) => {
            RelayResponse::from_error(e)
        }
        Terminal::Forwarded(reply) => match success {
            SuccessBody::Backend => RelayResponse::ok(reply.body_text()),
            SuccessBody::Ack(message) => RelayResponse::ok(message.clone()),
        },
        Terminal::Accepted => match success {
            SuccessBody::Ack(message) => RelayResponse::ok(message.clone()),
            SuccessBody::Backend => RelayResponse::ok(UNRECOGNIZED_MESSAGE),
        },
    }
}
