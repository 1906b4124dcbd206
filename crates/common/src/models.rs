//! Domain models

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// The raw call as handed over by the transport. Header keys are lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundEvent {
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
    pub query: HashMap<String, String>,
}

impl InboundEvent {
    /// An empty body is treated as absent
    pub fn new(
        headers: impl IntoIterator<Item = (String, String)>,
        body: Option<Vec<u8>>,
        query: HashMap<String, String>,
    ) -> Self {
        Self {
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v))
                .collect(),
            body: body.filter(|b| !b.is_empty()),
            query,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn is_multipart(&self) -> bool {
        self.content_type()
            .map(|ct| ct.to_ascii_lowercase().starts_with("multipart/"))
            .unwrap_or(false)
    }
}

/// Supported webhook sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    FormSubmission,
    SignatureEvent,
    OrderApproval,
    OrderResult,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::FormSubmission,
        SourceKind::SignatureEvent,
        SourceKind::OrderApproval,
        SourceKind::OrderResult,
    ];

    /// Path segment used by the pinned routes
    pub fn slug(&self) -> &'static str {
        match self {
            SourceKind::FormSubmission => "typeform",
            SourceKind::SignatureEvent => "hellosign",
            SourceKind::OrderApproval => "pwn-approval",
            SourceKind::OrderResult => "pwn-results",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }

    /// Query-driven sources never carry a body
    pub fn is_query_driven(&self) -> bool {
        matches!(self, SourceKind::OrderApproval | SourceKind::OrderResult)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SourceKind::FormSubmission => "form submission",
            SourceKind::SignatureEvent => "signature event",
            SourceKind::OrderApproval => "order approval",
            SourceKind::OrderResult => "order result",
        };
        f.write_str(label)
    }
}

/// A form provider submission. `raw` is forwarded untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    pub submission_id: Option<String>,
    pub event_type: String,
    pub contact: Option<String>,
    pub raw: Vec<u8>,
}

/// An e-signature callback. `raw` is the multipart field text.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureEvent {
    pub signature_request_id: Option<String>,
    pub event_type: String,
    pub event_hash: Option<String>,
    pub contact: Option<String>,
    pub raw: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderApproval {
    #[serde(rename = "orderId")]
    pub order_id: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderResult {
    #[serde(rename = "orderId")]
    pub order_id: String,
    pub result: String,
    pub result_complete: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_data: Option<Value>,
}

impl OrderResult {
    pub fn is_complete(&self) -> bool {
        self.result_complete == "complete"
    }
}

/// The business-meaningful event extracted from an [`InboundEvent`]
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedPayload {
    FormSubmission(FormSubmission),
    SignatureEvent(SignatureEvent),
    OrderApproval(OrderApproval),
    OrderResult(OrderResult),
}

impl NormalizedPayload {
    pub fn kind(&self) -> SourceKind {
        match self {
            NormalizedPayload::FormSubmission(_) => SourceKind::FormSubmission,
            NormalizedPayload::SignatureEvent(_) => SourceKind::SignatureEvent,
            NormalizedPayload::OrderApproval(_) => SourceKind::OrderApproval,
            NormalizedPayload::OrderResult(_) => SourceKind::OrderResult,
        }
    }

    /// Event subtype tag the classifier filters on
    pub fn subtype(&self) -> &str {
        match self {
            NormalizedPayload::FormSubmission(e) => &e.event_type,
            NormalizedPayload::SignatureEvent(e) => &e.event_type,
            NormalizedPayload::OrderApproval(_) => "order_approval",
            NormalizedPayload::OrderResult(_) => "order_result",
        }
    }

    pub fn identifier(&self) -> Option<&str> {
        match self {
            NormalizedPayload::FormSubmission(e) => e.submission_id.as_deref(),
            NormalizedPayload::SignatureEvent(e) => e.signature_request_id.as_deref(),
            NormalizedPayload::OrderApproval(e) => Some(&e.order_id),
            NormalizedPayload::OrderResult(e) => Some(&e.order_id),
        }
    }

    /// Attach supplementary results. Only order results carry them.
    pub fn attach_results(&mut self, data: Value) {
        if let NormalizedPayload::OrderResult(result) = self {
            result.results_data = Some(data);
        }
    }

    /// Bytes sent to the backend
    pub fn forward_body(&self) -> Result<Vec<u8>> {
        let encoded = match self {
            NormalizedPayload::FormSubmission(e) => return Ok(e.raw.clone()),
            NormalizedPayload::SignatureEvent(e) => return Ok(e.raw.clone()),
            NormalizedPayload::OrderApproval(e) => serde_json::to_vec(e),
            NormalizedPayload::OrderResult(e) => serde_json::to_vec(e),
        };
        encoded.map_err(|e| Error::ForwardFailed {
            detail: format!("failed to encode payload: {}", e),
            code: 500,
        })
    }
}

/// Backend reply to a successful forward
#[derive(Debug, Clone, PartialEq)]
pub struct BackendReply {
    pub status: u16,
    /// Parsed JSON when possible, otherwise the raw text as a string
    pub body: Value,
}

impl BackendReply {
    /// Body as the caller sees it: strings verbatim, structures as JSON
    pub fn body_text(&self) -> String {
        match &self.body {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

pub type ValidationOutcome = Result<NormalizedPayload>;
pub type ForwardResult = Result<BackendReply>;
/// Attempted, logged, then dropped
pub type NotificationOutcome = Result<()>;
