//! Source detection and payload normalization

use common::models::{
    FormSubmission, OrderApproval, OrderResult, SignatureEvent, ValidationOutcome,
};
use common::{Config, Error, InboundEvent, NormalizedPayload, Result, SourceKind};
use tracing::{debug, warn};

use crate::events::{FormEvent, SignatureCallback};
use crate::multipart::extract_field;
use crate::verify::{verify_enumerated, verify_header, verify_shared_secret};

/// Values inbound events are checked against
#[derive(Debug, Clone)]
pub struct Expectations {
    pub shared_secret: Option<String>,
    pub signature_user_agent: String,
    pub signature_mismatch_status: u16,
    pub accepted_order_statuses: Vec<String>,
    pub accepted_results: Vec<String>,
    pub accepted_result_completeness: Vec<String>,
    /// Sources that must present the shared secret
    pub token_required: Vec<SourceKind>,
}

impl Expectations {
    pub fn from_config(config: &Config) -> Self {
        let token_required = [
            (SourceKind::FormSubmission, config.form.require_token),
            (SourceKind::SignatureEvent, config.signature.require_token),
            (SourceKind::OrderApproval, config.order_approval.require_token),
            (SourceKind::OrderResult, config.order_result.require_token),
        ]
        .into_iter()
        .filter_map(|(kind, required)| required.then_some(kind))
        .collect();

        Self {
            shared_secret: config.shared_secret.clone(),
            signature_user_agent: config.signature_user_agent.clone(),
            signature_mismatch_status: config.signature_mismatch_status,
            accepted_order_statuses: config.accepted_order_statuses.clone(),
            accepted_results: config.accepted_results.clone(),
            accepted_result_completeness: config.accepted_result_completeness.clone(),
            token_required,
        }
    }

    fn check_token(&self, kind: SourceKind, event: &InboundEvent) -> Result<()> {
        if self.token_required.contains(&kind) {
            verify_shared_secret(event, self.shared_secret.as_deref())?;
        }
        Ok(())
    }
}

/// What the adapter found in an inbound event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detected {
    /// No body: acknowledge, do nothing
    Heartbeat,
    /// Nothing claims the event
    Unrecognized,
    Source(SourceKind),
}

/// Resolve the source kind, honouring a kind pinned by the route
pub fn resolve(event: &InboundEvent, pinned: Option<SourceKind>, expectations: &Expectations) -> Detected {
    match pinned {
        Some(kind) if !kind.is_query_driven() && event.body.is_none() => Detected::Heartbeat,
        Some(kind) => Detected::Source(kind),
        None => detect(event, expectations),
    }
}

/// Determine the source kind from the event's structure alone.
///
/// Checks run in a fixed order so no two kinds claim the same event.
pub fn detect(event: &InboundEvent, expectations: &Expectations) -> Detected {
    if event.query_param("result_complete").is_some() || event.query_param("result").is_some() {
        return Detected::Source(SourceKind::OrderResult);
    }
    if event.query_param("status").is_some() {
        return Detected::Source(SourceKind::OrderApproval);
    }

    let Some(body) = &event.body else {
        return Detected::Heartbeat;
    };

    if event.is_multipart()
        || event.header("user-agent") == Some(expectations.signature_user_agent.as_str())
    {
        return Detected::Source(SourceKind::SignatureEvent);
    }

    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) if value.get("form_response").is_some() => {
            Detected::Source(SourceKind::FormSubmission)
        }
        _ => {
            debug!("No source claims this event");
            Detected::Unrecognized
        }
    }
}

/// Validate an event of a known kind and build its payload
pub async fn normalize(
    kind: SourceKind,
    event: &InboundEvent,
    expectations: &Expectations,
) -> ValidationOutcome {
    match kind {
        SourceKind::FormSubmission => normalize_form(event, expectations),
        SourceKind::SignatureEvent => normalize_signature(event, expectations).await,
        SourceKind::OrderApproval => normalize_approval(event, expectations),
        SourceKind::OrderResult => normalize_result(event, expectations),
    }
}

fn require_body(event: &InboundEvent) -> Result<&[u8]> {
    event
        .body
        .as_deref()
        .ok_or_else(|| Error::MalformedBody("missing body".into()))
}

fn normalize_form(event: &InboundEvent, expectations: &Expectations) -> ValidationOutcome {
    expectations.check_token(SourceKind::FormSubmission, event)?;
    let body = require_body(event)?;

    let form: FormEvent = serde_json::from_slice(body).map_err(|e| {
        warn!("Failed to parse form submission: {}", e);
        Error::MalformedBody(format!("invalid form submission: {}", e))
    })?;

    Ok(NormalizedPayload::FormSubmission(FormSubmission {
        submission_id: form.form_response.token.clone().or(form.event_id.clone()),
        event_type: form.event_type.clone().unwrap_or_default(),
        contact: form.contact(),
        raw: body.to_vec(),
    }))
}

async fn normalize_signature(event: &InboundEvent, expectations: &Expectations) -> ValidationOutcome {
    verify_header(
        event,
        "user-agent",
        &expectations.signature_user_agent,
        expectations.signature_mismatch_status,
    )?;
    expectations.check_token(SourceKind::SignatureEvent, event)?;
    let body = require_body(event)?;

    let field = match event.content_type() {
        Some(content_type) if event.is_multipart() => {
            extract_field(content_type, body.to_vec()).await?
        }
        _ => body.to_vec(),
    };

    let callback: SignatureCallback = serde_json::from_slice(&field).map_err(|e| {
        warn!("Failed to parse signature callback: {}", e);
        Error::MalformedBody(format!("invalid signature callback: {}", e))
    })?;

    Ok(NormalizedPayload::SignatureEvent(SignatureEvent {
        signature_request_id: callback
            .signature_request
            .as_ref()
            .and_then(|r| r.signature_request_id.clone()),
        event_type: callback.event.event_type.clone(),
        event_hash: callback.event.event_hash.clone(),
        contact: callback.contact(),
        raw: field,
    }))
}

fn order_id(event: &InboundEvent) -> Result<String> {
    event
        .query_param("id")
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::validation("missing order id", 400))
}

fn normalize_approval(event: &InboundEvent, expectations: &Expectations) -> ValidationOutcome {
    expectations.check_token(SourceKind::OrderApproval, event)?;
    let status = verify_enumerated(
        "status",
        event.query_param("status"),
        &expectations.accepted_order_statuses,
    )?;
    let order_id = order_id(event)?;

    Ok(NormalizedPayload::OrderApproval(OrderApproval { order_id, status }))
}

fn normalize_result(event: &InboundEvent, expectations: &Expectations) -> ValidationOutcome {
    expectations.check_token(SourceKind::OrderResult, event)?;
    let result = verify_enumerated(
        "result",
        event.query_param("result"),
        &expectations.accepted_results,
    )?;
    let result_complete = verify_enumerated(
        "result_complete",
        event.query_param("result_complete"),
        &expectations.accepted_result_completeness,
    )?;
    let order_id = order_id(event)?;

    Ok(NormalizedPayload::OrderResult(OrderResult {
        order_id,
        result,
        result_complete,
        results_data: None,
    }))
}
