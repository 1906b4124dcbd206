//! Pub/sub envelope unwrapping and wrapping
//!
//! A relayed event is unwrapped exactly one level: the envelope's single
//! record carries a message that is JSON, or base64 of JSON. That JSON is
//! either a copy of the original HTTP call or the bare body.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use common::{Error, InboundEvent, Result};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::events::{PubSubEnvelope, PubSubMessage, PubSubRecord, RelayedEvent};

/// Unwrap a pub/sub delivery into the event it carries
pub fn unwrap(raw: &[u8]) -> Result<InboundEvent> {
    let envelope: PubSubEnvelope = serde_json::from_slice(raw)
        .map_err(|e| Error::MalformedBody(format!("invalid pub/sub envelope: {}", e)))?;

    let record = match envelope.records.as_slice() {
        [record] => record,
        records => {
            return Err(Error::MalformedBody(format!(
                "expected exactly one pub/sub record, got {}",
                records.len()
            )))
        }
    };

    decode_message(&record.sns.message)
}

fn decode_message(message: &str) -> Result<InboundEvent> {
    if let Some(value) = parse_structured(message.as_bytes()) {
        debug!("Pub/sub message is plain JSON");
        return from_value(value, message.as_bytes());
    }

    let decoded = STANDARD
        .decode(message.trim())
        .map_err(|_| Error::MalformedBody("pub/sub message is neither JSON nor base64".into()))?;

    match parse_structured(&decoded) {
        Some(value) => {
            debug!("Pub/sub message is base64 JSON");
            from_value(value, &decoded)
        }
        None => Err(Error::MalformedBody(
            "decoded pub/sub message is not JSON".into(),
        )),
    }
}

/// Only objects, arrays and strings count; a base64 run can look like a
/// JSON number or literal.
fn parse_structured(bytes: &[u8]) -> Option<Value> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(v @ (Value::Object(_) | Value::Array(_) | Value::String(_))) => Some(v),
        _ => None,
    }
}

fn from_value(value: Value, raw: &[u8]) -> Result<InboundEvent> {
    let transport_copy = matches!(&value, Value::Object(map) if is_transport_copy(map));
    if transport_copy {
        let relayed: RelayedEvent = serde_json::from_value(value)
            .map_err(|e| Error::MalformedBody(format!("invalid relayed event: {}", e)))?;
        return relayed.into_inbound();
    }

    match value {
        Value::String(body) => Ok(json_body(body.into_bytes())),
        _ => Ok(json_body(raw.to_vec())),
    }
}

fn is_transport_copy(map: &serde_json::Map<String, Value>) -> bool {
    ["headers", "body", "queryStringParameters"]
        .iter()
        .any(|k| map.contains_key(*k))
}

fn json_body(body: Vec<u8>) -> InboundEvent {
    InboundEvent::new(
        vec![("content-type".to_string(), "application/json".to_string())],
        Some(body),
        HashMap::new(),
    )
}

impl RelayedEvent {
    pub fn into_inbound(self) -> Result<InboundEvent> {
        let body = match self.body {
            Some(body) if self.is_base64_encoded => Some(
                STANDARD
                    .decode(body.trim())
                    .map_err(|e| Error::MalformedBody(format!("invalid base64 body: {}", e)))?,
            ),
            Some(body) => Some(body.into_bytes()),
            None => None,
        };

        Ok(InboundEvent::new(
            self.headers.unwrap_or_default(),
            body,
            self.query.unwrap_or_default(),
        ))
    }

    pub fn from_inbound(event: &InboundEvent) -> Self {
        let (body, is_base64_encoded) = match &event.body {
            Some(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => (Some(text.to_string()), false),
                Err(_) => (Some(STANDARD.encode(bytes)), true),
            },
            None => (None, false),
        };

        Self {
            headers: Some(event.headers.clone()),
            body,
            query: Some(event.query.clone()),
            is_base64_encoded,
        }
    }
}

/// Wrap a direct call into a one-record envelope for publishing
pub fn wrap(event: &InboundEvent, subject: &str) -> Result<PubSubEnvelope> {
    let message = serde_json::to_string(&RelayedEvent::from_inbound(event))
        .map_err(|e| Error::MalformedBody(format!("failed to encode event: {}", e)))?;

    Ok(PubSubEnvelope {
        records: vec![PubSubRecord {
            sns: PubSubMessage {
                message,
                subject: Some(subject.to_string()),
                topic: None,
                timestamp: Some(Utc::now()),
            },
        }],
    })
}
