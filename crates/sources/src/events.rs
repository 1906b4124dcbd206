//! Third-party payload shapes
//!
//! Only the fields the relay reads are modelled; everything else passes
//! through untouched in the raw body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Form provider webhook body
#[derive(Debug, Clone, Deserialize)]
pub struct FormEvent {
    pub event_id: Option<String>,
    pub event_type: Option<String>,
    pub form_response: FormResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormResponse {
    pub token: Option<String>,
    #[serde(default)]
    pub answers: Vec<FormAnswer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormAnswer {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub email: Option<String>,
}

impl FormEvent {
    /// First email answer, if the form collected one
    pub fn contact(&self) -> Option<String> {
        self.form_response
            .answers
            .iter()
            .find_map(|a| a.email.clone())
    }
}

/// E-signature provider callback, carried in a single multipart field
#[derive(Debug, Clone, Deserialize)]
pub struct SignatureCallback {
    pub event: SignatureCallbackEvent,
    pub signature_request: Option<SignatureRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignatureCallbackEvent {
    pub event_type: String,
    pub event_hash: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignatureRequest {
    pub signature_request_id: Option<String>,
    #[serde(default)]
    pub signatures: Vec<Signature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Signature {
    pub signer_email_address: Option<String>,
}

impl SignatureCallback {
    pub fn contact(&self) -> Option<String> {
        self.signature_request
            .as_ref()?
            .signatures
            .iter()
            .find_map(|s| s.signer_email_address.clone())
    }
}

/// Pub/sub delivery envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubSubEnvelope {
    #[serde(rename = "Records")]
    pub records: Vec<PubSubRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubSubRecord {
    #[serde(rename = "Sns")]
    pub sns: PubSubMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubSubMessage {
    /// JSON or base64 of JSON
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Subject", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "TopicArn", default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(rename = "Timestamp", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Copy of a direct HTTP call relayed through a topic
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayedEvent {
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(rename = "queryStringParameters", default)]
    pub query: Option<HashMap<String, String>>,
    #[serde(rename = "isBase64Encoded", default)]
    pub is_base64_encoded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_event_contact() {
        let event: FormEvent = serde_json::from_str(
            r#"{
                "event_id": "01H",
                "event_type": "form_response",
                "form_response": {
                    "form_id": "lT4Z3j",
                    "token": "a3a12ec67a1365927098a606107fac15",
                    "answers": [
                        {"type": "text", "text": "Laura"},
                        {"type": "email", "email": "laura@example.com"}
                    ]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(event.contact().as_deref(), Some("laura@example.com"));
        assert_eq!(
            event.form_response.token.as_deref(),
            Some("a3a12ec67a1365927098a606107fac15")
        );
    }

    #[test]
    fn test_signature_callback_without_request() {
        let callback: SignatureCallback = serde_json::from_str(
            r#"{"event": {"event_type": "callback_test", "event_time": "1348177752"}}"#,
        )
        .unwrap();
        assert_eq!(callback.event.event_type, "callback_test");
        assert!(callback.contact().is_none());
    }

    #[test]
    fn test_relayed_event_tolerates_null_maps() {
        let relayed: RelayedEvent = serde_json::from_str(
            r#"{"headers": null, "body": "{}", "queryStringParameters": null}"#,
        )
        .unwrap();
        assert!(relayed.headers.is_none());
        assert!(relayed.query.is_none());
        assert!(!relayed.is_base64_encoded);
    }
}
