//! Chat notification templates

use common::models::ForwardResult;
use common::NormalizedPayload;

/// Status and body the backend produced, or the failure in its place
fn backend_summary(outcome: &ForwardResult) -> (u16, String) {
    match outcome {
        Ok(reply) => (reply.status, reply.body_text()),
        Err(e) => (e.status_code(), e.to_string()),
    }
}

/// Compose the chat message for a forwarded event
pub fn compose(payload: &NormalizedPayload, outcome: &ForwardResult) -> String {
    let (status, body) = backend_summary(outcome);
    let returned = format!(
        "Backend returned {}: \"{}\", and sent proper callback.",
        status,
        body.replace('.', "")
    );

    match payload {
        NormalizedPayload::FormSubmission(form) => format!(
            "Form submission received: ```event type: {}\nsubmission id: {}\ncontact: {}\n{}``` ",
            form.event_type,
            form.submission_id.as_deref().unwrap_or("-"),
            form.contact.as_deref().unwrap_or("-"),
            returned
        ),
        NormalizedPayload::SignatureEvent(event) => format!(
            "Signature event received: ```event type: {}\nevent hash: {}\nsignature request id: {}\n{}``` ",
            event.event_type,
            event.event_hash.as_deref().unwrap_or("-"),
            event.signature_request_id.as_deref().unwrap_or("-"),
            returned
        ),
        NormalizedPayload::OrderApproval(order) => format!(
            "Order event received: ```type: order approval\norder ID: {}\norder status: {}\n{}``` ",
            order.order_id, order.status, returned
        ),
        NormalizedPayload::OrderResult(order) => format!(
            "Order results received for order *{}* ({}, {}). Returned {}: \"{}\".",
            order.order_id, order.result, order.result_complete, status, body
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::{BackendReply, OrderApproval, OrderResult};
    use common::Error;
    use serde_json::json;

    #[test]
    fn test_approval_message_includes_backend_status() {
        let payload = NormalizedPayload::OrderApproval(OrderApproval {
            order_id: "A-7".to_string(),
            status: "approved".to_string(),
        });
        let outcome = Ok(BackendReply {
            status: 200,
            body: json!("updated"),
        });

        let text = compose(&payload, &outcome);
        assert!(text.contains("order ID: A-7"));
        assert!(text.contains("order status: approved"));
        assert!(text.contains("Backend returned 200: \"updated\", and sent proper callback."));
    }

    #[test]
    fn test_forwarded_body_loses_periods() {
        let payload = NormalizedPayload::OrderApproval(OrderApproval {
            order_id: "A-8".to_string(),
            status: "rejected".to_string(),
        });
        let outcome = Ok(BackendReply {
            status: 200,
            body: json!("Order A-8 updated. See example.com."),
        });

        let text = compose(&payload, &outcome);
        assert!(text.contains("Backend returned 200: \"Order A-8 updated See examplecom\""));
    }

    #[test]
    fn test_result_message_reports_failure() {
        let payload = NormalizedPayload::OrderResult(OrderResult {
            order_id: "R-1".to_string(),
            result: "released".to_string(),
            result_complete: "incomplete".to_string(),
            results_data: None,
        });
        let outcome = Err(Error::ForwardFailed {
            detail: "connection refused".to_string(),
            code: 500,
        });

        assert_eq!(
            compose(&payload, &outcome),
            "Order results received for order *R-1* (released, incomplete). Returned 500: \"connection refused\"."
        );
    }
}
