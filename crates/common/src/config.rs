//! Application configuration

use std::env;

/// How the chat notification is scheduled relative to the response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyMode {
    /// Wait for the chat post before responding
    Await,
    /// Spawn the chat post and respond immediately
    Detached,
}

/// What a successful forward returns to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuccessBody {
    /// The backend's response body, verbatim
    Backend,
    /// A fixed acknowledgment string
    Ack(String),
}

/// Per-source relay settings
#[derive(Debug, Clone)]
pub struct SourceSettings {
    /// Backend endpoint; `None` acknowledges without forwarding
    pub destination: Option<String>,
    /// Event subtypes worth acting on; `None` lets every subtype through
    pub allowed_subtypes: Option<Vec<String>>,
    /// Whether the shared secret must be presented
    pub require_token: bool,
    pub success_body: SuccessBody,
}

/// Basic-auth credential pair
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Lab results API used to enrich complete order results
#[derive(Debug, Clone, Default)]
pub struct ResultsApiConfig {
    pub base_url: Option<String>,
    pub credentials: Credentials,
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend_credentials: Credentials,
    pub shared_secret: Option<String>,
    pub chat_relay_url: Option<String>,
    pub notify_mode: NotifyMode,
    pub topic_url: Option<String>,
    pub results_api: ResultsApiConfig,
    pub signature_user_agent: String,
    /// Status returned when the signature provider's header is wrong
    pub signature_mismatch_status: u16,
    pub accepted_order_statuses: Vec<String>,
    pub accepted_results: Vec<String>,
    pub accepted_result_completeness: Vec<String>,
    pub form: SourceSettings,
    pub signature: SourceSettings,
    pub order_approval: SourceSettings,
    pub order_result: SourceSettings,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let list = |key: &str, default: &[&str]| {
            var(key)
                .map(|v| split_list(&v))
                .unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect())
        };
        let flag = |key: &str| {
            var(key)
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false)
        };
        let success_body = |prefix: &str, default: SuccessBody| {
            var(&format!("{}_ACK_MESSAGE", prefix))
                .map(SuccessBody::Ack)
                .unwrap_or(default)
        };

        Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT").and_then(|p| p.parse().ok()).unwrap_or(3000),
            backend_credentials: Credentials {
                username: var("BACKEND_USERNAME").unwrap_or_default(),
                password: var("BACKEND_PASSWORD").unwrap_or_default(),
            },
            shared_secret: var("SHARED_SECRET"),
            chat_relay_url: var("CHAT_RELAY_URL"),
            notify_mode: match var("CHAT_NOTIFY_MODE").as_deref() {
                Some("detached") => NotifyMode::Detached,
                _ => NotifyMode::Await,
            },
            topic_url: var("TOPIC_URL"),
            results_api: ResultsApiConfig {
                base_url: var("RESULTS_API_URL"),
                credentials: Credentials {
                    username: var("RESULTS_API_KEY").unwrap_or_default(),
                    password: var("RESULTS_API_TOKEN").unwrap_or_default(),
                },
            },
            signature_user_agent: var("SIGNATURE_USER_AGENT")
                .unwrap_or_else(|| "HelloSign API".to_string()),
            signature_mismatch_status: var("SIGNATURE_MISMATCH_STATUS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(404),
            accepted_order_statuses: list("ACCEPTED_ORDER_STATUSES", &["approved", "rejected"]),
            accepted_results: list("ACCEPTED_RESULTS", &["released", "normal"]),
            accepted_result_completeness: list(
                "ACCEPTED_RESULT_COMPLETENESS",
                &["incomplete", "complete"],
            ),
            form: SourceSettings {
                destination: var("FORM_SUBMISSION_URL"),
                allowed_subtypes: Some(list("FORM_EVENT_TYPES", &["form_response"])),
                require_token: flag("FORM_REQUIRE_TOKEN"),
                success_body: success_body(
                    "FORM_SUBMISSION",
                    SuccessBody::Ack("Typeform Submission Received".to_string()),
                ),
            },
            signature: SourceSettings {
                destination: var("SIGNATURE_EVENT_URL"),
                allowed_subtypes: Some(list(
                    "SIGNATURE_EVENT_TYPES",
                    &["signature_request_sent", "signature_request_signed"],
                )),
                require_token: flag("SIGNATURE_REQUIRE_TOKEN"),
                success_body: success_body("SIGNATURE_EVENT", SuccessBody::Backend),
            },
            order_approval: SourceSettings {
                destination: var("ORDER_APPROVAL_URL"),
                allowed_subtypes: None,
                require_token: true,
                success_body: success_body("ORDER_APPROVAL", SuccessBody::Backend),
            },
            order_result: SourceSettings {
                destination: var("ORDER_RESULT_URL"),
                allowed_subtypes: None,
                require_token: true,
                success_body: success_body("ORDER_RESULT", SuccessBody::Backend),
            },
        }
    }
}

/// Split a comma-separated list, lowercasing each entry
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.signature_user_agent, "HelloSign API");
        assert_eq!(config.signature_mismatch_status, 404);
        assert_eq!(config.notify_mode, NotifyMode::Await);
        assert!(config.shared_secret.is_none());
        assert_eq!(config.accepted_order_statuses, vec!["approved", "rejected"]);
        assert_eq!(
            config.form.success_body,
            SuccessBody::Ack("Typeform Submission Received".to_string())
        );
        assert_eq!(config.signature.success_body, SuccessBody::Backend);
        assert!(config.order_result.require_token);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("CHAT_NOTIFY_MODE", "detached"),
            ("SIGNATURE_EVENT_TYPES", "Signature_Request_All_Signed, callback_test"),
            ("SIGNATURE_MISMATCH_STATUS", "401"),
            ("ORDER_APPROVAL_ACK_MESSAGE", "ok"),
            ("FORM_REQUIRE_TOKEN", "true"),
            ("SHARED_SECRET", "  "),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.notify_mode, NotifyMode::Detached);
        assert_eq!(
            config.signature.allowed_subtypes,
            Some(vec![
                "signature_request_all_signed".to_string(),
                "callback_test".to_string()
            ])
        );
        assert_eq!(config.signature_mismatch_status, 401);
        assert_eq!(
            config.order_approval.success_body,
            SuccessBody::Ack("ok".to_string())
        );
        assert!(config.form.require_token);
        assert!(config.shared_secret.is_none());
    }
}
