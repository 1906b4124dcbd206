//! Authenticated HTTP client for the backend data store and the results API

use common::models::BackendReply;
use common::Credentials;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::xml;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{status} - {message}")]
    Api { status: u16, message: String },
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Upstream status code, when there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            ClientError::Api { status, .. } => Some(*status),
            ClientError::NotConfigured(_) | ClientError::InvalidUrl(_) => None,
        }
    }
}

/// Parse a response body as JSON, then as XML, keeping it as text when it
/// is neither
pub(crate) fn parse_body(text: String) -> Value {
    if let Ok(value) = serde_json::from_str(&text) {
        return value;
    }
    xml::to_json(&text).unwrap_or(Value::String(text))
}

async fn read_reply(resp: reqwest::Response) -> Result<BackendReply, ClientError> {
    let status = resp.status();
    let text = resp.text().await?;
    if !status.is_success() {
        return Err(ClientError::Api {
            status: status.as_u16(),
            message: text,
        });
    }

    Ok(BackendReply {
        status: status.as_u16(),
        body: parse_body(text),
    })
}

/// Client that sends every request with a basic-auth credential pair
#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    credentials: Credentials,
}

impl BackendClient {
    pub fn new(client: reqwest::Client, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
        }
    }

    /// POST a JSON body and return the parsed reply
    pub async fn forward(&self, url: &str, body: Vec<u8>) -> Result<BackendReply, ClientError> {
        debug!("POST {} ({} bytes)", url, body.len());
        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .body(body)
            .send()
            .await?;

        read_reply(resp).await
    }

    /// GET a resource and return its parsed body
    pub async fn fetch(&self, url: &str) -> Result<Value, ClientError> {
        debug!("GET {}", url);
        let resp = self
            .client
            .get(url)
            .header(ACCEPT, "application/json, application/xml;q=0.9")
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await?;

        Ok(read_reply(resp).await?.body)
    }
}

/// Lab results API used to enrich complete order results
#[derive(Clone)]
pub struct ResultsClient {
    inner: BackendClient,
    base_url: Option<String>,
}

impl ResultsClient {
    pub fn new(client: reqwest::Client, base_url: Option<String>, credentials: Credentials) -> Self {
        Self {
            inner: BackendClient::new(client, credentials),
            base_url,
        }
    }

    /// Fetch reconciled results for an order
    pub async fn fetch_results(&self, order_id: &str) -> Result<Value, ClientError> {
        let base = self
            .base_url
            .as_deref()
            .ok_or(ClientError::NotConfigured("results API"))?;
        let mut url = Url::parse(base).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(base.to_string()))?
            .pop_if_empty()
            .extend(["customers", order_id]);
        url.query_pairs_mut()
            .append_pair("include", "reconciled_results");

        self.inner.fetch(url.as_str()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> Credentials {
        Credentials {
            username: "user".to_string(),
            password: "pass".to_string(),
        }
    }

    #[tokio::test]
    async fn test_forward_sends_basic_auth_and_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/appdata/submissions"))
            .and(header("authorization", "Basic dXNlcjpwYXNz"))
            .and(header("content-type", "application/json"))
            .and(body_string(r#"{"a": 1}"#))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": "x1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(reqwest::Client::new(), credentials());
        let reply = client
            .forward(
                &format!("{}/appdata/submissions", server.uri()),
                br#"{"a": 1}"#.to_vec(),
            )
            .await
            .unwrap();

        assert_eq!(reply.status, 201);
        assert_eq!(reply.body, json!({"_id": "x1"}));
    }

    #[tokio::test]
    async fn test_forward_non_2xx_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = BackendClient::new(reqwest::Client::new(), credentials());
        let err = client.forward(&server.uri(), b"{}".to_vec()).await.unwrap_err();

        assert_eq!(err.status(), Some(403));
        assert_eq!(err.to_string(), "403 - forbidden");
    }

    #[tokio::test]
    async fn test_fetch_results_builds_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lab/customers/42"))
            .and(query_param("include", "reconciled_results"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"panel": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ResultsClient::new(
            reqwest::Client::new(),
            Some(format!("{}/lab/", server.uri())),
            credentials(),
        );
        let data = client.fetch_results("42").await.unwrap();
        assert_eq!(data, json!({"panel": "ok"}));
    }

    #[tokio::test]
    async fn test_fetch_results_converts_xml() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customers/42"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<customer><result>ok</result></customer>", "application/xml"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = ResultsClient::new(reqwest::Client::new(), Some(server.uri()), credentials());
        let data = client.fetch_results("42").await.unwrap();
        assert_eq!(data, json!({"customer": {"result": "ok"}}));
    }

    #[tokio::test]
    async fn test_fetch_results_escapes_order_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("plain"))
            .expect(1)
            .mount(&server)
            .await;

        let client = ResultsClient::new(reqwest::Client::new(), Some(server.uri()), credentials());
        let data = client
            .fetch_results("../admin/users?include=everything#")
            .await
            .unwrap();
        assert_eq!(data, json!("plain"));

        let received = server.received_requests().await.unwrap();
        let url = &received[0].url;
        let segments: Vec<&str> = url.path_segments().unwrap().collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], "customers");
        assert!(!url.path().contains("/admin/"));
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            query,
            vec![("include".to_string(), "reconciled_results".to_string())]
        );
        assert!(url.fragment().is_none());
    }

    #[tokio::test]
    async fn test_fetch_results_rejects_bad_base() {
        let client = ResultsClient::new(reqwest::Client::new(), Some("not a url".into()), credentials());
        let err = client.fetch_results("42").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_fetch_results_unconfigured() {
        let client = ResultsClient::new(reqwest::Client::new(), None, credentials());
        let err = client.fetch_results("42").await.unwrap_err();
        assert!(matches!(err, ClientError::NotConfigured(_)));
        assert_eq!(err.status(), None);
    }
}
