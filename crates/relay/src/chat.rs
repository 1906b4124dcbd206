//! Chat-relay client for human-readable notifications

use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::debug;

use crate::client::ClientError;

#[derive(Serialize)]
struct ChatMessage<'a> {
    text: &'a str,
}

/// Posts text messages to a chat webhook
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    url: Option<String>,
}

impl ChatClient {
    pub fn new(client: reqwest::Client, url: Option<String>) -> Self {
        Self { client, url }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    pub async fn post(&self, text: &str) -> Result<(), ClientError> {
        let url = self
            .url
            .as_deref()
            .ok_or(ClientError::NotConfigured("chat relay"))?;

        debug!("Posting chat notification ({} chars)", text.len());
        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(&ChatMessage { text })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}
