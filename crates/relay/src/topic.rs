//! Publishes relayed events to a pub/sub topic endpoint

use sources::PubSubEnvelope;
use tracing::debug;

use crate::client::ClientError;

#[derive(Clone)]
pub struct TopicPublisher {
    client: reqwest::Client,
    url: Option<String>,
}

impl TopicPublisher {
    pub fn new(client: reqwest::Client, url: Option<String>) -> Self {
        Self { client, url }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    pub async fn publish(&self, envelope: &PubSubEnvelope) -> Result<(), ClientError> {
        let url = self
            .url
            .as_deref()
            .ok_or(ClientError::NotConfigured("topic"))?;

        debug!("Publishing {} record(s) to {}", envelope.records.len(), url);
        let resp = self.client.post(url).json(envelope).send().await?;

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
