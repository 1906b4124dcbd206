//! Event receiver: republishes direct calls onto a pub/sub topic

use common::{Config, InboundEvent};
use relay::TopicPublisher;
use sources::envelope;
use tracing::{error, info};

use crate::response::{RelayResponse, HEARTBEAT_MESSAGE};

const SUBJECT: &str = "message from events receiver";

pub struct EventReceiver {
    publisher: TopicPublisher,
}

impl EventReceiver {
    pub fn new(config: &Config, client: reqwest::Client) -> Self {
        Self {
            publisher: TopicPublisher::new(client, config.topic_url.clone()),
        }
    }

    pub async fn receive(&self, event: InboundEvent) -> RelayResponse {
        if event.body.is_none() {
            info!("Received event with no body");
            return RelayResponse::ok(HEARTBEAT_MESSAGE);
        }

        if !self.publisher.is_configured() {
            info!("No topic configured, nothing to publish");
            return RelayResponse::ok("Nothing to publish");
        }

        let envelope = match envelope::wrap(&event, SUBJECT) {
            Ok(envelope) => envelope,
            Err(e) => {
                error!("Failed to wrap event: {}", e);
                return RelayResponse::new(500, "Failed to publish");
            }
        };

        match self.publisher.publish(&envelope).await {
            Ok(()) => {
                info!("Event published");
                RelayResponse::ok("event published")
            }
            Err(e) => {
                error!("Failed to publish: {}", e);
                RelayResponse::new(500, "Failed to publish")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(topic_url: Option<String>) -> Config {
        Config::from_lookup(|key| match key {
            "TOPIC_URL" => topic_url.clone(),
            _ => None,
        })
    }

    fn event(body: Option<&str>) -> InboundEvent {
        InboundEvent::new(
            Vec::<(String, String)>::new(),
            body.map(|b| b.as_bytes().to_vec()),
            HashMap::new(),
        )
    }

    #[tokio::test]
    async fn test_no_body_is_acknowledged() {
        let receiver = EventReceiver::new(&config(None), reqwest::Client::new());
        assert_eq!(
            receiver.receive(event(None)).await,
            RelayResponse::ok(HEARTBEAT_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_without_topic_nothing_is_published() {
        let receiver = EventReceiver::new(&config(None), reqwest::Client::new());
        assert_eq!(
            receiver.receive(event(Some("{}"))).await,
            RelayResponse::ok("Nothing to publish")
        );
    }

    #[tokio::test]
    async fn test_publish_outcomes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let receiver = EventReceiver::new(&config(Some(server.uri())), reqwest::Client::new());
        assert_eq!(
            receiver.receive(event(Some("{}"))).await,
            RelayResponse::ok("event published")
        );
        assert_eq!(
            receiver.receive(event(Some("{}"))).await,
            RelayResponse::new(500, "Failed to publish")
        );
    }
}
