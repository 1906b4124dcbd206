//! The relay pipeline
//!
//! transport → adapter → validator → classifier → (enricher) → forwarder
//! → notifier → response. Every stage returns a result and the first
//! failure ends the run.

use common::models::{ForwardResult, NotificationOutcome};
use common::{
    Config, Error, InboundEvent, NormalizedPayload, NotifyMode, SourceKind, SourceSettings,
    SuccessBody,
};
use relay::{BackendClient, ChatClient, ResultsClient};
use sources::{envelope, normalize, resolve, Detected, Expectations};
use tracing::{debug, error, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::classify::{classify, Classification};
use crate::notify::compose;
use crate::response::{build, RelayResponse, Terminal};

/// One parameterized pipeline serving every source
pub struct Pipeline {
    expectations: Expectations,
    form: SourceSettings,
    signature: SourceSettings,
    order_approval: SourceSettings,
    order_result: SourceSettings,
    backend: BackendClient,
    results: ResultsClient,
    chat: ChatClient,
    notify_mode: NotifyMode,
}

impl Pipeline {
    pub fn new(config: &Config) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    /// Share one connection pool across all outbound clients
    pub fn with_client(config: &Config, client: reqwest::Client) -> Self {
        Self {
            expectations: Expectations::from_config(config),
            form: config.form.clone(),
            signature: config.signature.clone(),
            order_approval: config.order_approval.clone(),
            order_result: config.order_result.clone(),
            backend: BackendClient::new(client.clone(), config.backend_credentials.clone()),
            results: ResultsClient::new(
                client.clone(),
                config.results_api.base_url.clone(),
                config.results_api.credentials.clone(),
            ),
            chat: ChatClient::new(client, config.chat_relay_url.clone()),
            notify_mode: config.notify_mode,
        }
    }

    pub fn settings(&self, kind: SourceKind) -> &SourceSettings {
        match kind {
            SourceKind::FormSubmission => &self.form,
            SourceKind::SignatureEvent => &self.signature,
            SourceKind::OrderApproval => &self.order_approval,
            SourceKind::OrderResult => &self.order_result,
        }
    }

    /// Run a direct HTTP invocation
    pub async fn run(&self, event: InboundEvent, pinned: Option<SourceKind>) -> RelayResponse {
        let invocation = Uuid::new_v4();
        let span = info_span!("relay", %invocation, source = ?pinned);
        async move {
            let response = self.execute(event, pinned).await;
            if response.is_success() {
                debug!("Responding {}", response.status);
            } else {
                warn!("Responding {}: {}", response.status, response.body);
            }
            response
        }
        .instrument(span)
        .await
    }

    /// Run a pub/sub delivery, unwrapping exactly one level first
    pub async fn run_relayed(&self, raw: &[u8], pinned: Option<SourceKind>) -> RelayResponse {
        match envelope::unwrap(raw) {
            Ok(event) => self.run(event, pinned).await,
            Err(e) => {
                warn!("Rejected pub/sub delivery: {}", e);
                RelayResponse::from_error(&e)
            }
        }
    }

    async fn execute(&self, event: InboundEvent, pinned: Option<SourceKind>) -> RelayResponse {
        let kind = match resolve(&event, pinned, &self.expectations) {
            Detected::Heartbeat => {
                info!("Received event with no body");
                return build(&Terminal::NoBody, &SuccessBody::Backend);
            }
            Detected::Unrecognized => {
                info!("No source recognized, acknowledging");
                return build(&Terminal::Unrecognized, &SuccessBody::Backend);
            }
            Detected::Source(kind) => kind,
        };

        let settings = self.settings(kind);
        let terminal = self.process(kind, &event, settings).await;
        build(&terminal, &settings.success_body)
    }

    async fn process(
        &self,
        kind: SourceKind,
        event: &InboundEvent,
        settings: &SourceSettings,
    ) -> Terminal {
        let mut payload = match normalize(kind, event, &self.expectations).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Rejected {}: {}", kind, e);
                return Terminal::Invalid(e);
            }
        };

        let enrich = match classify(&payload, settings) {
            Classification::SkipWithAck { subtype } => {
                info!("Skipping {} event {}", kind, subtype);
                return Terminal::Skipped(subtype);
            }
            Classification::Proceed { enrich } => enrich,
        };

        if enrich {
            if let Err(e) = self.enrich(&mut payload).await {
                error!("Enrichment failed: {}", e);
                return Terminal::EnrichmentFailed(e);
            }
        }

        let Some(destination) = settings.destination.as_deref() else {
            info!("No destination configured for {}, acknowledging", kind);
            return Terminal::Accepted;
        };

        let outcome = self.forward(destination, &payload).await;
        self.notify(&payload, &outcome).await;

        match outcome {
            Ok(reply) => Terminal::Forwarded(reply),
            Err(e) => Terminal::ForwardFailed(e),
        }
    }

    async fn enrich(&self, payload: &mut NormalizedPayload) -> Result<(), Error> {
        let order_id = payload.identifier().unwrap_or_default().to_string();
        info!("Requesting results data for order {}", order_id);

        let data = self
            .results
            .fetch_results(&order_id)
            .await
            .map_err(|e| Error::EnrichmentFailed {
                code: e.status().unwrap_or(500),
                detail: e.to_string(),
            })?;

        payload.attach_results(data);
        Ok(())
    }

    async fn forward(&self, destination: &str, payload: &NormalizedPayload) -> ForwardResult {
        let body = payload.forward_body()?;
        match self.backend.forward(destination, body).await {
            Ok(reply) => {
                info!("Backend accepted {} with {}", payload.kind(), reply.status);
                Ok(reply)
            }
            Err(e) => {
                error!("Forwarding {} failed: {}", payload.kind(), e);
                Err(Error::ForwardFailed {
                    code: e.status().unwrap_or(500),
                    detail: e.to_string(),
                })
            }
        }
    }

    /// Best effort. Nothing here reaches the caller.
    async fn notify(&self, payload: &NormalizedPayload, outcome: &ForwardResult) {
        if !self.chat.is_configured() {
            debug!("Chat relay not configured, skipping notification");
            return;
        }

        let text = compose(payload, outcome);
        match self.notify_mode {
            NotifyMode::Await => {
                let _ = deliver(&self.chat, &text).await;
            }
            NotifyMode::Detached => {
                let chat = self.chat.clone();
                tokio::spawn(
                    async move {
                        let _ = deliver(&chat, &text).await;
                    }
                    .instrument(Span::current()),
                );
            }
        }
    }
}

async fn deliver(chat: &ChatClient, text: &str) -> NotificationOutcome {
    debug!("Notification message: {}", text);
    match chat.post(text).await {
        Ok(()) => {
            info!("Chat notification sent");
            Ok(())
        }
        Err(e) => {
            let err = Error::NotificationFailed(e.to_string());
            warn!("{}", err);
            Err(err)
        }
    }
}
