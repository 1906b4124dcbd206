//! API routes

pub mod events;
pub mod health;
pub mod pubsub;
pub mod webhooks;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/webhooks", get(webhooks::detect).post(webhooks::detect))
        .route(
            "/webhooks/:source",
            get(webhooks::pinned).post(webhooks::pinned),
        )
        .route("/pubsub", post(pubsub::detect))
        .route("/pubsub/:source", post(pubsub::pinned))
        .route("/events", post(events::receive))
        .with_state(state)
}
