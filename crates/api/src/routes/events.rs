//! Event receiver route

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
};
use std::collections::HashMap;
use std::sync::Arc;

use super::webhooks::inbound_event;
use crate::reply::Reply;
use crate::state::AppState;

pub async fn receive(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Reply {
    let event = inbound_event(&headers, query, body);
    Reply(state.receiver.receive(event).await)
}
