//! Direct webhook routes

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use common::{InboundEvent, SourceKind};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::reply::Reply;
use crate::state::AppState;

/// Build the pipeline's view of an HTTP call
pub fn inbound_event(headers: &HeaderMap, query: HashMap<String, String>, body: Bytes) -> InboundEvent {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect::<Vec<_>>();

    InboundEvent::new(headers, Some(body.to_vec()), query)
}

pub fn pinned_source(source: &str) -> ApiResult<SourceKind> {
    SourceKind::from_slug(source).ok_or_else(|| {
        warn!("Webhook for unknown source {}", source);
        ApiError::UnknownSource(source.to_string())
    })
}

/// Source detected from the event's structure
pub async fn detect(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Reply {
    let event = inbound_event(&headers, query, body);
    Reply(state.pipeline.run(event, None).await)
}

/// Source named by the path
pub async fn pinned(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Reply> {
    let kind = pinned_source(&source)?;
    let event = inbound_event(&headers, query, body);
    Ok(Reply(state.pipeline.run(event, Some(kind)).await))
}
