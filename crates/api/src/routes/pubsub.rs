//! Relayed pub/sub delivery routes

use axum::{
    body::Bytes,
    extract::{Path, State},
};
use std::sync::Arc;

use super::webhooks::pinned_source;
use crate::error::ApiResult;
use crate::reply::Reply;
use crate::state::AppState;

pub async fn detect(State(state): State<Arc<AppState>>, body: Bytes) -> Reply {
    Reply(state.pipeline.run_relayed(&body, None).await)
}

pub async fn pinned(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
    body: Bytes,
) -> ApiResult<Reply> {
    let kind = pinned_source(&source)?;
    Ok(Reply(state.pipeline.run_relayed(&body, Some(kind)).await))
}
