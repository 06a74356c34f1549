use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use pawfeed_store::{ScheduleKind, StoreError};

use crate::app::AppState;

#[derive(Debug, Deserialize)]
pub struct AddFeedTimeRequest {
    /// `HH:MM`, 24-hour.
    pub time: String,
    pub kind: ScheduleKind,
    pub size: u32,
}

#[derive(Debug, Deserialize)]
pub struct DeleteFeedTimeRequest {
    pub time: String,
}

/// GET /api/feed-times — all scheduled feed times, ascending.
pub async fn list_feed_times(State(state): State<Arc<AppState>>) -> Response {
    match state.store.list_feed_times() {
        Ok(entries) => Json(json!({ "feed_times": entries })).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// POST /api/feed-times — add a scheduled feed time.
pub async fn add_feed_time(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddFeedTimeRequest>,
) -> Response {
    match state.store.add_feed_time(&req.time, req.kind, req.size) {
        Ok(entry) => Json(json!({ "feed_time": entry })).into_response(),
        Err(StoreError::InvalidEntry(msg)) => (StatusCode::BAD_REQUEST, msg).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// DELETE /api/feed-times — remove the first entry at the given time.
pub async fn delete_feed_time(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteFeedTimeRequest>,
) -> Response {
    match state.store.delete_feed_time_at(&req.time) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(StoreError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
