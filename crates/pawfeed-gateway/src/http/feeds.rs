use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use pawfeed_feeder::FeedError;
use pawfeed_store::FeedKind;

use crate::app::AppState;

#[derive(Debug, Deserialize)]
pub struct ManualFeedRequest {
    pub size: u32,
}

/// POST /api/feed — trigger a manual feed.
pub async fn manual_feed(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ManualFeedRequest>,
) -> Response {
    if !state.coordinator.has_dispenser() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "dispenser not configured or not found",
        )
            .into_response();
    }
    match state.coordinator.trigger_feed(req.size, FeedKind::Manual) {
        Ok(event) => Json(json!({ "feeding": event })).into_response(),
        Err(FeedError::FeedInProgress) => {
            (StatusCode::CONFLICT, "feed already in progress").into_response()
        }
        Err(FeedError::InvalidSize) => {
            (StatusCode::BAD_REQUEST, "size must be positive").into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// GET /api/feedings — full feeding history, most recent first.
pub async fn list_feedings(State(state): State<Arc<AppState>>) -> Response {
    match state.store.list_feedings() {
        Ok(events) => Json(json!({ "feedings": events })).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// GET /api/feedings/last — the most recent feeding, if any.
pub async fn last_feeding(State(state): State<Arc<AppState>>) -> Response {
    match state.store.last_feeding() {
        Ok(event) => Json(json!({ "last_feed": event })).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
