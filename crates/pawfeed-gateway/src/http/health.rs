use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health — liveness probe, returns server metadata.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "feed_in_progress": state.coordinator.is_feed_in_progress(),
        "tasks": state.tasks.list_tasks().len(),
        "hardware": {
            "display": state.config.hardware.display,
            "dispenser": state.config.hardware.dispenser,
            "hopper": state.config.hardware.hopper,
        },
    }))
}
