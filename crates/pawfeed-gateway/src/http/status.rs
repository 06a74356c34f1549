use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::app::AppState;

/// GET /api/hopper — hopper fill level, rounded to the nearest 20 %.
pub async fn hopper_level(State(state): State<Arc<AppState>>) -> Response {
    let Some(sensor) = &state.hopper else {
        return (StatusCode::SERVICE_UNAVAILABLE, "sensor not available").into_response();
    };
    match sensor.level_percent() {
        Ok(percent) => {
            let rounded = (percent / 20.0).round() * 20.0;
            Json(json!({ "level_percent": rounded })).into_response()
        }
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// GET /api/tasks — snapshots of every background task.
pub async fn list_tasks(State(state): State<Arc<AppState>>) -> Response {
    Json(json!({ "tasks": state.tasks.list_tasks() })).into_response()
}

/// GET /api/tasks/{name} — snapshot of one background task.
pub async fn task_status(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    match state.tasks.require_task(&name) {
        Ok(snapshot) => Json(json!({ "task": snapshot })).into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}
