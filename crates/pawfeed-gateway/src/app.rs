use axum::{
    routing::{get, post},
    Router,
};
use pawfeed_core::PawfeedConfig;
use pawfeed_feeder::FeedCoordinator;
use pawfeed_hardware::HopperSensor;
use pawfeed_store::FeedStore;
use pawfeed_tasks::TaskManager;
use std::sync::Arc;

/// Central shared state, passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: PawfeedConfig,
    pub store: Arc<FeedStore>,
    pub coordinator: Arc<FeedCoordinator>,
    pub tasks: Arc<TaskManager>,
    pub hopper: Option<Arc<dyn HopperSensor>>,
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/api/feed", post(crate::http::feeds::manual_feed))
        .route("/api/feedings", get(crate::http::feeds::list_feedings))
        .route("/api/feedings/last", get(crate::http::feeds::last_feeding))
        .route(
            "/api/feed-times",
            get(crate::http::schedule::list_feed_times)
                .post(crate::http::schedule::add_feed_time)
                .delete(crate::http::schedule::delete_feed_time),
        )
        .route("/api/hopper", get(crate::http::status::hopper_level))
        .route("/api/tasks", get(crate::http::status::list_tasks))
        .route("/api/tasks/{name}", get(crate::http::status::task_status))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
