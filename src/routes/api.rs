use crate::handlers::{
    diagnostics, health_check, room_delete, room_detail, room_list, session_delete,
    session_insights, session_list,
};
use crate::AppState;
use axum::{routing::{delete, get}, Router};
use std::sync::Arc;

/// Create API routes
pub fn create_api_routes(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/diagnostics", get(diagnostics))
        .route("/rooms", get(room_list))
        .route("/rooms/:room_id", get(room_detail).delete(room_delete))
        .route("/sessions", get(session_list))
        .route("/sessions/:session_id", delete(session_delete))
        .route("/sessions/:session_id/insights", get(session_insights))
        .with_state(app_state)
}
