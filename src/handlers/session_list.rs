use crate::{models::SessionListResponse, AppState};
use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::debug;

/// List every known insight session
pub async fn session_list(State(app_state): State<Arc<AppState>>) -> Json<SessionListResponse> {
    let sessions = app_state.insights.list().await;
    debug!("Listing {} insight sessions", sessions.len());
    Json(SessionListResponse {
        total_sessions: sessions.len(),
        sessions,
    })
}
