use crate::{models::RoomListResponse, AppState};
use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::debug;

/// List every active room with its participants
pub async fn room_list(State(app_state): State<Arc<AppState>>) -> Json<RoomListResponse> {
    let rooms = app_state.rooms.list().await;
    debug!("Listing {} active rooms", rooms.len());
    Json(RoomListResponse {
        total_rooms: rooms.len(),
        rooms,
    })
}
