use crate::{models::{ErrorResponse, RoomDeleteResponse, ServerMessage}, AppState};
use axum::{extract::{Path, State}, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{error, info};

/// Force-delete a room, notifying and evicting every member
pub async fn room_delete(
    State(app_state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<(StatusCode, Json<RoomDeleteResponse>), (StatusCode, Json<ErrorResponse>)> {
    let Some(members) = app_state.rooms.remove_room(&room_id).await else {
        error!("Room '{}' not found", room_id);
        let status = StatusCode::NOT_FOUND;
        return Err((
            status,
            Json(ErrorResponse::new(format!("Room '{}' not found", room_id))),
        ));
    };

    // Members learn about the eviction; a dead connection just misses it
    let notice = ServerMessage::RoomDeleted {
        message: "Room has been deleted".to_string(),
    };
    for member in &members {
        let _ = member.send(notice.clone());
    }
    info!("Room {} deleted, {} members evicted", room_id, members.len());

    Ok((
        StatusCode::OK,
        Json(RoomDeleteResponse {
            message: format!("Room {} deleted successfully", room_id),
        }),
    ))
}
