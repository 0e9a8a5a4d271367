use crate::{models::{ErrorResponse, RoomSummary}, AppState};
use axum::{extract::{Path, State}, http::StatusCode, Json};
use std::sync::Arc;
use tracing::error;

/// Membership snapshot of one room
pub async fn room_detail(
    State(app_state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<(StatusCode, Json<RoomSummary>), (StatusCode, Json<ErrorResponse>)> {
    match app_state.rooms.overview(&room_id).await {
        Some(summary) => Ok((StatusCode::OK, Json(summary))),
        None => {
            error!("Room '{}' not found", room_id);
            let status = StatusCode::NOT_FOUND;
            Err((
                status,
                Json(ErrorResponse::new(format!("Room '{}' not found", room_id))),
            ))
        }
    }
}
