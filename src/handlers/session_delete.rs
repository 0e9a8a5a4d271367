use crate::{models::{ErrorResponse, SessionDeleteResponse}, AppState};
use axum::{extract::{Path, State}, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{error, info};

/// Drop a session and all its accumulated records
pub async fn session_delete(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<(StatusCode, Json<SessionDeleteResponse>), (StatusCode, Json<ErrorResponse>)> {
    if !app_state.insights.remove(&session_id).await {
        error!("Session '{}' not found", session_id);
        let status = StatusCode::NOT_FOUND;
        return Err((
            status,
            Json(ErrorResponse::new(format!(
                "Session '{}' not found",
                session_id
            ))),
        ));
    }

    info!("Session {} deleted", session_id);
    Ok((
        StatusCode::OK,
        Json(SessionDeleteResponse {
            status: "success".to_string(),
            message: format!("Session {} deleted successfully", session_id),
        }),
    ))
}
