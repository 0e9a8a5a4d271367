use crate::{
    models::{ErrorResponse, InsightTailQuery, RecordKind, SessionInsightsResponse},
    AppState,
};
use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{debug, error};

/// Recent analysis records and rollup for one session
pub async fn session_insights(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Query(query): Query<InsightTailQuery>,
) -> Result<(StatusCode, Json<SessionInsightsResponse>), (StatusCode, Json<ErrorResponse>)> {
    let Some(summary) = app_state.insights.summary(&session_id).await else {
        error!("Session '{}' not found", session_id);
        let status = StatusCode::NOT_FOUND;
        return Err((
            status,
            Json(ErrorResponse::new(format!(
                "Session '{}' not found",
                session_id
            ))),
        ));
    };

    let limit = query.limit.unwrap_or(app_state.config.insight_tail_limit);
    debug!(
        "Reading up to {} records per kind for session {} ({}, {} attached)",
        limit, summary.session_id, summary.session_type, summary.active_connections
    );
    let video_analyses = app_state.insights.tail(&session_id, RecordKind::Video, limit).await;
    let audio_analyses = app_state.insights.tail(&session_id, RecordKind::Audio, limit).await;
    let screen_analyses = app_state.insights.tail(&session_id, RecordKind::Screen, limit).await;

    Ok((
        StatusCode::OK,
        Json(SessionInsightsResponse {
            session_id,
            created_at: summary.created_at,
            total_analyses: summary.total_records(),
            video_analyses,
            audio_analyses,
            screen_analyses,
            summary: summary.rollup,
        }),
    ))
}
