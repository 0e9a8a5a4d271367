use utoipa::OpenApi;

use crate::models::{
    AnalysisRecord, DiagnosticsResponse, ErrorResponse, HealthResponse, RecordKind,
    RoomDeleteResponse, RoomListResponse, RoomSummary, SessionDeleteResponse,
    SessionInsightsResponse, SessionListResponse, SessionSummary,
};

/// Health check endpoint documentation
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Diagnostics endpoint documentation
#[utoipa::path(
    get,
    path = "/api/diagnostics",
    responses(
        (status = 200, description = "Connection, room, session and system stats", body = DiagnosticsResponse)
    ),
    tag = "diagnostics"
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

/// Room list endpoint documentation
#[utoipa::path(
    get,
    path = "/api/rooms",
    responses(
        (status = 200, description = "All active rooms with their participants", body = RoomListResponse)
    ),
    tag = "rooms"
)]
#[allow(dead_code)]
pub async fn room_list_doc() {}

/// Room detail endpoint documentation
#[utoipa::path(
    get,
    path = "/api/rooms/{room_id}",
    params(
        ("room_id" = String, Path, description = "Room identifier")
    ),
    responses(
        (status = 200, description = "Membership snapshot of the room", body = RoomSummary),
        (status = 404, description = "Room not found", body = ErrorResponse)
    ),
    tag = "rooms"
)]
#[allow(dead_code)]
pub async fn room_detail_doc() {}

/// Room delete endpoint documentation
#[utoipa::path(
    delete,
    path = "/api/rooms/{room_id}",
    params(
        ("room_id" = String, Path, description = "Room identifier")
    ),
    responses(
        (status = 200, description = "Room deleted and members evicted", body = RoomDeleteResponse),
        (status = 404, description = "Room not found", body = ErrorResponse)
    ),
    tag = "rooms"
)]
#[allow(dead_code)]
pub async fn room_delete_doc() {}

/// Session list endpoint documentation
#[utoipa::path(
    get,
    path = "/api/sessions",
    responses(
        (status = 200, description = "All known insight sessions", body = SessionListResponse)
    ),
    tag = "sessions"
)]
#[allow(dead_code)]
pub async fn session_list_doc() {}

/// Session insights endpoint documentation
#[utoipa::path(
    get,
    path = "/api/sessions/{session_id}/insights",
    params(
        ("session_id" = String, Path, description = "Session identifier"),
        ("limit" = Option<usize>, Query, description = "Records returned per kind, newest last")
    ),
    responses(
        (status = 200, description = "Recent analysis records and rollup", body = SessionInsightsResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    tag = "sessions"
)]
#[allow(dead_code)]
pub async fn session_insights_doc() {}

/// Session delete endpoint documentation
#[utoipa::path(
    delete,
    path = "/api/sessions/{session_id}",
    params(
        ("session_id" = String, Path, description = "Session identifier")
    ),
    responses(
        (status = 200, description = "Session and records dropped", body = SessionDeleteResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    tag = "sessions"
)]
#[allow(dead_code)]
pub async fn session_delete_doc() {}

/// OpenAPI documentation for the server
#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        diagnostics_doc,
        room_list_doc,
        room_detail_doc,
        room_delete_doc,
        session_list_doc,
        session_insights_doc,
        session_delete_doc,
    ),
    components(schemas(
        HealthResponse,
        DiagnosticsResponse,
        RoomSummary,
        RoomListResponse,
        RoomDeleteResponse,
        SessionSummary,
        SessionListResponse,
        SessionInsightsResponse,
        SessionDeleteResponse,
        AnalysisRecord,
        RecordKind,
        ErrorResponse,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "diagnostics", description = "Runtime diagnostics"),
        (name = "rooms", description = "Active room projections"),
        (name = "sessions", description = "Insight session projections"),
    )
)]
pub struct ApiDoc;
