use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::insight::AnalysisRecord;

/// One insight session as reported by the session list endpoint
#[derive(Serialize, Deserialize, ToSchema, Clone)]
pub struct SessionSummary {
    pub session_id: String,
    pub session_type: String,
    pub created_at: DateTime<Utc>,
    pub active_connections: usize,
    pub video_records: u64,
    pub audio_records: u64,
    pub screen_records: u64,
    pub total_records: u64,
}

/// Response listing every known insight session
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionSummary>,
    pub total_sessions: usize,
}

/// Recent analysis records and rollup for one session
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SessionInsightsResponse {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub total_analyses: u64,
    pub video_analyses: Vec<AnalysisRecord>,
    pub audio_analyses: Vec<AnalysisRecord>,
    pub screen_analyses: Vec<AnalysisRecord>,
    pub summary: String,
}

/// Response after deleting a session
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SessionDeleteResponse {
    pub status: String,
    pub message: String,
}

/// Query parameters for the session insights endpoint
#[derive(Deserialize)]
pub struct InsightTailQuery {
    pub limit: Option<usize>,
}

/// Query parameters accepted by the stream endpoint
#[derive(Deserialize)]
pub struct StreamQuery {
    #[serde(default = "default_session_type")]
    pub session_type: String,
}

fn default_session_type() -> String {
    "general".to_string()
}
