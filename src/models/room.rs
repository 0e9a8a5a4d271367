use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Membership snapshot of one active room
#[derive(Serialize, Deserialize, ToSchema, Clone)]
pub struct RoomSummary {
    pub room_id: String,
    pub participant_count: usize,
    pub participants: Vec<String>,
}

/// Response listing every active room
#[derive(Serialize, Deserialize, ToSchema)]
pub struct RoomListResponse {
    pub rooms: Vec<RoomSummary>,
    pub total_rooms: usize,
}

/// Response after force-deleting a room
#[derive(Serialize, Deserialize, ToSchema)]
pub struct RoomDeleteResponse {
    pub message: String,
}
