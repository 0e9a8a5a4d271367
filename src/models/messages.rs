
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, base64::Base64};

use crate::models::insight::{AnalysisRecord, RecordKind};

/// Messages a client may send over the stream endpoint
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    JoinRoom {
        room_id: String,
        user_id: String,
    },
    LeaveRoom {
        room_id: String,
    },
    Offer {
        target_user_id: String,
        payload: Value,
    },
    Answer {
        target_user_id: String,
        payload: Value,
    },
    IceCandidate {
        target_user_id: String,
        payload: Value,
    },
    Message {
        room_id: String,
        text: String,
    },
    VideoFrame {
        #[serde_as(as = "Base64")]
        data: Vec<u8>,
        timestamp: Option<DateTime<Utc>>,
    },
    AudioChunk {
        #[serde_as(as = "Base64")]
        data: Vec<u8>,
        timestamp: Option<DateTime<Utc>>,
    },
    ScreenShare {
        #[serde_as(as = "Base64")]
        data: Vec<u8>,
        timestamp: Option<DateTime<Utc>>,
    },
}

/// Messages the server pushes to clients over the stream endpoint
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "user-joined")]
    UserJoined { payload: String },
    #[serde(rename = "user-left")]
    UserLeft { payload: String },
    #[serde(rename = "offer")]
    Offer { payload: Value, from_user_id: String },
    #[serde(rename = "answer")]
    Answer { payload: Value, from_user_id: String },
    #[serde(rename = "ice-candidate")]
    IceCandidate { payload: Value, from_user_id: String },
    #[serde(rename = "message")]
    Chat {
        user_id: String,
        text: String,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "video_frame")]
    VideoFrame {
        #[serde_as(as = "Base64")]
        data: Vec<u8>,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "audio_chunk")]
    AudioChunk {
        #[serde_as(as = "Base64")]
        data: Vec<u8>,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "screen_share")]
    ScreenShare {
        #[serde_as(as = "Base64")]
        data: Vec<u8>,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "insight")]
    Insight {
        #[serde(flatten)]
        record: AnalysisRecord,
    },
    #[serde(rename = "feedback")]
    Feedback { message: String },
    #[serde(rename = "room-deleted")]
    RoomDeleted { message: String },
    #[serde(rename = "error")]
    Error { message: String },
}

impl ServerMessage {
    /// Relay envelope for a media sample, addressed to the other session attachments
    pub fn frame(kind: RecordKind, data: Vec<u8>, timestamp: DateTime<Utc>) -> Self {
        match kind {
            RecordKind::Video => ServerMessage::VideoFrame { data, timestamp },
            RecordKind::Audio => ServerMessage::AudioChunk { data, timestamp },
            RecordKind::Screen => ServerMessage::ScreenShare { data, timestamp },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_join_room_message() {
        let raw = r#"{"type": "join_room", "room_id": "interview-1", "user_id": "alice"}"#;
        let message: ClientMessage = serde_json::from_str(raw).unwrap();
        match message {
            ClientMessage::JoinRoom { room_id, user_id } => {
                assert_eq!(room_id, "interview-1");
                assert_eq!(user_id, "alice");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn parses_video_frame_with_base64_data() {
        let raw = r#"{"type": "video_frame", "data": "aGVsbG8=", "timestamp": "2024-05-01T12:00:00Z"}"#;
        let message: ClientMessage = serde_json::from_str(raw).unwrap();
        match message {
            ClientMessage::VideoFrame { data, timestamp } => {
                assert_eq!(data, b"hello");
                assert!(timestamp.is_some());
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn video_frame_timestamp_is_optional() {
        let raw = r#"{"type": "video_frame", "data": "aGVsbG8="}"#;
        let message: ClientMessage = serde_json::from_str(raw).unwrap();
        match message {
            ClientMessage::VideoFrame { timestamp, .. } => assert!(timestamp.is_none()),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_message_type() {
        let raw = r#"{"type": "teleport", "room_id": "interview-1"}"#;
        assert!(serde_json::from_str::<ClientMessage>(raw).is_err());
    }

    #[test]
    fn user_joined_uses_payload_field() {
        let message = ServerMessage::UserJoined {
            payload: "bob".to_string(),
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "user-joined");
        assert_eq!(value["payload"], "bob");
    }

    #[test]
    fn ice_candidate_carries_sender_and_payload() {
        let message = ServerMessage::IceCandidate {
            payload: serde_json::json!({"candidate": "foo"}),
            from_user_id: "alice".to_string(),
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "ice-candidate");
        assert_eq!(value["from_user_id"], "alice");
        assert_eq!(value["payload"]["candidate"], "foo");
    }

    #[test]
    fn insight_flattens_the_record() {
        let record = AnalysisRecord::completed(
            RecordKind::Screen,
            Utc::now(),
            serde_json::json!({"analysis": "clean"}),
        );
        let value = serde_json::to_value(&ServerMessage::Insight { record }).unwrap();
        assert_eq!(value["type"], "insight");
        assert_eq!(value["kind"], "screen");
        assert_eq!(value["payload"]["analysis"], "clean");
    }

    #[test]
    fn media_frame_round_trips_as_base64() {
        let message = ServerMessage::frame(RecordKind::Audio, b"pcm".to_vec(), Utc::now());
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "audio_chunk");
        assert_eq!(value["data"], "cGNt");
    }
}
