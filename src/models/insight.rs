use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Kind of media sample an analysis record was produced from
#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Video,
    Audio,
    Screen,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Video => "video",
            RecordKind::Audio => "audio",
            RecordKind::Screen => "screen",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analysis result accumulated against a session.
///
/// A failed analysis still yields a record, with `payload` null and the
/// reason in `error`, so record counts always match submission counts.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct AnalysisRecord {
    pub kind: RecordKind,
    pub timestamp: DateTime<Utc>,
    pub payload: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisRecord {
    pub fn completed(kind: RecordKind, timestamp: DateTime<Utc>, payload: Value) -> Self {
        Self {
            kind,
            timestamp,
            payload,
            error: None,
        }
    }

    pub fn degraded(kind: RecordKind, timestamp: DateTime<Utc>, reason: String) -> Self {
        Self {
            kind,
            timestamp,
            payload: Value::Null,
            error: Some(reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}
