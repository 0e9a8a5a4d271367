use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::models::RecordKind;

/// Largest sample the built-in analyzer will look at.
const MAX_SAMPLE_BYTES: usize = 8 * 1024 * 1024;

/// Failure of the analysis collaborator
#[derive(Debug)]
pub enum AnalysisError {
    Unprocessable(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::Unprocessable(reason) => write!(f, "Analysis failed: {}", reason),
        }
    }
}

impl std::error::Error for AnalysisError {}

/// Seam to the media-analysis collaborator.
///
/// A failure is reported to the caller, never to the client directly: the
/// caller turns it into a degraded record so record counts always match
/// submission counts.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        kind: RecordKind,
        data: &[u8],
        timestamp: DateTime<Utc>,
    ) -> Result<Value, AnalysisError>;
}

/// Analyzer shipped with the server: local descriptive stats, no network
pub struct BuiltinAnalyzer;

#[async_trait]
impl Analyzer for BuiltinAnalyzer {
    async fn analyze(
        &self,
        kind: RecordKind,
        data: &[u8],
        timestamp: DateTime<Utc>,
    ) -> Result<Value, AnalysisError> {
        if data.len() > MAX_SAMPLE_BYTES {
            return Err(AnalysisError::Unprocessable(format!(
                "{} sample of {} bytes exceeds the {} byte limit",
                kind,
                data.len(),
                MAX_SAMPLE_BYTES
            )));
        }
        let analysis = if data.is_empty() {
            format!("Empty {} sample", kind)
        } else {
            format!("Received {} sample of {} bytes", kind, data.len())
        };
        Ok(json!({
            "analysis": analysis,
            "bytes": data.len(),
            "captured_at": timestamp.to_rfc3339(),
            "confidence": 1.0,
        }))
    }
}
