use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::hub::connection::ConnectionHandle;
use crate::models::{AnalysisRecord, RecordKind, ServerMessage};
use crate::AppState;

/// Handle a media sample: relay it to the rest of the session, analyze it,
/// record the result, and answer the submitter with the insight and any
/// coaching feedback.
pub async fn handle_media_message(
    app_state: &AppState,
    conn: &Arc<ConnectionHandle>,
    channel_id: &str,
    kind: RecordKind,
    data: Vec<u8>,
    timestamp: Option<DateTime<Utc>>,
) {
    let timestamp = timestamp.unwrap_or_else(Utc::now);

    // The other attachments get the raw sample; the submitter already has it
    let outcome = app_state
        .insights
        .broadcast(
            channel_id,
            &ServerMessage::frame(kind, data.clone(), timestamp),
            Some(conn.id),
        )
        .await;
    debug!(
        "{} sample relayed to {} attachments of session {} ({} evicted)",
        kind, outcome.delivered, channel_id, outcome.evicted
    );

    let record = match app_state.analyzer.analyze(kind, &data, timestamp).await {
        Ok(payload) => AnalysisRecord::completed(kind, timestamp, payload),
        Err(e) => {
            warn!("{} analysis failed for session {}: {}", kind, channel_id, e);
            AnalysisRecord::degraded(kind, timestamp, e.to_string())
        }
    };
    app_state.insights.record(channel_id, record.clone()).await;

    let _ = conn.send(ServerMessage::Insight {
        record: record.clone(),
    });
    if let Some(message) = app_state.feedback.feedback_for(&record) {
        let _ = conn.send(ServerMessage::Feedback { message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use tokio::sync::mpsc;

    use crate::config::Config;
    use crate::hub::insights::InsightStore;
    use crate::hub::registry::RoomRegistry;
    use crate::services::analysis::{AnalysisError, Analyzer};
    use crate::services::feedback::TemplateFeedback;

    fn make_connection() -> (Arc<ConnectionHandle>, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(ConnectionHandle::new(tx)), rx)
    }

    struct FailingAnalyzer;

    #[async_trait]
    impl Analyzer for FailingAnalyzer {
        async fn analyze(
            &self,
            _kind: RecordKind,
            _data: &[u8],
            _timestamp: DateTime<Utc>,
        ) -> Result<Value, AnalysisError> {
            Err(AnalysisError::Unprocessable("model offline".to_string()))
        }
    }

    fn app_state_with(analyzer: Arc<dyn Analyzer>) -> AppState {
        let config = Config::default();
        AppState {
            rooms: RoomRegistry::new(),
            insights: InsightStore::new(config.max_records_per_kind),
            analyzer,
            feedback: Arc::new(TemplateFeedback),
            config,
        }
    }

    #[tokio::test]
    async fn sample_is_relayed_recorded_and_answered() {
        let app_state = AppState::new(Config::default());
        let (sender, mut sender_rx) = make_connection();
        let (peer, mut peer_rx) = make_connection();

        app_state.insights.attach("chan-1", "technical", sender.clone()).await;
        app_state.insights.attach("chan-1", "technical", peer).await;

        handle_media_message(
            &app_state,
            &sender,
            "chan-1",
            RecordKind::Video,
            b"frame".to_vec(),
            None,
        )
        .await;

        // Peer sees the raw frame, not the insight
        match peer_rx.try_recv().unwrap() {
            ServerMessage::VideoFrame { data, .. } => assert_eq!(data, b"frame"),
            other => panic!("unexpected message: {:?}", other),
        }
        assert!(peer_rx.try_recv().is_err());

        // Submitter gets the insight and a feedback line, in that order
        match sender_rx.try_recv().unwrap() {
            ServerMessage::Insight { record } => {
                assert_eq!(record.kind, RecordKind::Video);
                assert!(!record.is_degraded());
            }
            other => panic!("unexpected message: {:?}", other),
        }
        assert!(matches!(
            sender_rx.try_recv().unwrap(),
            ServerMessage::Feedback { .. }
        ));

        let summary = app_state.insights.summary("chan-1").await.unwrap();
        assert_eq!(summary.video.total, 1);
    }

    #[tokio::test]
    async fn failed_analysis_yields_a_degraded_record_and_no_feedback() {
        let app_state = app_state_with(Arc::new(FailingAnalyzer));
        let (sender, mut sender_rx) = make_connection();

        app_state.insights.attach("chan-1", "technical", sender.clone()).await;
        handle_media_message(
            &app_state,
            &sender,
            "chan-1",
            RecordKind::Audio,
            b"pcm".to_vec(),
            None,
        )
        .await;

        match sender_rx.try_recv().unwrap() {
            ServerMessage::Insight { record } => {
                assert!(record.is_degraded());
                assert_eq!(
                    record.error.as_deref(),
                    Some("Analysis failed: model offline")
                );
            }
            other => panic!("unexpected message: {:?}", other),
        }
        // Degraded records earn no coaching line
        assert!(sender_rx.try_recv().is_err());
        assert_eq!(
            app_state.insights.summary("chan-1").await.unwrap().audio.total,
            1
        );
    }

    #[tokio::test]
    async fn client_timestamp_is_kept_on_the_record() {
        let app_state = AppState::new(Config::default());
        let (sender, mut sender_rx) = make_connection();
        app_state.insights.attach("chan-1", "technical", sender.clone()).await;

        let sent_at = "2024-05-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        handle_media_message(
            &app_state,
            &sender,
            "chan-1",
            RecordKind::Screen,
            b"shot".to_vec(),
            Some(sent_at),
        )
        .await;

        match sender_rx.try_recv().unwrap() {
            ServerMessage::Insight { record } => assert_eq!(record.timestamp, sent_at),
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
