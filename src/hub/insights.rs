use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::hub::broadcast::{fan_out, BroadcastOutcome};
use crate::hub::connection::{ConnectionHandle, Roster};
use crate::models::{AnalysisRecord, RecordKind, ServerMessage, SessionSummary};

/// Retained and cumulative record counts for one media kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KindCounts {
    pub retained: usize,
    pub total: u64,
}

/// Read-only projection of one session's accumulated state
pub struct InsightSummary {
    pub session_id: String,
    pub session_type: String,
    pub created_at: DateTime<Utc>,
    pub active_connections: usize,
    pub video: KindCounts,
    pub audio: KindCounts,
    pub screen: KindCounts,
    pub rollup: String,
}

impl InsightSummary {
    pub fn total_records(&self) -> u64 {
        self.video.total + self.audio.total + self.screen.total
    }
}

#[derive(Default)]
struct KindSlot {
    records: VecDeque<AnalysisRecord>,
    total: u64,
}

impl KindSlot {
    fn push(&mut self, record: AnalysisRecord, cap: usize) {
        self.records.push_back(record);
        if self.records.len() > cap {
            self.records.pop_front();
        }
        self.total += 1;
    }

    /// Last `n` records in submission order
    fn tail(&self, n: usize) -> Vec<AnalysisRecord> {
        let skip = self.records.len().saturating_sub(n);
        self.records.iter().skip(skip).cloned().collect()
    }

    fn counts(&self) -> KindCounts {
        KindCounts {
            retained: self.records.len(),
            total: self.total,
        }
    }
}

struct InsightSession {
    session_type: String,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
    attachments: Roster,
    video: KindSlot,
    audio: KindSlot,
    screen: KindSlot,
}

impl InsightSession {
    fn new(session_type: &str, now: DateTime<Utc>) -> Self {
        Self {
            session_type: session_type.to_string(),
            created_at: now,
            last_activity: now,
            attachments: Roster::default(),
            video: KindSlot::default(),
            audio: KindSlot::default(),
            screen: KindSlot::default(),
        }
    }

    fn slot(&self, kind: RecordKind) -> &KindSlot {
        match kind {
            RecordKind::Video => &self.video,
            RecordKind::Audio => &self.audio,
            RecordKind::Screen => &self.screen,
        }
    }

    fn slot_mut(&mut self, kind: RecordKind) -> &mut KindSlot {
        match kind {
            RecordKind::Video => &mut self.video,
            RecordKind::Audio => &mut self.audio,
            RecordKind::Screen => &mut self.screen,
        }
    }

    fn total_records(&self) -> u64 {
        self.video.total + self.audio.total + self.screen.total
    }
}

/// Accumulates analysis records per session and serves bounded tail reads.
///
/// Sessions outlive their connections: detaching the last client leaves the
/// session and its records queryable. Only an explicit remove or the idle
/// sweeper drops a session. Retention per kind is capped; cumulative totals
/// keep counting past the cap.
pub struct InsightStore {
    sessions: RwLock<HashMap<String, InsightSession>>,
    max_records_per_kind: usize,
}

impl InsightStore {
    pub fn new(max_records_per_kind: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_records_per_kind,
        }
    }

    /// Create a session if absent. An existing session keeps its records
    /// and its original type tag.
    pub async fn open(&self, session_id: &str, session_type: &str) {
        let mut sessions = self.sessions.write().await;
        if !sessions.contains_key(session_id) {
            info!("Session {} opened ({})", session_id, session_type);
            sessions.insert(
                session_id.to_string(),
                InsightSession::new(session_type, Utc::now()),
            );
        }
    }

    /// Attach a live connection to a session, opening the session if absent
    pub async fn attach(&self, session_id: &str, session_type: &str, conn: Arc<ConnectionHandle>) {
        self.open(session_id, session_type).await;
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(session_id) else {
            return;
        };
        session.last_activity = Utc::now();
        if !session.attachments.contains(conn.id) {
            debug!("Connection {} attached to session {}", conn.id, session_id);
            session.attachments.add(conn);
        }
    }

    /// Detach a connection. The session and its records stay behind.
    pub async fn detach(&self, session_id: &str, connection_id: Uuid) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(session_id) else {
            return false;
        };
        let removed = session.attachments.remove(connection_id).is_some();
        if removed {
            session.last_activity = Utc::now();
            debug!(
                "Connection {} detached from session {} ({} still attached)",
                connection_id,
                session_id,
                session.attachments.len()
            );
        }
        removed
    }

    /// Append a record in submission order, evicting the oldest of its kind
    /// past the retention cap. Opens the session if absent.
    pub async fn record(&self, session_id: &str, record: AnalysisRecord) {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| InsightSession::new("general", Utc::now()));
        session.last_activity = Utc::now();
        let kind = record.kind;
        session.slot_mut(kind).push(record, self.max_records_per_kind);
        let counts = session.slot(kind).counts();
        debug!(
            "Recorded {} analysis for session {} ({} retained, {} total)",
            kind, session_id, counts.retained, counts.total
        );
    }

    /// Last `n` records of one kind, oldest first; empty for unknown
    /// sessions
    pub async fn tail(&self, session_id: &str, kind: RecordKind, n: usize) -> Vec<AnalysisRecord> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .map(|session| session.slot(kind).tail(n))
            .unwrap_or_default()
    }

    /// Counts and rollup line for one session
    pub async fn summary(&self, session_id: &str) -> Option<InsightSummary> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(session_id)?;
        Some(InsightSummary {
            session_id: session_id.to_string(),
            session_type: session.session_type.clone(),
            created_at: session.created_at,
            active_connections: session.attachments.len(),
            video: session.video.counts(),
            audio: session.audio.counts(),
            screen: session.screen.counts(),
            rollup: format!(
                "Session completed with {} total analyses. Review individual analyses for detailed insights.",
                session.total_records()
            ),
        })
    }

    /// Snapshot of every known session, sorted by session id
    pub async fn list(&self) -> Vec<SessionSummary> {
        let sessions = self.sessions.read().await;
        let mut summaries: Vec<SessionSummary> = sessions
            .iter()
            .map(|(session_id, session)| SessionSummary {
                session_id: session_id.clone(),
                session_type: session.session_type.clone(),
                created_at: session.created_at,
                active_connections: session.attachments.len(),
                video_records: session.video.total,
                audio_records: session.audio.total,
                screen_records: session.screen.total,
                total_records: session.total_records(),
            })
            .collect();
        summaries.sort_by(|a, b| a.session_id.cmp(&b.session_id));
        summaries
    }

    /// Drop a session and all its records
    pub async fn remove(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id).is_some()
    }

    /// Fan a message out to a session's attachments, dropping broken ones
    /// after the pass
    pub async fn broadcast(
        &self,
        session_id: &str,
        message: &ServerMessage,
        exclude: Option<Uuid>,
    ) -> BroadcastOutcome {
        let members = {
            let sessions = self.sessions.read().await;
            match sessions.get(session_id) {
                Some(session) => session.attachments.snapshot(),
                None => return BroadcastOutcome::default(),
            }
        };
        let (delivered, failed) = fan_out(&members, message, exclude);
        if !failed.is_empty() {
            let mut sessions = self.sessions.write().await;
            if let Some(session) = sessions.get_mut(session_id) {
                for connection_id in &failed {
                    warn!(
                        "Dropping unreachable attachment {} from session {}",
                        connection_id, session_id
                    );
                    session.attachments.remove(*connection_id);
                }
            }
        }
        BroadcastOutcome {
            delivered,
            evicted: failed.len(),
        }
    }

    /// Evict sessions with no attachments and no activity within `max_idle`
    pub async fn sweep_idle(&self, max_idle: Duration, now: DateTime<Utc>) -> Vec<String> {
        let mut sessions = self.sessions.write().await;
        let mut evicted = Vec::new();
        sessions.retain(|session_id, session| {
            if !session.attachments.is_empty() || now - session.last_activity < max_idle {
                return true;
            }
            evicted.push(session_id.clone());
            false
        });
        if !evicted.is_empty() {
            info!("Swept {} idle sessions", evicted.len());
        }
        evicted
    }
}
