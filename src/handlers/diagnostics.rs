use crate::{models::DiagnosticsResponse, AppState};
use axum::{extract::State, Json};
use std::sync::{Arc, Mutex, OnceLock};
use sysinfo::System;
use tracing::info;

static SYSTEM_MONITOR: OnceLock<Mutex<System>> = OnceLock::new();

/// Report connection, room, session and system stats
pub async fn diagnostics(State(app_state): State<Arc<AppState>>) -> Json<DiagnosticsResponse> {
    // Aggregate counts from the room registry and the insight store
    let rooms = app_state.rooms.list().await;
    let sessions = app_state.insights.list().await;
    let n_rooms = rooms.len() as u32;
    let n_room_members: u32 = rooms.iter().map(|r| r.participant_count as u32).sum();
    let n_sessions = sessions.len() as u32;
    let n_conn: u32 = sessions.iter().map(|s| s.active_connections as u32).sum();
    let n_records: u64 = sessions.iter().map(|s| s.total_records).sum();

    // System stats
    let (cpu_usage, memory_alloc, memory_free, memory_total) = {
        let sys_lock = SYSTEM_MONITOR.get_or_init(|| {
            Mutex::new(System::new_all())
        });
        match sys_lock.lock() {
            Ok(mut sys) => {
                sys.refresh_cpu();
                sys.refresh_memory();
                (
                    sys.global_cpu_info().cpu_usage(),
                    sys.used_memory(),
                    sys.free_memory(),
                    sys.total_memory(),
                )
            }
            Err(_) => (0.0, 0, 0, 0)
        }
    };

    info!(
        "Diagnostics: CPU: {:.2}%, Mem: {}/{} MB (Free: {} MB), Conn: {}, Rooms: {}, Sessions: {}",
        cpu_usage,
        memory_alloc / 1024 / 1024,
        memory_total / 1024 / 1024,
        memory_free / 1024 / 1024,
        n_conn,
        n_rooms,
        n_sessions
    );

    Json(DiagnosticsResponse {
        n_conn,
        n_rooms,
        n_room_members,
        n_sessions,
        n_records,
        cpu_usage,
        memory_alloc,
        memory_total,
        memory_free,
    })
}
