use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::hub::connection::ConnectionHandle;
use crate::hub::signaling::{route, SignalKind};
use crate::models::ServerMessage;
use crate::AppState;

/// Handle an offer, answer or ice_candidate message: point-to-point relay
/// to one member of the sender's room
pub async fn handle_signal_message(
    app_state: &AppState,
    conn: &Arc<ConnectionHandle>,
    kind: SignalKind,
    target_user_id: String,
    payload: Value,
) {
    let Some(membership) = conn.membership() else {
        warn!("Connection {} sent {} before joining a room", conn.id, kind);
        let _ = conn.send(ServerMessage::Error {
            message: "Join a room before signaling".to_string(),
        });
        return;
    };

    match route(
        &app_state.rooms,
        &membership.room_id,
        kind,
        &membership.user_id,
        &target_user_id,
        payload,
    )
    .await
    {
        Ok(()) => info!("{} sent from {} to {}", kind, membership.user_id, target_user_id),
        Err(e) => {
            warn!(
                "Could not relay {} from {} to {}: {}",
                kind, membership.user_id, target_user_id, e
            );
            let _ = conn.send(ServerMessage::Error {
                message: e.to_string(),
            });
        }
    }
}
