use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};

use crate::hub::broadcast::broadcast;
use crate::hub::connection::ConnectionHandle;
use crate::models::ServerMessage;
use crate::AppState;

/// Handle a join_room message
pub async fn handle_join_room(
    app_state: &AppState,
    conn: &Arc<ConnectionHandle>,
    room_id: String,
    user_id: String,
) {
    if let Some(current) = conn.membership() {
        debug!(
            "Connection {} tried to join {} while in {}",
            conn.id, room_id, current.room_id
        );
        let _ = conn.send(ServerMessage::Error {
            message: format!("Already joined room '{}'", current.room_id),
        });
        return;
    }

    match app_state.rooms.register(&room_id, &user_id, conn.clone()).await {
        Ok(registration) => {
            info!(
                "User {} joined room {} ({} members)",
                user_id, room_id, registration.member_count
            );
            debug!(
                "Peers already in room {}: {:?}",
                room_id, registration.peer_ids
            );
            // Tell the members that were already there; the joiner gets no echo
            if registration.member_count > 1 {
                broadcast(
                    &app_state.rooms,
                    &room_id,
                    &ServerMessage::UserJoined { payload: user_id },
                    Some(conn.id),
                )
                .await;
            }
        }
        Err(e) => {
            error!("Error joining room {}: {}", room_id, e);
            let _ = conn.send(ServerMessage::Error {
                message: "Failed to join room".to_string(),
            });
        }
    }
}

/// Handle a leave_room message
pub async fn handle_leave_room(app_state: &AppState, conn: &Arc<ConnectionHandle>, room_id: String) {
    let Some(membership) = conn.membership() else {
        debug!("Connection {} sent leave_room without a membership", conn.id);
        return;
    };
    if membership.room_id != room_id {
        debug!(
            "Connection {} sent leave_room for {} while in {}",
            conn.id, room_id, membership.room_id
        );
        return;
    }

    if app_state.rooms.deregister(&room_id, conn.id).await {
        broadcast(
            &app_state.rooms,
            &room_id,
            &ServerMessage::UserLeft {
                payload: membership.user_id.clone(),
            },
            Some(conn.id),
        )
        .await;
        info!("User {} left room {}", membership.user_id, room_id);
    }
}

/// Handle a chat message: room-wide fan-out, sender included
pub async fn handle_chat_message(
    app_state: &AppState,
    conn: &Arc<ConnectionHandle>,
    room_id: String,
    text: String,
) {
    let user_id = conn.user_id().unwrap_or_else(|| "Unknown".to_string());
    let outcome = broadcast(
        &app_state.rooms,
        &room_id,
        &ServerMessage::Chat {
            user_id: user_id.clone(),
            text,
            timestamp: Utc::now(),
        },
        None,
    )
    .await;
    debug!(
        "Chat from {} reached {} members of room {}",
        user_id, outcome.delivered, room_id
    );
}
