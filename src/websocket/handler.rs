
use std::sync::Arc;
use axum::{
    extract::{Path, Query, State, ws::{Message, WebSocket, WebSocketUpgrade}},
    response::Response,
};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use futures_util::{StreamExt, SinkExt};

use crate::{AppState, websocket::msg_media_handler::handle_media_message};
use crate::hub::broadcast::broadcast;
use crate::hub::connection::ConnectionHandle;
use crate::hub::signaling::SignalKind;
use crate::models::{ClientMessage, RecordKind, ServerMessage, StreamQuery};
use crate::websocket::msg_room_handler::{handle_chat_message, handle_join_room, handle_leave_room};
use crate::websocket::msg_signal_handler::handle_signal_message;

/// WebSocket handler
pub async fn websocket_handler(
    Path(channel_id): Path<String>,
    Query(query): Query<StreamQuery>,
    State(app_state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> Response {
    info!("New WebSocket connection attempt for channel {}", channel_id);
    ws.on_upgrade(move |socket| handle_socket(socket, channel_id, query.session_type, app_state))
}

/// Handle one WebSocket connection: pump queued messages out, dispatch
/// incoming ones, and clean up room and session state on the way out.
async fn handle_socket(
    socket: WebSocket,
    channel_id: String,
    session_type: String,
    app_state: Arc<AppState>,
) {
    // The sending half of this channel is the connection's identity
    // everywhere else in the server
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let conn = Arc::new(ConnectionHandle::new(tx));
    app_state
        .insights
        .attach(&channel_id, &session_type, conn.clone())
        .await;
    info!(
        "WebSocket connection established for channel {} with connection_id {}",
        channel_id, conn.id
    );

    // Split the socket into sender and receiver
    let (mut sink, mut stream) = socket.split();

    // Forward queued outbound messages to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to serialize outbound message: {}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(message) => dispatch(&app_state, &conn, &channel_id, message).await,
                            Err(e) => {
                                warn!("Failed to parse message on channel {}: {}", channel_id, e);
                                let _ = conn.send(ServerMessage::Error {
                                    message: format!("Invalid message format: {}", e),
                                });
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => break,
                    // Binary, ping and pong frames carry nothing for us
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("WebSocket error on channel {}: {}", channel_id, e);
                        break;
                    }
                    None => break,
                }
            }
            // The pump only ends when the socket is gone
            _ = &mut send_task => break,
        }
    }

    cleanup_connection(&app_state, &channel_id, &conn).await;
    send_task.abort();
    info!(
        "WebSocket connection terminated for channel {} after {}s",
        channel_id,
        (chrono::Utc::now() - conn.joined_at).num_seconds()
    );
}

async fn dispatch(
    app_state: &AppState,
    conn: &Arc<ConnectionHandle>,
    channel_id: &str,
    message: ClientMessage,
) {
    match message {
        ClientMessage::JoinRoom { room_id, user_id } => {
            handle_join_room(app_state, conn, room_id, user_id).await;
        }
        ClientMessage::LeaveRoom { room_id } => {
            handle_leave_room(app_state, conn, room_id).await;
        }
        ClientMessage::Offer {
            target_user_id,
            payload,
        } => {
            handle_signal_message(app_state, conn, SignalKind::Offer, target_user_id, payload)
                .await;
        }
        ClientMessage::Answer {
            target_user_id,
            payload,
        } => {
            handle_signal_message(app_state, conn, SignalKind::Answer, target_user_id, payload)
                .await;
        }
        ClientMessage::IceCandidate {
            target_user_id,
            payload,
        } => {
            handle_signal_message(
                app_state,
                conn,
                SignalKind::IceCandidate,
                target_user_id,
                payload,
            )
            .await;
        }
        ClientMessage::Message { room_id, text } => {
            handle_chat_message(app_state, conn, room_id, text).await;
        }
        ClientMessage::VideoFrame { data, timestamp } => {
            handle_media_message(app_state, conn, channel_id, RecordKind::Video, data, timestamp)
                .await;
        }
        ClientMessage::AudioChunk { data, timestamp } => {
            handle_media_message(app_state, conn, channel_id, RecordKind::Audio, data, timestamp)
                .await;
        }
        ClientMessage::ScreenShare { data, timestamp } => {
            handle_media_message(
                app_state,
                conn,
                channel_id,
                RecordKind::Screen,
                data,
                timestamp,
            )
            .await;
        }
    }
}

/// Deregister from any joined room, tell the remaining members, and detach
/// from the channel session
pub(crate) async fn cleanup_connection(
    app_state: &AppState,
    channel_id: &str,
    conn: &Arc<ConnectionHandle>,
) {
    if let Some(membership) = conn.membership() {
        if app_state.rooms.deregister(&membership.room_id, conn.id).await {
            broadcast(
                &app_state.rooms,
                &membership.room_id,
                &ServerMessage::UserLeft {
                    payload: membership.user_id.clone(),
                },
                Some(conn.id),
            )
            .await;
            info!(
                "User {} left room {} on disconnect",
                membership.user_id, membership.room_id
            );
        }
    }
    app_state.insights.detach(channel_id, conn.id).await;
}
