use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::hub::registry::RoomRegistry;
use crate::models::ServerMessage;

/// Handshake message kinds relayed point-to-point between two room members
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

impl SignalKind {
    fn envelope(self, payload: Value, from_user_id: String) -> ServerMessage {
        match self {
            SignalKind::Offer => ServerMessage::Offer {
                payload,
                from_user_id,
            },
            SignalKind::Answer => ServerMessage::Answer {
                payload,
                from_user_id,
            },
            SignalKind::IceCandidate => ServerMessage::IceCandidate {
                payload,
                from_user_id,
            },
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Offer => f.write_str("offer"),
            SignalKind::Answer => f.write_str("answer"),
            SignalKind::IceCandidate => f.write_str("ICE candidate"),
        }
    }
}

/// Relay failures, reported to the sender and to nobody else
#[derive(Debug, PartialEq, Eq)]
pub enum SignalError {
    TargetNotFound,
    DeliveryFailed(SignalKind),
}

impl fmt::Display for SignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalError::TargetNotFound => f.write_str("Target user not found"),
            SignalError::DeliveryFailed(kind) => write!(f, "Failed to send {}", kind),
        }
    }
}

impl std::error::Error for SignalError {}

/// Relay a handshake message to the one member of `room_id` bound to
/// `target_user`.
///
/// The envelope reaches that connection only. A stale target is
/// deregistered and the failure goes back to the caller so it can answer
/// the sender; nothing is ever broadcast from here.
pub async fn route(
    registry: &RoomRegistry,
    room_id: &str,
    kind: SignalKind,
    from_user: &str,
    target_user: &str,
    payload: Value,
) -> Result<(), SignalError> {
    let target = match registry.find_by_user(room_id, target_user).await {
        Ok(target) => target,
        Err(_) => return Err(SignalError::TargetNotFound),
    };
    if !target.send(kind.envelope(payload, from_user.to_string())) {
        registry.deregister(room_id, target.id).await;
        return Err(SignalError::DeliveryFailed(kind));
    }
    debug!(
        "Relayed {} from {} to {} in room {}",
        kind, from_user, target_user, room_id
    );
    Ok(())
}
