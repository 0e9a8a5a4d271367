use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::hub::connection::ConnectionHandle;
use crate::hub::registry::RoomRegistry;
use crate::models::ServerMessage;

/// Delivery tally of one fan-out pass
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    pub delivered: usize,
    pub evicted: usize,
}

/// Send a message to every connection in the snapshot except `exclude`.
///
/// Delivery is independent per recipient. Failed recipients are returned
/// instead of being removed mid-pass, so one dead connection never stalls
/// or skips the others.
pub fn fan_out(
    members: &[Arc<ConnectionHandle>],
    message: &ServerMessage,
    exclude: Option<Uuid>,
) -> (usize, Vec<Uuid>) {
    let mut delivered = 0;
    let mut failed = Vec::new();
    for member in members {
        if Some(member.id) == exclude {
            continue;
        }
        if member.send(message.clone()) {
            delivered += 1;
        } else {
            failed.push(member.id);
        }
    }
    (delivered, failed)
}

/// Fan a message out to a room, deregistering members whose delivery failed
pub async fn broadcast(
    registry: &RoomRegistry,
    room_id: &str,
    message: &ServerMessage,
    exclude: Option<Uuid>,
) -> BroadcastOutcome {
    let members = registry.members(room_id).await;
    let (delivered, failed) = fan_out(&members, message, exclude);
    for connection_id in &failed {
        warn!(
            "Dropping unreachable connection {} from room {}",
            connection_id, room_id
        );
        registry.deregister(room_id, *connection_id).await;
    }
    debug!(
        "Broadcast to room {}: {} delivered, {} evicted",
        room_id,
        delivered,
        failed.len()
    );
    BroadcastOutcome {
        delivered,
        evicted: failed.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn make_connection() -> (Arc<ConnectionHandle>, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(ConnectionHandle::new(tx)), rx)
    }

    fn chat(text: &str) -> ServerMessage {
        ServerMessage::Chat {
            user_id: "alice".to_string(),
            text: text.to_string(),
            timestamp: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn delivers_to_everyone_but_the_excluded_sender() {
        let registry = RoomRegistry::new();
        let (sender, mut sender_rx) = make_connection();
        let (first, mut first_rx) = make_connection();
        let (second, mut second_rx) = make_connection();

        registry
            .register("interview-1", "alice", sender.clone())
            .await
            .unwrap();
        registry
            .register("interview-1", "bob", first)
            .await
            .unwrap();
        registry
            .register("interview-1", "carol", second)
            .await
            .unwrap();

        let outcome = broadcast(&registry, "interview-1", &chat("hello"), Some(sender.id)).await;
        assert_eq!(
            outcome,
            BroadcastOutcome {
                delivered: 2,
                evicted: 0
            }
        );
        assert!(sender_rx.try_recv().is_err());
        assert!(matches!(
            first_rx.try_recv().unwrap(),
            ServerMessage::Chat { .. }
        ));
        assert!(matches!(
            second_rx.try_recv().unwrap(),
            ServerMessage::Chat { .. }
        ));
    }

    #[tokio::test]
    async fn failed_recipient_is_evicted_after_the_pass() {
        let registry = RoomRegistry::new();
        let (alive, mut alive_rx) = make_connection();
        let (dead, dead_rx) = make_connection();

        registry
            .register("interview-1", "alice", alive)
            .await
            .unwrap();
        registry
            .register("interview-1", "bob", dead.clone())
            .await
            .unwrap();
        drop(dead_rx);

        let outcome = broadcast(&registry, "interview-1", &chat("hello"), None).await;
        assert_eq!(
            outcome,
            BroadcastOutcome {
                delivered: 1,
                evicted: 1
            }
        );
        // The live member still got its copy and the dead one is gone
        assert!(alive_rx.try_recv().is_ok());
        let members = registry.members("interview-1").await;
        assert_eq!(members.len(), 1);
        assert!(members.iter().all(|m| m.id != dead.id));
    }

    #[tokio::test]
    async fn evicting_the_last_member_removes_the_room() {
        let registry = RoomRegistry::new();
        let (dead, dead_rx) = make_connection();

        registry
            .register("interview-1", "alice", dead)
            .await
            .unwrap();
        drop(dead_rx);

        let outcome = broadcast(&registry, "interview-1", &chat("hello"), None).await;
        assert_eq!(outcome.evicted, 1);
        assert!(registry.overview("interview-1").await.is_none());
    }

    #[tokio::test]
    async fn broadcast_to_absent_room_delivers_nothing() {
        let registry = RoomRegistry::new();
        let outcome = broadcast(&registry, "no-such-room", &chat("hello"), None).await;
        assert_eq!(outcome, BroadcastOutcome::default());
    }

    #[test]
    fn fan_out_reports_each_failure_once() {
        let (alive, _alive_rx) = make_connection();
        let (dead, dead_rx) = make_connection();
        drop(dead_rx);

        let members = vec![alive, dead.clone()];
        let (delivered, failed) = fan_out(&members, &chat("hello"), None);
        assert_eq!(delivered, 1);
        assert_eq!(failed, vec![dead.id]);
    }
}
