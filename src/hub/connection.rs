use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::models::ServerMessage;

/// Room binding a connection acquires when it joins a room
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Membership {
    pub room_id: String,
    pub user_id: String,
}

/// Handle to one live client connection.
///
/// The sender half is the liveness seam: a send fails exactly when the
/// socket task on the other end has terminated, and every part of the hub
/// detects dead connections through that failure.
#[derive(Debug)]
pub struct ConnectionHandle {
    pub id: Uuid,
    pub joined_at: DateTime<Utc>,
    membership: RwLock<Option<Membership>>,
    sender: mpsc::UnboundedSender<ServerMessage>,
}

impl ConnectionHandle {
    pub fn new(sender: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self {
            id: Uuid::new_v4(),
            joined_at: Utc::now(),
            membership: RwLock::new(None),
            sender,
        }
    }

    /// Queue a message for delivery; false when the connection is gone
    pub fn send(&self, message: ServerMessage) -> bool {
        self.sender.send(message).is_ok()
    }

    pub fn bind(&self, room_id: &str, user_id: &str) {
        if let Ok(mut membership) = self.membership.write() {
            *membership = Some(Membership {
                room_id: room_id.to_string(),
                user_id: user_id.to_string(),
            });
        }
    }

    pub fn unbind(&self) {
        if let Ok(mut membership) = self.membership.write() {
            *membership = None;
        }
    }

    pub fn membership(&self) -> Option<Membership> {
        match self.membership.read() {
            Ok(membership) => membership.clone(),
            Err(_) => None,
        }
    }

    pub fn user_id(&self) -> Option<String> {
        self.membership().map(|m| m.user_id)
    }
}

/// Ordered set of live connections; insertion order is join order
#[derive(Default)]
pub struct Roster {
    members: Vec<Arc<ConnectionHandle>>,
}

impl Roster {
    pub fn contains(&self, connection_id: Uuid) -> bool {
        self.members.iter().any(|m| m.id == connection_id)
    }

    pub fn add(&mut self, conn: Arc<ConnectionHandle>) {
        self.members.push(conn);
    }

    pub fn remove(&mut self, connection_id: Uuid) -> Option<Arc<ConnectionHandle>> {
        let position = self.members.iter().position(|m| m.id == connection_id)?;
        Some(self.members.remove(position))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Copy of the member list, detached from the roster's locking scope
    pub fn snapshot(&self) -> Vec<Arc<ConnectionHandle>> {
        self.members.to_vec()
    }

    /// Earliest-joined member bound to `user_id`
    pub fn find_by_user(&self, user_id: &str) -> Option<Arc<ConnectionHandle>> {
        self.members
            .iter()
            .find(|m| m.user_id().as_deref() == Some(user_id))
            .cloned()
    }

    /// Bound user ids of all members, in join order
    pub fn user_ids(&self) -> Vec<String> {
        self.members.iter().filter_map(|m| m.user_id()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_connection() -> (Arc<ConnectionHandle>, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(ConnectionHandle::new(tx)), rx)
    }

    #[test]
    fn send_succeeds_while_receiver_lives() {
        let (conn, mut rx) = make_connection();
        assert!(conn.send(ServerMessage::Feedback {
            message: "hi".to_string()
        }));
        assert!(matches!(
            rx.try_recv().unwrap(),
            ServerMessage::Feedback { .. }
        ));
    }

    #[test]
    fn send_fails_after_receiver_dropped() {
        let (conn, rx) = make_connection();
        drop(rx);
        assert!(!conn.send(ServerMessage::Feedback {
            message: "hi".to_string()
        }));
    }

    #[test]
    fn bind_and_unbind_membership() {
        let (conn, _rx) = make_connection();
        assert!(conn.membership().is_none());

        conn.bind("interview-1", "alice");
        let membership = conn.membership().unwrap();
        assert_eq!(membership.room_id, "interview-1");
        assert_eq!(membership.user_id, "alice");
        assert_eq!(conn.user_id().as_deref(), Some("alice"));

        conn.unbind();
        assert!(conn.membership().is_none());
    }

    #[test]
    fn roster_keeps_join_order() {
        let (first, _rx1) = make_connection();
        let (second, _rx2) = make_connection();
        let mut roster = Roster::default();
        roster.add(first.clone());
        roster.add(second.clone());

        let snapshot = roster.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id, first.id);
        assert_eq!(snapshot[1].id, second.id);
    }

    #[test]
    fn find_by_user_prefers_earliest_joiner() {
        let (first, _rx1) = make_connection();
        let (second, _rx2) = make_connection();
        first.bind("interview-1", "alice");
        second.bind("interview-1", "alice");

        let mut roster = Roster::default();
        roster.add(first.clone());
        roster.add(second);

        let found = roster.find_by_user("alice").unwrap();
        assert_eq!(found.id, first.id);
    }

    #[test]
    fn remove_returns_the_member() {
        let (conn, _rx) = make_connection();
        let mut roster = Roster::default();
        roster.add(conn.clone());

        let removed = roster.remove(conn.id).unwrap();
        assert_eq!(removed.id, conn.id);
        assert!(roster.is_empty());
        assert!(roster.remove(conn.id).is_none());
    }
}
