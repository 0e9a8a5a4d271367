use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::hub::connection::{ConnectionHandle, Roster};
use crate::models::RoomSummary;

/// Lookup and membership failures surfaced by the registry
#[derive(Debug, PartialEq, Eq)]
pub enum RegistryError {
    RoomNotFound(String),
    UserNotFound { room_id: String, user_id: String },
    AlreadyRegistered { room_id: String, connection_id: Uuid },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::RoomNotFound(room_id) => {
                write!(f, "Room '{}' not found", room_id)
            }
            RegistryError::UserNotFound { room_id, user_id } => {
                write!(f, "User '{}' not found in room '{}'", user_id, room_id)
            }
            RegistryError::AlreadyRegistered {
                room_id,
                connection_id,
            } => {
                write!(
                    f,
                    "Connection {} is already registered in room '{}'",
                    connection_id, room_id
                )
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Receipt for a successful room registration
#[derive(Debug)]
pub struct Registration {
    /// User ids of the members present before this join, in join order
    pub peer_ids: Vec<String>,
    pub member_count: usize,
}

/// Tracks which connections belong to which room.
///
/// A room exists exactly as long as it has members: the first register
/// creates it and the deregister that empties it removes it, inside the
/// same lock scope. Empty rooms are never observable.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, Roster>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Add a connection to a room under `user_id`, creating the room on
    /// first join. The same connection cannot register twice.
    pub async fn register(
        &self,
        room_id: &str,
        user_id: &str,
        conn: Arc<ConnectionHandle>,
    ) -> Result<Registration, RegistryError> {
        let mut rooms = self.rooms.write().await;
        let roster = rooms.entry(room_id.to_string()).or_default();
        if roster.contains(conn.id) {
            return Err(RegistryError::AlreadyRegistered {
                room_id: room_id.to_string(),
                connection_id: conn.id,
            });
        }
        let peer_ids = roster.user_ids();
        // Bind before the roster insert so any reader that sees the member
        // also sees its user id
        conn.bind(room_id, user_id);
        roster.add(conn);
        debug!(
            "Registered connection in room {} ({} members)",
            room_id,
            roster.len()
        );
        Ok(Registration {
            peer_ids,
            member_count: roster.len(),
        })
    }

    /// Remove a connection from a room; removing the last member removes
    /// the room itself. Returns false when nothing was removed.
    pub async fn deregister(&self, room_id: &str, connection_id: Uuid) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(roster) = rooms.get_mut(room_id) else {
            return false;
        };
        let Some(member) = roster.remove(connection_id) else {
            return false;
        };
        member.unbind();
        if roster.is_empty() {
            rooms.remove(room_id);
            debug!("Room {} removed after last member left", room_id);
        }
        true
    }

    /// Current members of a room, empty when the room does not exist
    pub async fn members(&self, room_id: &str) -> Vec<Arc<ConnectionHandle>> {
        let rooms = self.rooms.read().await;
        rooms
            .get(room_id)
            .map(|roster| roster.snapshot())
            .unwrap_or_default()
    }

    /// Earliest-joined member of a room bound to `user_id`
    pub async fn find_by_user(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> Result<Arc<ConnectionHandle>, RegistryError> {
        let rooms = self.rooms.read().await;
        let roster = rooms
            .get(room_id)
            .ok_or_else(|| RegistryError::RoomNotFound(room_id.to_string()))?;
        roster
            .find_by_user(user_id)
            .ok_or_else(|| RegistryError::UserNotFound {
                room_id: room_id.to_string(),
                user_id: user_id.to_string(),
            })
    }

    /// Membership snapshot of every active room, sorted by room id
    pub async fn list(&self) -> Vec<RoomSummary> {
        let rooms = self.rooms.read().await;
        let mut summaries: Vec<RoomSummary> = rooms
            .iter()
            .map(|(room_id, roster)| RoomSummary {
                room_id: room_id.clone(),
                participant_count: roster.len(),
                participants: roster.user_ids(),
            })
            .collect();
        summaries.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        summaries
    }

    /// Membership snapshot of one room
    pub async fn overview(&self, room_id: &str) -> Option<RoomSummary> {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).map(|roster| RoomSummary {
            room_id: room_id.to_string(),
            participant_count: roster.len(),
            participants: roster.user_ids(),
        })
    }

    /// Drop a room wholesale, unbinding and returning its members so the
    /// caller can notify them. None when the room does not exist.
    pub async fn remove_room(&self, room_id: &str) -> Option<Vec<Arc<ConnectionHandle>>> {
        let mut rooms = self.rooms.write().await;
        let roster = rooms.remove(room_id)?;
        let members = roster.snapshot();
        for member in &members {
            member.unbind();
        }
        Some(members)
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use crate::models::ServerMessage;

    fn make_connection() -> (Arc<ConnectionHandle>, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(ConnectionHandle::new(tx)), rx)
    }

    #[tokio::test]
    async fn first_join_creates_the_room() {
        let registry = RoomRegistry::new();
        let (conn, _rx) = make_connection();

        assert!(registry.list().await.is_empty());
        let registration = registry
            .register("interview-1", "alice", conn)
            .await
            .unwrap();
        assert!(registration.peer_ids.is_empty());
        assert_eq!(registration.member_count, 1);

        let rooms = registry.list().await;
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].room_id, "interview-1");
        assert_eq!(rooms[0].participants, vec!["alice"]);
    }

    #[tokio::test]
    async fn registration_reports_prior_peers() {
        let registry = RoomRegistry::new();
        let (first, _rx1) = make_connection();
        let (second, _rx2) = make_connection();

        registry
            .register("interview-1", "alice", first)
            .await
            .unwrap();
        let registration = registry
            .register("interview-1", "bob", second)
            .await
            .unwrap();
        assert_eq!(registration.peer_ids, vec!["alice"]);
        assert_eq!(registration.member_count, 2);
    }

    #[tokio::test]
    async fn same_connection_cannot_register_twice() {
        let registry = RoomRegistry::new();
        let (conn, _rx) = make_connection();

        registry
            .register("interview-1", "alice", conn.clone())
            .await
            .unwrap();
        let err = registry
            .register("interview-1", "alice", conn.clone())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::AlreadyRegistered {
                room_id: "interview-1".to_string(),
                connection_id: conn.id,
            }
        );
        assert_eq!(registry.members("interview-1").await.len(), 1);
    }

    #[tokio::test]
    async fn last_deregister_removes_the_room() {
        let registry = RoomRegistry::new();
        let (first, _rx1) = make_connection();
        let (second, _rx2) = make_connection();

        registry
            .register("interview-1", "alice", first.clone())
            .await
            .unwrap();
        registry
            .register("interview-1", "bob", second.clone())
            .await
            .unwrap();

        assert!(registry.deregister("interview-1", first.id).await);
        assert!(first.membership().is_none());
        assert_eq!(registry.members("interview-1").await.len(), 1);

        assert!(registry.deregister("interview-1", second.id).await);
        assert!(registry.overview("interview-1").await.is_none());
        assert!(registry.list().await.is_empty());
    }

    #[tokio::test]
    async fn deregister_of_unknown_member_is_a_noop() {
        let registry = RoomRegistry::new();
        let (member, _rx1) = make_connection();
        let (stranger, _rx2) = make_connection();

        registry
            .register("interview-1", "alice", member)
            .await
            .unwrap();
        assert!(!registry.deregister("interview-1", stranger.id).await);
        assert!(!registry.deregister("no-such-room", stranger.id).await);
        assert_eq!(registry.members("interview-1").await.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_user_resolves_to_earliest_joiner() {
        let registry = RoomRegistry::new();
        let (first, _rx1) = make_connection();
        let (second, _rx2) = make_connection();

        registry
            .register("interview-1", "alice", first.clone())
            .await
            .unwrap();
        registry
            .register("interview-1", "alice", second)
            .await
            .unwrap();

        let found = registry.find_by_user("interview-1", "alice").await.unwrap();
        assert_eq!(found.id, first.id);
    }

    #[tokio::test]
    async fn find_by_user_reports_missing_room_and_user() {
        let registry = RoomRegistry::new();
        let (conn, _rx) = make_connection();
        registry
            .register("interview-1", "alice", conn)
            .await
            .unwrap();

        assert_eq!(
            registry.find_by_user("no-such-room", "alice").await.unwrap_err(),
            RegistryError::RoomNotFound("no-such-room".to_string())
        );
        assert_eq!(
            registry.find_by_user("interview-1", "bob").await.unwrap_err(),
            RegistryError::UserNotFound {
                room_id: "interview-1".to_string(),
                user_id: "bob".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn members_snapshot_is_unaffected_by_later_changes() {
        let registry = RoomRegistry::new();
        let (first, _rx1) = make_connection();
        let (second, _rx2) = make_connection();

        registry
            .register("interview-1", "alice", first.clone())
            .await
            .unwrap();
        registry
            .register("interview-1", "bob", second)
            .await
            .unwrap();

        let snapshot = registry.members("interview-1").await;
        registry.deregister("interview-1", first.id).await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.members("interview-1").await.len(), 1);
    }

    #[tokio::test]
    async fn remove_room_returns_and_unbinds_members() {
        let registry = RoomRegistry::new();
        let (first, _rx1) = make_connection();
        let (second, _rx2) = make_connection();

        registry
            .register("interview-1", "alice", first.clone())
            .await
            .unwrap();
        registry
            .register("interview-1", "bob", second)
            .await
            .unwrap();

        let members = registry.remove_room("interview-1").await.unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|m| m.membership().is_none()));
        assert!(registry.overview("interview-1").await.is_none());
        assert!(registry.remove_room("interview-1").await.is_none());

        // The room id is free for a fresh room afterwards
        registry
            .register("interview-1", "carol", first)
            .await
            .unwrap();
        assert_eq!(registry.members("interview-1").await.len(), 1);
    }
}
