//! Snapshot construction and fan-out to a room's live connections, plus the
//! background sweep for leaked rooms.

use crate::protocol::{MemberInfo, ServerMessage};
use crate::state::{stats, AppState};
use crate::types::Room;
use std::sync::Arc;
use std::time::Duration;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);
const MAX_EMPTY_ROOM_AGE_HOURS: i64 = 24;

/// Build the full room snapshot sent after every mutation. Votes are masked
/// while the room is hidden; statistics exist only while revealed.
pub fn snapshot(room: &Room) -> ServerMessage {
    let mut users: Vec<MemberInfo> = room
        .members
        .iter()
        .map(|(id, member)| MemberInfo::masked(id, member, room.revealed))
        .collect();
    // connection IDs are ULIDs, so this approximates join order
    users.sort_by(|a, b| a.id.cmp(&b.id));

    let stats = if room.revealed {
        stats::calculate(&room.numeric_votes())
    } else {
        None
    };

    ServerMessage::RoomUpdate {
        room_id: room.id.clone(),
        users,
        revealed: room.revealed,
        stats,
        creator_id: room.host_id.clone(),
        card_set: room.card_set,
        story_title: room.story_title.clone(),
        auto_reveal: room.auto_reveal,
        special_effects: room.special_effects,
    }
}

impl AppState {
    /// Send the current snapshot to every member connection of a room
    pub(crate) async fn broadcast_room(&self, room: &Room) {
        let msg = snapshot(room);
        let connections = self.connections.read().await;
        for conn_id in room.members.keys() {
            if let Some(tx) = connections.get(conn_id) {
                let _ = tx.send(msg.clone());
            }
        }
    }

    /// Point-to-point signal to a single connection
    pub(crate) async fn send_to(&self, conn_id: &str, msg: ServerMessage) {
        let connections = self.connections.read().await;
        if let Some(tx) = connections.get(conn_id) {
            let _ = tx.send(msg);
        }
    }

    /// One-shot host-absence notice to every current member
    pub(crate) async fn notify_host_absent(&self, room: &Room) {
        let msg = ServerMessage::HostAbsent {
            room_id: room.id.clone(),
        };
        let connections = self.connections.read().await;
        for conn_id in room.members.keys() {
            if let Some(tx) = connections.get(conn_id) {
                let _ = tx.send(msg.clone());
            }
        }
    }
}

/// Spawn the hourly sweep that deletes empty rooms older than the retention
/// window, a safety net against entries leaked past the normal
/// empty-on-departure deletion.
pub fn spawn_room_sweeper(state: Arc<AppState>) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(SWEEP_INTERVAL).await;

            let cutoff = chrono::Utc::now() - chrono::Duration::hours(MAX_EMPTY_ROOM_AGE_HOURS);
            let mut reg = state.registry.write().await;
            reg.rooms.retain(|room_id, room| {
                let stale = room.members.is_empty() && room.created_at < cutoff;
                if stale {
                    if let Some(timer) = room.host_absent_timer.take() {
                        timer.abort();
                    }
                    tracing::info!(room = %room_id, "swept stale empty room");
                }
                !stale
            });
        }
    });
}
