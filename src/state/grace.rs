//! Disconnect handling: reconnection grace periods, host-absence timers,
//! and room teardown.
//!
//! Every timer is a spawned task whose handle lives next to the entity it
//! affects. Cancellation aborts the task while the registry write guard is
//! held, and the fire path re-checks that its entry is still the active one
//! before mutating, so a firing that lost the race is a silent no-op.

use crate::state::{AppState, Registry};
use crate::types::*;

impl AppState {
    /// Connection closed. A member that supplied a client identity keeps its
    /// seat (and vote, and host role) for the grace window; anyone else is
    /// removed on the spot.
    pub async fn handle_disconnect(&self, conn_id: &str) {
        let mut reg = self.registry.write().await;
        let Some(room_id) = reg.room_of(conn_id) else {
            return;
        };
        let client_id = reg
            .rooms
            .get(&room_id)
            .and_then(|r| r.members.get(conn_id))
            .and_then(|m| m.client_id.clone());

        match client_id {
            Some(client_id) => {
                let state = self.clone();
                let cid = client_id.clone();
                let old_conn = conn_id.to_string();
                let grace = self.config.grace_period;
                let timer = tokio::spawn(async move {
                    tokio::time::sleep(grace).await;
                    state.expire_pending_removal(&cid, &old_conn).await;
                });

                let entry = PendingRemoval {
                    room_id: room_id.clone(),
                    old_connection_id: conn_id.to_string(),
                    timer,
                };
                // a client identity has at most one live grace entry
                if let Some(stale) = reg.pending.insert(client_id, entry) {
                    stale.timer.abort();
                }
                tracing::debug!(room = %room_id, "disconnect, grace period started");
                // the seat stays occupied; no broadcast until the window
                // resolves one way or the other
            }
            None => {
                tracing::debug!(room = %room_id, "disconnect, removing immediately");
                self.finalize_departure(&mut reg, &room_id, conn_id).await;
            }
        }
    }

    /// Grace window elapsed without a matching rejoin.
    async fn expire_pending_removal(&self, client_id: &str, old_conn_id: &str) {
        let mut reg = self.registry.write().await;
        // a rejoin or eviction may have retired this entry, or replaced it
        // with one for a newer connection
        let still_active = reg
            .pending
            .get(client_id)
            .is_some_and(|p| p.old_connection_id == old_conn_id);
        if !still_active {
            return;
        }
        if let Some(entry) = reg.pending.remove(client_id) {
            tracing::info!(room = %entry.room_id, "grace period expired, removing member");
            self.finalize_departure(&mut reg, &entry.room_id, &entry.old_connection_id)
                .await;
        }
    }

    /// Remove a seat and run the departure checks: delete the room if it
    /// emptied out, start the host-absence timer if the host just left the
    /// member set, and broadcast the new snapshot otherwise.
    ///
    /// Any grace entry for this seat must already be retired by the caller.
    pub(crate) async fn finalize_departure(
        &self,
        reg: &mut Registry,
        room_id: &str,
        conn_id: &str,
    ) {
        let (now_empty, host_left) = {
            let Some(room) = reg.rooms.get_mut(room_id) else {
                return;
            };
            if room.members.remove(conn_id).is_none() {
                return;
            }
            (room.members.is_empty(), room.host_id == conn_id)
        };

        let pending_for_room = reg.pending.values().any(|p| p.room_id == room_id);
        if now_empty && !pending_for_room {
            if let Some(mut room) = reg.rooms.remove(room_id) {
                if let Some(timer) = room.host_absent_timer.take() {
                    timer.abort();
                }
            }
            tracing::info!(room = %room_id, "deleted empty room");
            return;
        }

        if host_left {
            self.start_host_absent_timer(reg, room_id);
        }

        if let Some(room) = reg.rooms.get(room_id) {
            self.broadcast_room(room).await;
        }
    }

    /// The host just left the member set: after the configured delay, tell
    /// the remaining members the seat is claimable.
    fn start_host_absent_timer(&self, reg: &mut Registry, room_id: &str) {
        let Some(room) = reg.rooms.get_mut(room_id) else {
            return;
        };
        let state = self.clone();
        let rid = room_id.to_string();
        let absent_host = room.host_id.clone();
        let delay = self.config.host_absent_delay;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            state.fire_host_absent(&rid, &absent_host).await;
        });
        if let Some(old) = room.host_absent_timer.replace(timer) {
            old.abort();
        }
        tracing::debug!(room = %room_id, "host absent, notice timer started");
    }

    /// One-shot host-absence notice. A reconnect or claim that won the race
    /// makes this a no-op.
    async fn fire_host_absent(&self, room_id: &str, absent_host: &str) {
        let reg = self.registry.read().await;
        let Some(room) = reg.rooms.get(room_id) else {
            return;
        };
        if room.host_id != absent_host || room.host_present() {
            return;
        }
        tracing::info!(room = %room_id, "notifying members of absent host");
        self.notify_host_absent(room).await;
    }
}
