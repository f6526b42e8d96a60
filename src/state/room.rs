//! Room command mutations.
//!
//! Every command takes the registry write guard, applies one atomic
//! mutation, and broadcasts the resulting snapshot. Unauthorized,
//! invalid-state, and not-found commands are silently discarded (with a
//! diagnostic log); clients may be stale or hostile and must never see a
//! fault. Vote values are confidential until reveal and never appear in
//! log lines.

use crate::state::AppState;
use crate::types::*;

impl AppState {
    /// Join a room, creating it if needed. A matching grace-period entry is
    /// consumed first: the disconnected member's seat, vote, and host role
    /// carry over to the new connection and the values in this join request
    /// are ignored.
    #[allow(clippy::too_many_arguments)]
    pub async fn join_room(
        &self,
        conn_id: &str,
        room_id: &str,
        user_name: String,
        is_observer: bool,
        card_set: CardSet,
        special_effects: bool,
        client_id: Option<ClientId>,
    ) {
        let mut reg = self.registry.write().await;

        // a connection holds at most one seat
        if let Some(prior) = reg.room_of(conn_id) {
            if prior != room_id {
                tracing::debug!(from = %prior, to = %room_id, "connection switching rooms");
                self.finalize_departure(&mut reg, &prior, conn_id).await;
            }
        }

        if let Some(cid) = &client_id {
            if let Some(entry) = reg.pending.remove(cid) {
                entry.timer.abort();
                if entry.room_id == room_id {
                    if let Some(room) = reg.rooms.get_mut(room_id) {
                        if let Some(member) = room.members.remove(&entry.old_connection_id) {
                            room.members.insert(conn_id.to_string(), member);
                            if room.host_id == entry.old_connection_id {
                                room.host_id = conn_id.to_string();
                                if let Some(timer) = room.host_absent_timer.take() {
                                    timer.abort();
                                }
                            }
                            tracing::info!(room = %room_id, "member reconnected within grace period");
                            self.broadcast_room(room).await;
                            return;
                        }
                    }
                    // seat already gone; fall through to a fresh join
                } else {
                    // stale entry for another room: finalize as if expired
                    let (old_room, old_conn) =
                        (entry.room_id.clone(), entry.old_connection_id.clone());
                    tracing::debug!(room = %old_room, "finalizing stale pending removal");
                    self.finalize_departure(&mut reg, &old_room, &old_conn).await;
                }
            }
        }

        // creation defaults apply exactly once; later joiners inherit the
        // room's card set and effects flag
        let room = reg.rooms.entry(room_id.to_string()).or_insert_with(|| {
            tracing::info!(room = %room_id, "created room");
            Room::new(
                room_id.to_string(),
                conn_id.to_string(),
                card_set,
                special_effects,
            )
        });

        let name = if user_name.trim().is_empty() {
            format!("User {}", room.members.len() + 1)
        } else {
            user_name
        };

        room.members.insert(
            conn_id.to_string(),
            Member {
                name,
                vote: None,
                is_observer,
                client_id,
            },
        );
        tracing::info!(room = %room_id, "member joined");
        self.broadcast_room(room).await;
    }

    /// Record a member's vote (`None` clears it). Ignored while the room is
    /// revealed. May trigger auto-reveal.
    pub async fn vote(&self, conn_id: &str, room_id: &str, vote: Option<VoteValue>) {
        let mut reg = self.registry.write().await;
        let Some(room) = reg.rooms.get_mut(room_id) else {
            return;
        };
        if room.revealed {
            tracing::debug!(room = %room_id, "vote ignored while revealed");
            return;
        }
        let Some(member) = room.members.get_mut(conn_id) else {
            tracing::debug!(room = %room_id, "vote from non-member ignored");
            return;
        };
        member.vote = vote;
        tracing::debug!(room = %room_id, "vote recorded");

        if room.auto_reveal && room.all_eligible_voted() {
            room.revealed = true;
            tracing::info!(room = %room_id, "auto-reveal triggered");
        }
        self.broadcast_room(room).await;
    }

    /// Reveal all votes. Host only.
    pub async fn reveal(&self, conn_id: &str, room_id: &str) {
        let mut reg = self.registry.write().await;
        let Some(room) = reg.rooms.get_mut(room_id) else {
            return;
        };
        if room.host_id != conn_id {
            tracing::warn!(room = %room_id, conn = %conn_id, "unauthorized reveal attempt");
            return;
        }
        room.revealed = true;
        tracing::info!(room = %room_id, "cards revealed");
        self.broadcast_room(room).await;
    }

    /// Start a new round: hide votes and clear every member's vote. Host only.
    pub async fn reset(&self, conn_id: &str, room_id: &str) {
        let mut reg = self.registry.write().await;
        let Some(room) = reg.rooms.get_mut(room_id) else {
            return;
        };
        if room.host_id != conn_id {
            tracing::warn!(room = %room_id, conn = %conn_id, "unauthorized reset attempt");
            return;
        }
        room.revealed = false;
        for member in room.members.values_mut() {
            member.vote = None;
        }
        tracing::info!(room = %room_id, "votes reset");
        self.broadcast_room(room).await;
    }

    /// Set the story title, truncated to 200 code points. Host only.
    pub async fn set_story(&self, conn_id: &str, room_id: &str, story_title: String) {
        let mut reg = self.registry.write().await;
        let Some(room) = reg.rooms.get_mut(room_id) else {
            return;
        };
        if room.host_id != conn_id {
            tracing::warn!(room = %room_id, conn = %conn_id, "unauthorized set-story attempt");
            return;
        }
        room.story_title = story_title.chars().take(MAX_STORY_TITLE_CHARS).collect();
        self.broadcast_room(room).await;
    }

    /// Toggle automatic reveal once every eligible member has voted. Host only.
    pub async fn toggle_auto_reveal(&self, conn_id: &str, room_id: &str, auto_reveal: bool) {
        let mut reg = self.registry.write().await;
        let Some(room) = reg.rooms.get_mut(room_id) else {
            return;
        };
        if room.host_id != conn_id {
            tracing::warn!(room = %room_id, conn = %conn_id, "unauthorized auto-reveal toggle");
            return;
        }
        room.auto_reveal = auto_reveal;
        self.broadcast_room(room).await;
    }

    /// Take over the host seat. Accepted only from a current member and only
    /// while the host is absent from the member set.
    pub async fn claim_host(&self, conn_id: &str, room_id: &str) {
        let mut reg = self.registry.write().await;
        let Some(room) = reg.rooms.get_mut(room_id) else {
            return;
        };
        if !room.members.contains_key(conn_id) {
            tracing::debug!(room = %room_id, "claim-host from non-member ignored");
            return;
        }
        if room.host_present() {
            tracing::debug!(room = %room_id, "claim-host rejected, host still present");
            return;
        }
        room.host_id = conn_id.to_string();
        if let Some(timer) = room.host_absent_timer.take() {
            timer.abort();
        }
        tracing::info!(room = %room_id, conn = %conn_id, "host seat claimed");
        self.broadcast_room(room).await;
    }

    /// Evict a member. Host only; a host cannot evict itself. Any grace
    /// entry for the target's seat is retired so it cannot rejoin into a
    /// removed seat.
    pub async fn remove_participant(&self, actor_id: &str, room_id: &str, target_id: &str) {
        let mut reg = self.registry.write().await;
        {
            let Some(room) = reg.rooms.get(room_id) else {
                return;
            };
            if room.host_id != actor_id {
                tracing::warn!(room = %room_id, conn = %actor_id, "unauthorized remove-participant attempt");
                return;
            }
            if target_id == actor_id {
                tracing::debug!(room = %room_id, "self-eviction rejected");
                return;
            }
            if !room.members.contains_key(target_id) {
                return;
            }
        }

        let stale_client = reg
            .pending
            .iter()
            .find(|(_, p)| p.room_id == room_id && p.old_connection_id == target_id)
            .map(|(cid, _)| cid.clone());
        if let Some(cid) = stale_client {
            if let Some(entry) = reg.pending.remove(&cid) {
                entry.timer.abort();
            }
        }

        if let Some(room) = reg.rooms.get_mut(room_id) {
            room.members.remove(target_id);
            tracing::info!(room = %room_id, "participant removed by host");
        }

        self.send_to(
            target_id,
            crate::protocol::ServerMessage::RemovedFromRoom {
                room_id: room_id.to_string(),
            },
        )
        .await;

        if let Some(room) = reg.rooms.get(room_id) {
            self.broadcast_room(room).await;
        }
    }
}
