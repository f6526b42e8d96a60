//! WebSocket message dispatch
//!
//! One verb per message; authorization lives inside the state mutations
//! (host identity is per-room, not per-connection-role), so dispatch is a
//! straight fan-out. Commands never produce a direct reply; every effect
//! surfaces through room broadcasts.

use crate::protocol::ClientMessage;
use crate::state::AppState;

pub async fn handle_message(state: &AppState, conn_id: &str, msg: ClientMessage) {
    match msg {
        ClientMessage::JoinRoom {
            room_id,
            user_name,
            is_observer,
            card_set,
            special_effects,
            client_id,
        } => {
            state
                .join_room(
                    conn_id,
                    &room_id,
                    user_name,
                    is_observer,
                    card_set,
                    special_effects,
                    client_id,
                )
                .await
        }

        ClientMessage::Vote { room_id, vote } => state.vote(conn_id, &room_id, vote).await,

        ClientMessage::Reveal { room_id } => state.reveal(conn_id, &room_id).await,

        ClientMessage::Reset { room_id } => state.reset(conn_id, &room_id).await,

        ClientMessage::SetStory {
            room_id,
            story_title,
        } => state.set_story(conn_id, &room_id, story_title).await,

        ClientMessage::ToggleAutoReveal {
            room_id,
            auto_reveal,
        } => state.toggle_auto_reveal(conn_id, &room_id, auto_reveal).await,

        ClientMessage::ClaimHost { room_id } => state.claim_host(conn_id, &room_id).await,

        ClientMessage::RemoveParticipant {
            room_id,
            participant_id,
        } => {
            state
                .remove_participant(conn_id, &room_id, &participant_id)
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CardSet, VoteValue};

    #[tokio::test]
    async fn test_join_then_vote_through_dispatch() {
        let state = AppState::new();

        handle_message(
            &state,
            "c1",
            ClientMessage::JoinRoom {
                room_id: "R".into(),
                user_name: "Alice".into(),
                is_observer: false,
                card_set: CardSet::Standard,
                special_effects: false,
                client_id: None,
            },
        )
        .await;

        handle_message(
            &state,
            "c1",
            ClientMessage::Vote {
                room_id: "R".into(),
                vote: Some(VoteValue::Number(5.0)),
            },
        )
        .await;

        let reg = state.registry.read().await;
        let room = reg.rooms.get("R").unwrap();
        assert_eq!(
            room.members.get("c1").unwrap().vote,
            Some(VoteValue::Number(5.0))
        );
    }

    #[tokio::test]
    async fn test_commands_against_missing_room_are_discarded() {
        let state = AppState::new();

        handle_message(
            &state,
            "c1",
            ClientMessage::Reveal {
                room_id: "NOPE".into(),
            },
        )
        .await;
        handle_message(
            &state,
            "c1",
            ClientMessage::Vote {
                room_id: "NOPE".into(),
                vote: Some(VoteValue::Number(5.0)),
            },
        )
        .await;

        let reg = state.registry.read().await;
        assert!(reg.rooms.is_empty());
    }
}
