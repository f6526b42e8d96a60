//! Wire protocol: one message type per verb, tagged with `t`.
//!
//! Event names and payload fields mirror the browser client exactly
//! (kebab-case verbs, camelCase fields), so a deployed frontend keeps
//! working unchanged.

use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    JoinRoom {
        room_id: RoomId,
        #[serde(default)]
        user_name: String,
        #[serde(default)]
        is_observer: bool,
        /// Applied only when this join creates the room
        #[serde(default)]
        card_set: CardSet,
        /// Applied only when this join creates the room
        #[serde(default)]
        special_effects: bool,
        /// Durable reconnection identity; omitted by clients that do not
        /// want a grace period
        #[serde(default)]
        client_id: Option<ClientId>,
    },
    Vote {
        room_id: RoomId,
        /// `null` clears the member's vote
        vote: Option<VoteValue>,
    },
    Reveal {
        room_id: RoomId,
    },
    Reset {
        room_id: RoomId,
    },
    SetStory {
        room_id: RoomId,
        story_title: String,
    },
    ToggleAutoReveal {
        room_id: RoomId,
        auto_reveal: bool,
    },
    ClaimHost {
        room_id: RoomId,
    },
    RemoveParticipant {
        room_id: RoomId,
        participant_id: ConnectionId,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Full room snapshot, broadcast to every member after each mutation
    RoomUpdate {
        room_id: RoomId,
        users: Vec<MemberInfo>,
        revealed: bool,
        stats: Option<VoteStatistics>,
        /// Historical wire name for the host's connection ID
        creator_id: ConnectionId,
        card_set: CardSet,
        story_title: String,
        auto_reveal: bool,
        special_effects: bool,
    },
    /// Point-to-point: sent only to an evicted connection
    RemovedFromRoom { room_id: RoomId },
    /// One-shot notice to all current members that the host is gone and the
    /// seat may be claimed
    HostAbsent { room_id: RoomId },
}

/// Public member info. `vote` carries the literal value only while the room
/// is revealed; hidden non-null votes appear as the `"voted"` sentinel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberInfo {
    pub id: ConnectionId,
    pub name: String,
    pub vote: Option<VoteValue>,
    pub is_observer: bool,
}

impl MemberInfo {
    pub fn masked(id: &ConnectionId, member: &Member, revealed: bool) -> Self {
        let vote = if revealed {
            member.vote.clone()
        } else {
            member
                .vote
                .as_ref()
                .map(|_| VoteValue::Token(HIDDEN_VOTE.to_string()))
        };
        Self {
            id: id.clone(),
            name: member.name.clone(),
            vote,
            is_observer: member.is_observer,
        }
    }
}

/// Round statistics over the numeric votes of non-observer members
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoteStatistics {
    pub average: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_room_wire_format() {
        let json = r#"{"t":"join-room","roomId":"ABC123","userName":"Alice","isObserver":false,"cardSet":"fibonacci","specialEffects":true,"clientId":"client-1"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::JoinRoom {
                room_id,
                user_name,
                card_set,
                special_effects,
                client_id,
                ..
            } => {
                assert_eq!(room_id, "ABC123");
                assert_eq!(user_name, "Alice");
                assert_eq!(card_set, CardSet::Fibonacci);
                assert!(special_effects);
                assert_eq!(client_id.as_deref(), Some("client-1"));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_join_room_defaults() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"join-room","roomId":"ABC123"}"#).unwrap();
        match msg {
            ClientMessage::JoinRoom {
                user_name,
                is_observer,
                card_set,
                client_id,
                ..
            } => {
                assert_eq!(user_name, "");
                assert!(!is_observer);
                assert_eq!(card_set, CardSet::Standard);
                assert_eq!(client_id, None);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_vote_null_clears() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"t":"vote","roomId":"R","vote":null}"#).unwrap();
        match msg {
            ClientMessage::Vote { vote, .. } => assert_eq!(vote, None),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_masked_member_info() {
        let member = Member {
            name: "Alice".to_string(),
            vote: Some(VoteValue::Number(8.0)),
            is_observer: false,
            client_id: None,
        };

        let hidden = MemberInfo::masked(&"c1".to_string(), &member, false);
        assert_eq!(hidden.vote, Some(VoteValue::Token("voted".to_string())));

        let shown = MemberInfo::masked(&"c1".to_string(), &member, true);
        assert_eq!(shown.vote, Some(VoteValue::Number(8.0)));

        let no_vote = Member { vote: None, ..member };
        let info = MemberInfo::masked(&"c1".to_string(), &no_vote, false);
        assert_eq!(info.vote, None);
    }

    #[test]
    fn test_room_update_serializes_camel_case() {
        let msg = ServerMessage::RoomUpdate {
            room_id: "R".to_string(),
            users: vec![],
            revealed: false,
            stats: None,
            creator_id: "c1".to_string(),
            card_set: CardSet::Standard,
            story_title: String::new(),
            auto_reveal: false,
            special_effects: false,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""t":"room-update""#));
        assert!(json.contains(r#""creatorId":"c1""#));
        assert!(json.contains(r#""storyTitle""#));
        assert!(json.contains(r#""autoReveal""#));
    }
}
