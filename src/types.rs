use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::task::JoinHandle;

/// Opaque ID types for type safety
pub type RoomId = String;
pub type ConnectionId = String;
pub type ClientId = String;

/// Wire value a hidden, non-null vote is replaced with in snapshots
pub const HIDDEN_VOTE: &str = "voted";

/// Story titles are truncated to this many Unicode scalar values
pub const MAX_STORY_TITLE_CHARS: usize = 200;

/// Card deck vocabulary a room uses. Fixed at room creation; later joiners
/// inherit it regardless of what they request.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CardSet {
    #[default]
    Standard,
    Fibonacci,
    Tshirt,
    Powers2,
}

/// A vote is either a number or a special card token (`?`, `☕`, shirt
/// sizes). The server never interprets tokens; only numbers reach the
/// statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum VoteValue {
    Number(f64),
    Token(String),
}

impl VoteValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            VoteValue::Number(n) => Some(*n),
            VoteValue::Token(_) => None,
        }
    }
}

/// A connection's participation record within a room
#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub vote: Option<VoteValue>,
    pub is_observer: bool,
    /// Stable client-supplied identity used to correlate reconnections.
    /// Members without one are removed immediately on disconnect.
    pub client_id: Option<ClientId>,
}

/// A voting session: members keyed by connection ID, a single host, and a
/// reveal phase gating vote visibility.
#[derive(Debug)]
pub struct Room {
    pub id: RoomId,
    pub members: HashMap<ConnectionId, Member>,
    /// Connection identity of the current host. May be temporarily absent
    /// from `members` while a grace period or host-absence window runs;
    /// absence is detected by membership lookup, never by clearing this.
    pub host_id: ConnectionId,
    pub revealed: bool,
    pub card_set: CardSet,
    pub story_title: String,
    pub auto_reveal: bool,
    pub special_effects: bool,
    /// Running exactly while `host_id` is absent from `members`. Fires a
    /// one-shot host-absence notice to the remaining members.
    pub host_absent_timer: Option<JoinHandle<()>>,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(id: RoomId, host_id: ConnectionId, card_set: CardSet, special_effects: bool) -> Self {
        Self {
            id,
            members: HashMap::new(),
            host_id,
            revealed: false,
            card_set,
            story_title: String::new(),
            auto_reveal: false,
            special_effects,
            host_absent_timer: None,
            created_at: Utc::now(),
        }
    }

    /// Host presence, per the membership lookup rule
    pub fn host_present(&self) -> bool {
        self.members.contains_key(&self.host_id)
    }

    /// Numeric votes of non-observer members, the input to statistics
    pub fn numeric_votes(&self) -> Vec<f64> {
        self.members
            .values()
            .filter(|m| !m.is_observer)
            .filter_map(|m| m.vote.as_ref().and_then(VoteValue::as_number))
            .collect()
    }

    /// True when every non-observer member has a non-null vote and there is
    /// at least one such member. A room of only observers never qualifies.
    pub fn all_eligible_voted(&self) -> bool {
        let mut any = false;
        for m in self.members.values().filter(|m| !m.is_observer) {
            if m.vote.is_none() {
                return false;
            }
            any = true;
        }
        any
    }
}

/// Grace-period entry for a disconnected member, keyed by client identity.
/// Consumed by a matching rejoin or finalized when the timer fires.
#[derive(Debug)]
pub struct PendingRemoval {
    pub room_id: RoomId,
    pub old_connection_id: ConnectionId,
    pub timer: JoinHandle<()>,
}
