mod grace;
mod room;
pub mod stats;

use crate::config::Config;
use crate::protocol::ServerMessage;
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// The two process-wide maps: live rooms and grace-period entries.
///
/// Both sit behind one lock so a rejoin consuming a pending removal and that
/// entry's own expiry timer can never interleave; every command and timer
/// finalization runs its whole read-modify-broadcast cycle under the write
/// guard.
#[derive(Debug, Default)]
pub struct Registry {
    pub rooms: HashMap<RoomId, Room>,
    pub pending: HashMap<ClientId, PendingRemoval>,
}

impl Registry {
    /// The room currently holding `conn_id`'s seat, if any
    pub fn room_of(&self, conn_id: &str) -> Option<RoomId> {
        self.rooms
            .values()
            .find(|r| r.members.contains_key(conn_id))
            .map(|r| r.id.clone())
    }
}

/// Shared application state.
///
/// Lock order is registry before connections, never the reverse.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RwLock<Registry>>,
    /// Outbound channel per live WebSocket connection. Sends are
    /// fire-and-forget; a gone receiver is not an error.
    pub connections: Arc<RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<ServerMessage>>>>,
    pub config: Config,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            registry: Arc::new(RwLock::new(Registry::default())),
            connections: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
