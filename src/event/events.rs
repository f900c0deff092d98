use tokio::sync::oneshot;

use crate::poker::models::{RoomView, Story};
use crate::websockets::messages::ClientEvent;

/// Events delivered to a room's session, in arrival order
#[derive(Debug)]
pub enum RoomEvent {
    /// A WebSocket attached to the room
    ConnectionOpened { connection_id: String },

    /// A well-formed event sent by a client
    ClientEvent {
        connection_id: String,
        event: ClientEvent,
    },

    /// A WebSocket detached from the room
    ConnectionClosed { connection_id: String },

    /// Read-only query for the current room state
    SnapshotRequested { reply: oneshot::Sender<RoomSnapshot> },
}

impl RoomEvent {
    /// Get a human-readable description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            RoomEvent::ConnectionOpened { .. } => "connection_opened",
            RoomEvent::ClientEvent { event, .. } => event.kind(),
            RoomEvent::ConnectionClosed { .. } => "connection_closed",
            RoomEvent::SnapshotRequested { .. } => "snapshot_requested",
        }
    }
}

/// Room state plus every story estimated in it so far
#[derive(Debug, Clone)]
pub struct RoomSnapshot {
    pub room: RoomView,
    pub stories: Vec<Story>,
}
