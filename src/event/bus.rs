use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

use super::events::RoomEvent;

/// Outcome of attaching a connection to a room
#[derive(Debug)]
pub enum Attachment {
    /// The room already had a live queue
    Existing,
    /// A queue was opened for the room; the caller must start draining it
    Opened(mpsc::UnboundedReceiver<RoomEvent>),
}

#[derive(Debug)]
struct RoomChannel {
    sender: mpsc::UnboundedSender<RoomEvent>,
    attached: usize,
}

/// Event bus for distributing events to room sessions
///
/// A room's queue lives exactly as long as at least one connection is
/// attached to it. Dropping the last sender lets the session drain what is
/// left and stop.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    /// Room-specific event queues: room_code -> channel
    room_channels: Arc<RwLock<HashMap<String, RoomChannel>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection with a room, opening its queue if needed
    pub async fn attach(&self, room_code: &str) -> Attachment {
        let mut room_channels = self.room_channels.write().await;

        if let Some(channel) = room_channels.get_mut(room_code) {
            if !channel.sender.is_closed() {
                channel.attached += 1;
                debug!(room_code = %room_code, attached = channel.attached, "Attached to room queue");
                return Attachment::Existing;
            }
        }

        debug!(room_code = %room_code, "Opening room queue");
        let (sender, receiver) = mpsc::unbounded_channel();
        room_channels.insert(
            room_code.to_string(),
            RoomChannel {
                sender,
                attached: 1,
            },
        );
        Attachment::Opened(receiver)
    }

    /// Release a connection; the queue closes when the last one leaves
    pub async fn detach(&self, room_code: &str) {
        let mut room_channels = self.room_channels.write().await;

        if let Some(channel) = room_channels.get_mut(room_code) {
            channel.attached = channel.attached.saturating_sub(1);
            if channel.attached == 0 {
                room_channels.remove(room_code);
                debug!(room_code = %room_code, "Closed room queue");
            }
        }
    }

    /// Emits an event to a room's session. Returns false if the room has no live queue.
    pub async fn emit_to_room(&self, room_code: &str, event: RoomEvent) -> bool {
        let room_channels = self.room_channels.read().await;

        match room_channels.get(room_code) {
            Some(channel) => match channel.sender.send(event) {
                Ok(()) => true,
                Err(_) => {
                    debug!(room_code = %room_code, "Room session is gone, event dropped");
                    false
                }
            },
            None => {
                debug!(room_code = %room_code, "No room queue found, event dropped");
                false
            }
        }
    }

    pub async fn has_room(&self, room_code: &str) -> bool {
        self.room_channels.read().await.contains_key(room_code)
    }

    pub async fn room_count(&self) -> usize {
        self.room_channels.read().await.len()
    }
}
