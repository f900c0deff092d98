use async_trait::async_trait;
use thiserror::Error;

use super::events::RoomEvent;

/// Errors that can occur when handling room events
#[derive(Debug, Error)]
pub enum RoomEventError {
    #[error("Handler error: {0}")]
    HandlerError(String),
}

/// Trait for components that own a room and react to its events
///
/// The handler is driven by exactly one task, so it may keep room state
/// in `&mut self` without further locking.
#[async_trait]
pub trait RoomEventHandler: Send {
    /// Handle a room event
    ///
    /// The handler should:
    /// - Apply the event to the room it owns
    /// - Notify the room's members of the outcome
    /// - Return Ok(()) on success or RoomEventError on failure
    async fn handle_room_event(
        &mut self,
        room_code: &str,
        event: RoomEvent,
    ) -> Result<(), RoomEventError>;

    /// Get a human-readable name for this handler (for logging/debugging)
    fn handler_name(&self) -> &'static str;
}
