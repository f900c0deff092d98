use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{events::RoomEvent, room_handler::RoomEventHandler};

/// Drains one room's event queue into its handler, one event at a time
pub struct RoomSubscription {
    room_code: String,
    handler: Box<dyn RoomEventHandler>,
    receiver: mpsc::UnboundedReceiver<RoomEvent>,
}

impl RoomSubscription {
    pub fn new(
        room_code: String,
        handler: Box<dyn RoomEventHandler>,
        receiver: mpsc::UnboundedReceiver<RoomEvent>,
    ) -> Self {
        Self {
            room_code,
            handler,
            receiver,
        }
    }

    /// Start the subscription - spawns a background task that runs until
    /// every sender for the room has been dropped
    pub fn start(self) -> JoinHandle<()> {
        let RoomSubscription {
            room_code,
            mut handler,
            mut receiver,
        } = self;
        let handler_name = handler.handler_name();

        info!(
            room_code = %room_code,
            handler = handler_name,
            "Starting room subscription"
        );

        tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                debug!(
                    room_code = %room_code,
                    handler = handler_name,
                    event_type = event.event_type(),
                    "Received room event"
                );

                if let Err(e) = handler.handle_room_event(&room_code, event).await {
                    warn!(
                        room_code = %room_code,
                        handler = handler_name,
                        error = %e,
                        "Room event handler failed"
                    );
                }
            }

            info!(
                room_code = %room_code,
                handler = handler_name,
                "Room subscription ended - no more events"
            );
        })
    }
}
