use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

use crate::{
    event::{Attachment, EventBus, RoomEvent, RoomSnapshot, RoomSubscription},
    poker::{IdGenerator, RoomCodeGenerator, SessionMachine},
    shared::AppError,
    websockets::{messages::ClientEvent, ConnectionManager, RoomSession},
};

const MAX_CODE_ATTEMPTS: usize = 32;

/// Service for handling room business logic
///
/// Rooms are started lazily when the first WebSocket attaches to a code and
/// live until the last one detaches.
pub struct RoomService {
    event_bus: EventBus,
    connection_manager: Arc<dyn ConnectionManager>,
    ids: Arc<dyn IdGenerator>,
    codes: Arc<dyn RoomCodeGenerator>,
    notify_rejections: bool,
}

impl RoomService {
    pub fn new(
        event_bus: EventBus,
        connection_manager: Arc<dyn ConnectionManager>,
        ids: Arc<dyn IdGenerator>,
        codes: Arc<dyn RoomCodeGenerator>,
        notify_rejections: bool,
    ) -> Self {
        Self {
            event_bus,
            connection_manager,
            ids,
            codes,
            notify_rejections,
        }
    }

    /// Attach a connection to a room, starting the room's session if needed
    #[instrument(skip(self))]
    pub async fn attach(&self, room_code: &str, connection_id: &str) {
        if let Attachment::Opened(receiver) = self.event_bus.attach(room_code).await {
            let machine = SessionMachine::new(room_code.to_string(), Arc::clone(&self.ids));
            let session = RoomSession::new(
                machine,
                Arc::clone(&self.connection_manager),
                self.notify_rejections,
            );
            RoomSubscription::new(room_code.to_string(), Box::new(session), receiver).start();
            info!(room_code = %room_code, "Room session started");
        }

        self.event_bus
            .emit_to_room(
                room_code,
                RoomEvent::ConnectionOpened {
                    connection_id: connection_id.to_string(),
                },
            )
            .await;
    }

    /// Forward a client event to the room's session
    pub async fn dispatch(&self, room_code: &str, connection_id: &str, event: ClientEvent) {
        let delivered = self
            .event_bus
            .emit_to_room(
                room_code,
                RoomEvent::ClientEvent {
                    connection_id: connection_id.to_string(),
                    event,
                },
            )
            .await;

        if !delivered {
            warn!(
                room_code = %room_code,
                connection_id = %connection_id,
                "Event for a room without a session was dropped"
            );
        }
    }

    /// Detach a connection; the room's session stops after the last one
    #[instrument(skip(self))]
    pub async fn detach(&self, room_code: &str, connection_id: &str) {
        self.event_bus
            .emit_to_room(
                room_code,
                RoomEvent::ConnectionClosed {
                    connection_id: connection_id.to_string(),
                },
            )
            .await;
        self.event_bus.detach(room_code).await;
    }

    /// Current state of a live room
    #[instrument(skip(self))]
    pub async fn snapshot(&self, room_code: &str) -> Result<RoomSnapshot, AppError> {
        let (reply, response) = oneshot::channel();
        let delivered = self
            .event_bus
            .emit_to_room(room_code, RoomEvent::SnapshotRequested { reply })
            .await;
        if !delivered {
            return Err(AppError::NotFound(format!("Room {} not found", room_code)));
        }

        response
            .await
            .map_err(|_| AppError::NotFound(format!("Room {} not found", room_code)))
    }

    /// A fresh room code that no live room is using
    #[instrument(skip(self))]
    pub async fn reserve_code(&self) -> Result<String, AppError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = self.codes.generate();
            if !self.event_bus.has_room(&code).await {
                debug!(room_code = %code, "Generated room code");
                return Ok(code);
            }
        }

        warn!("Could not find a free room code");
        Err(AppError::Internal)
    }
}
