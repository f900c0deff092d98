use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    event::{RoomEvent, RoomEventError, RoomEventHandler, RoomSnapshot},
    poker::{Rejection, SessionMachine, Transition},
    websockets::{
        connection_manager::ConnectionManager,
        messages::{ClientEvent, RejectionNotice, ServerMessage},
    },
};

/// Session authority for one room
///
/// Owns the room's state machine and the binding from WebSocket
/// connections to participants. Only the room's subscription task drives
/// it, which serializes every event addressed to the room.
pub struct RoomSession {
    machine: SessionMachine,
    // connection_id -> participant_id
    members: HashMap<String, String>,
    connection_manager: Arc<dyn ConnectionManager>,
    notify_rejections: bool,
}

impl RoomSession {
    pub fn new(
        machine: SessionMachine,
        connection_manager: Arc<dyn ConnectionManager>,
        notify_rejections: bool,
    ) -> Self {
        Self {
            machine,
            members: HashMap::new(),
            connection_manager,
            notify_rejections,
        }
    }

    async fn handle_client_event(
        &mut self,
        room_code: &str,
        connection_id: String,
        event: ClientEvent,
    ) -> Result<(), RoomEventError> {
        let kind = event.kind();
        let actor = self.members.get(&connection_id).cloned();

        match self.machine.apply(actor.as_deref(), event) {
            Ok(transition) => {
                if let Some(participant) = &transition.joined {
                    self.members
                        .insert(connection_id.clone(), participant.id.clone());
                }
                if let Some(left) = &transition.left {
                    self.members.retain(|_, participant_id| participant_id != left);
                }
                self.deliver(transition).await
            }
            Err(rejection) => {
                debug!(
                    room_code = %room_code,
                    connection_id = %connection_id,
                    event_type = kind,
                    reason = %rejection,
                    "Event rejected"
                );
                self.notify_rejection(&connection_id, kind, &rejection)
                    .await
            }
        }
    }

    async fn handle_connection_closed(
        &mut self,
        room_code: &str,
        connection_id: &str,
    ) -> Result<(), RoomEventError> {
        let Some(participant_id) = self.members.remove(connection_id) else {
            debug!(room_code = %room_code, connection_id = %connection_id, "Unjoined connection closed");
            return Ok(());
        };

        // Another tab of the same participant keeps them in the room
        if self.members.values().any(|p| *p == participant_id) {
            return Ok(());
        }

        match self.machine.remove_participant(&participant_id) {
            Some(transition) => self.deliver(transition).await,
            None => Ok(()),
        }
    }

    /// Send each broadcast to every connection bound to a current participant
    async fn deliver(&self, transition: Transition) -> Result<(), RoomEventError> {
        let recipients: Vec<String> = self
            .members
            .iter()
            .filter(|(_, participant_id)| self.machine.room().has_participant(participant_id))
            .map(|(connection_id, _)| connection_id.clone())
            .collect();

        for message in &transition.broadcasts {
            let message_json = serde_json::to_string(message).map_err(|e| {
                RoomEventError::HandlerError(format!("Failed to serialize message: {}", e))
            })?;
            self.connection_manager
                .send_to_connections(&recipients, &message_json)
                .await;
        }

        debug!(
            room_code = %self.machine.room().code,
            recipients = recipients.len(),
            broadcasts = transition.broadcasts.len(),
            "Broadcasts delivered"
        );
        Ok(())
    }

    async fn notify_rejection(
        &self,
        connection_id: &str,
        kind: &str,
        rejection: &Rejection,
    ) -> Result<(), RoomEventError> {
        if !self.notify_rejections {
            return Ok(());
        }

        let notice = ServerMessage::ActionRejected(RejectionNotice {
            event: kind.to_string(),
            reason: rejection.to_string(),
        });
        let message_json = serde_json::to_string(&notice).map_err(|e| {
            RoomEventError::HandlerError(format!("Failed to serialize message: {}", e))
        })?;
        self.connection_manager
            .send_to_connection(connection_id, &message_json)
            .await;
        Ok(())
    }
}

#[async_trait]
impl RoomEventHandler for RoomSession {
    async fn handle_room_event(
        &mut self,
        room_code: &str,
        event: RoomEvent,
    ) -> Result<(), RoomEventError> {
        match event {
            RoomEvent::ConnectionOpened { connection_id } => {
                info!(
                    room_code = %room_code,
                    connection_id = %connection_id,
                    "Connection attached to room"
                );
                Ok(())
            }
            RoomEvent::ClientEvent {
                connection_id,
                event,
            } => {
                self.handle_client_event(room_code, connection_id, event)
                    .await
            }
            RoomEvent::ConnectionClosed { connection_id } => {
                self.handle_connection_closed(room_code, &connection_id)
                    .await
            }
            RoomEvent::SnapshotRequested { reply } => {
                let snapshot = RoomSnapshot {
                    room: self.machine.room().view(),
                    stories: self.machine.stories(),
                };
                if reply.send(snapshot).is_err() {
                    warn!(room_code = %room_code, "Snapshot requester went away");
                }
                Ok(())
            }
        }
    }

    fn handler_name(&self) -> &'static str {
        "RoomSession"
    }
}
