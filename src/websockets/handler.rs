use async_trait::async_trait;
use axum::{
    extract::{Path, State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::room::{normalize_room_code, RoomService};
use crate::shared::{AppError, AppState};
use crate::websockets::messages::ClientEvent;

use super::socket::{Connection, MessageHandler};

/// Message handler for receiving WebSocket messages from the client
pub struct WebsocketReceiveHandler {
    room_service: Arc<RoomService>,
}

impl WebsocketReceiveHandler {
    pub fn new(room_service: Arc<RoomService>) -> Self {
        Self { room_service }
    }
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(&self, connection_id: &str, room_code: &str, message: String) {
        // Parse message and forward it to the room; malformed frames are dropped
        match serde_json::from_str::<ClientEvent>(&message) {
            Ok(event) => {
                info!(
                    connection_id = %connection_id,
                    room_code = %room_code,
                    event_type = event.kind(),
                    "Received client event"
                );
                self.room_service
                    .dispatch(room_code, connection_id, event)
                    .await;
            }
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    room_code = %room_code,
                    error = %e,
                    "Failed to parse WebSocket message"
                );
            }
        }
    }
}

/// WebSocket endpoint that attaches the caller to a room
/// GET /ws/{code}
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(code): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Response, AppError> {
    let room_code = normalize_room_code(&code).map_err(|e| {
        warn!(room_code = %code, "Rejecting WebSocket for malformed room code");
        e
    })?;

    info!(room_code = %room_code, "WebSocket connection requested");

    Ok(ws.on_upgrade(move |socket| handle_websocket_connection(socket, room_code, app_state)))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(
    socket: axum::extract::ws::WebSocket,
    room_code: String,
    app_state: AppState,
) {
    let connection_id = Uuid::new_v4().to_string();

    info!(
        room_code = %room_code,
        connection_id = %connection_id,
        "WebSocket connection established"
    );

    // Create the outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();

    app_state
        .connection_manager
        .add_connection(connection_id.clone(), outbound_sender)
        .await;
    app_state
        .room_service
        .attach(&room_code, &connection_id)
        .await;

    let message_handler = Arc::new(WebsocketReceiveHandler::new(Arc::clone(
        &app_state.room_service,
    )));

    // Wrap the axum WebSocket in our simple interface
    let connection = Connection::new(
        connection_id.clone(),
        room_code.clone(),
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    // Run the connection until disconnect
    match connection.run().await {
        Ok(()) => {
            info!(
                room_code = %room_code,
                connection_id = %connection_id,
                "WebSocket connection closed cleanly"
            );
        }
        Err(e) => {
            warn!(
                room_code = %room_code,
                connection_id = %connection_id,
                error = %e,
                "WebSocket connection error"
            );
        }
    }

    // Cleanup: stop routing frames here, then let the room forget the connection
    app_state
        .connection_manager
        .remove_connection(&connection_id)
        .await;
    app_state
        .room_service
        .detach(&room_code, &connection_id)
        .await;
}
