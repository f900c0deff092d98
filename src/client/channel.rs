use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use super::listeners::{ListenerId, ListenerRegistry};
use super::projection::{ConnectionStatus, RoomProjection};
use crate::poker::models::{is_valid_room_code, ChatMessage, RoomView};
use crate::websockets::messages::{BroadcastKind, ClientEvent, RejectionNotice, ServerMessage};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid room code: {0}")]
    InvalidRoomCode(String),
    #[error("Connect failed: {0}")]
    ConnectFailed(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Connection closed")]
    Disconnected,
}

/// State shared between the client handle and its reader task
struct ClientState {
    projection: RwLock<RoomProjection>,
    listeners: RwLock<ListenerRegistry>,
}

/// One participant's connection to one room
///
/// Owns its listener table and local projection. Both go away with the
/// client; nothing is shared between clients.
pub struct RoomClient {
    room_code: String,
    outbound: mpsc::UnboundedSender<Message>,
    state: Arc<ClientState>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl RoomClient {
    /// Open a WebSocket to `{server_url}/ws/{room_code}`
    ///
    /// `server_url` is the server's base, e.g. `ws://127.0.0.1:8080`.
    pub async fn connect(server_url: &str, room_code: &str) -> Result<Self, ClientError> {
        let room_code = room_code.trim().to_ascii_uppercase();
        if !is_valid_room_code(&room_code) {
            return Err(ClientError::InvalidRoomCode(room_code));
        }

        let url = format!("{}/ws/{}", server_url.trim_end_matches('/'), room_code);
        let (ws, _) = connect_async(url.as_str()).await?;
        info!(room_code = %room_code, url = %url, "Connected to room");

        let (mut sink, mut stream) = ws.split();
        let (outbound, mut outbound_receiver) = mpsc::unbounded_channel::<Message>();
        let state = Arc::new(ClientState {
            projection: RwLock::new(RoomProjection::new()),
            listeners: RwLock::new(ListenerRegistry::new()),
        });

        let writer = tokio::spawn(async move {
            while let Some(message) = outbound_receiver.recv().await {
                if let Err(e) = sink.send(message).await {
                    warn!(error = %e, "Failed to send frame");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let reader_state = Arc::clone(&state);
        let reader_code = room_code.clone();
        let reader = tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => reader_state.receive(&reader_code, &text).await,
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!(room_code = %reader_code, error = %e, "Room connection failed");
                        break;
                    }
                }
            }
            reader_state
                .projection
                .write()
                .await
                .set_status(ConnectionStatus::Disconnected);
            info!(room_code = %reader_code, "Disconnected from room");
        });

        Ok(Self {
            room_code,
            outbound,
            state,
            reader,
            writer,
        })
    }

    pub fn room_code(&self) -> &str {
        &self.room_code
    }

    /// Fire-and-forget; effects show up in a later broadcast
    pub fn send(&self, event: &ClientEvent) -> Result<(), ClientError> {
        let text = serde_json::to_string(event)?;
        debug!(room_code = %self.room_code, event_type = event.kind(), "Sending event");
        self.outbound
            .send(Message::Text(text))
            .map_err(|_| ClientError::Disconnected)
    }

    pub async fn on_room_update<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&RoomView) + Send + Sync + 'static,
    {
        self.state.listeners.write().await.add(
            BroadcastKind::RoomUpdate,
            Arc::new(move |message: &ServerMessage| {
                if let ServerMessage::RoomUpdate(room) = message {
                    listener(room);
                }
            }),
        )
    }

    pub async fn on_chat_message<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ChatMessage) + Send + Sync + 'static,
    {
        self.state.listeners.write().await.add(
            BroadcastKind::ChatMessage,
            Arc::new(move |message: &ServerMessage| {
                if let ServerMessage::ChatMessage(chat) = message {
                    listener(chat);
                }
            }),
        )
    }

    pub async fn on_action_rejected<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&RejectionNotice) + Send + Sync + 'static,
    {
        self.state.listeners.write().await.add(
            BroadcastKind::ActionRejected,
            Arc::new(move |message: &ServerMessage| {
                if let ServerMessage::ActionRejected(notice) = message {
                    listener(notice);
                }
            }),
        )
    }

    pub async fn remove_listener(&self, id: ListenerId) -> bool {
        self.state.listeners.write().await.remove(id)
    }

    /// Copy of the local view as of now
    pub async fn projection(&self) -> RoomProjection {
        self.state.projection.read().await.clone()
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.state.projection.read().await.status()
    }

    /// Close the socket and drop every listener
    pub async fn disconnect(self) {
        let RoomClient {
            room_code,
            outbound,
            state,
            reader,
            writer,
        } = self;

        state.listeners.write().await.clear();

        let _ = outbound.send(Message::Close(None));
        drop(outbound);
        let _ = writer.await;

        reader.abort();
        let _ = reader.await;

        state
            .projection
            .write()
            .await
            .set_status(ConnectionStatus::Disconnected);
        info!(room_code = %room_code, "Room client shut down");
    }
}

impl ClientState {
    async fn receive(&self, room_code: &str, text: &str) {
        let message = match serde_json::from_str::<ServerMessage>(text) {
            Ok(message) => message,
            Err(e) => {
                debug!(room_code = %room_code, error = %e, "Ignoring unrecognised frame");
                return;
            }
        };

        self.projection.write().await.apply(&message);

        // Listeners run with no lock held so they may call back into the client
        let listeners = self.listeners.read().await.listeners_for(message.kind());
        for listener in listeners {
            listener(&message);
        }
    }
}
