// Library crate for the planning poker server
// This file exposes the public API for the binary, the client and integration tests

pub mod app;
pub mod client;
pub mod config;
pub mod event;
pub mod poker;
pub mod room;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use client::RoomClient;
pub use event::{EventBus, RoomEvent, RoomSubscription};
pub use shared::{AppError, AppState};
pub use websockets::{
    ClientEvent, ConnectionManager, MessageHandler, ServerMessage, WebsocketReceiveHandler,
};
