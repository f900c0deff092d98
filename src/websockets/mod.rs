// Public API
pub use connection_manager::{ConnectionManager, InMemoryConnectionManager};
pub use handler::{websocket_handler, WebsocketReceiveHandler};
pub use messages::{ClientEvent, ServerMessage};
pub use room_session::RoomSession;
pub use socket::MessageHandler;

// Internal modules
mod connection_manager;
mod handler;
pub mod messages;
mod room_session;
mod socket;
