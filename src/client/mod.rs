// Client side of the room channel: one RoomClient per connection

pub use channel::{ClientError, RoomClient};
pub use listeners::{Listener, ListenerId, ListenerRegistry};
pub use projection::{ConnectionStatus, RoomProjection};

mod channel;
mod listeners;
mod projection;
