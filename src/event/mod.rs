// Event-driven architecture components
//
// Every room owns one ordered event queue. A single subscription drains it,
// so all events addressed to a room are applied one at a time in arrival
// order while different rooms run independently.

// Public API - what other modules can use
pub use bus::{Attachment, EventBus};
pub use events::{RoomEvent, RoomSnapshot};
pub use room_handler::{RoomEventError, RoomEventHandler};
pub use room_subscription::RoomSubscription;

// Internal modules
mod bus;
mod events;
mod room_handler;
mod room_subscription;
