// Planning poker domain: room state, the per-room state machine and vote statistics

pub use errors::Rejection;
pub use export::stories_to_csv;
pub use ids::{IdGenerator, RandomRoomCodeGenerator, RoomCodeGenerator, UuidIdGenerator};
pub use machine::{SessionMachine, Transition};
pub use statistics::{compute_statistics, VoteStatistics};

mod errors;
pub mod export;
pub mod ids;
pub mod machine;
pub mod models;
pub mod statistics;
