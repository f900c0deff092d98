pub mod assertions;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use assertions::{MessageAssertion, RoomContent};
#[allow(unused_imports)]
pub use mocks::{CountingIds, MockConnectionManager};
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
