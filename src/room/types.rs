use serde::{Deserialize, Serialize};

/// Response for room code reservation
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub code: String,
}
