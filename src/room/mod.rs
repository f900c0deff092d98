// Public API - what other modules can use
pub use handlers::{create_room, export_room, get_room};
pub use service::RoomService;

// Internal modules
mod handlers;
mod service;
pub mod types;

use crate::{poker::models::is_valid_room_code, shared::AppError};

/// Uppercase the code supplied by a client and check its shape
pub fn normalize_room_code(raw: &str) -> Result<String, AppError> {
    let code = raw.trim().to_ascii_uppercase();
    if is_valid_room_code(&code) {
        Ok(code)
    } else {
        Err(AppError::BadRequest(format!("Invalid room code: {}", raw)))
    }
}
