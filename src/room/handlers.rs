use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use tracing::{info, instrument};

use super::{normalize_room_code, types::CreateRoomResponse};
use crate::{
    poker::{export::export_file_name, models::RoomView, stories_to_csv},
    shared::{AppError, AppState},
};

/// HTTP handler for reserving a new room code
///
/// POST /rooms
/// The room itself starts when the first client attaches to the code
#[instrument(name = "create_room", skip(state))]
pub async fn create_room(
    State(state): State<AppState>,
) -> Result<Json<CreateRoomResponse>, AppError> {
    let code = state.room_service.reserve_code().await?;

    info!(room_code = %code, "Room code reserved");

    Ok(Json(CreateRoomResponse { code }))
}

/// HTTP handler for the current state of a live room
///
/// GET /rooms/{code}
#[instrument(name = "get_room", skip(state))]
pub async fn get_room(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<RoomView>, AppError> {
    let code = normalize_room_code(&code)?;
    let snapshot = state.room_service.snapshot(&code).await?;

    Ok(Json(snapshot.room))
}

/// HTTP handler for the CSV report of every story in a live room
///
/// GET /rooms/{code}/export
#[instrument(name = "export_room", skip(state))]
pub async fn export_room(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let code = normalize_room_code(&code)?;
    let snapshot = state.room_service.snapshot(&code).await?;
    let csv = stories_to_csv(&snapshot.stories);

    info!(
        room_code = %code,
        stories = snapshot.stories.len(),
        "Exporting room results"
    );

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(Utc::now().date_naive())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
