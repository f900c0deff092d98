use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{room, shared::AppState, websockets};

/// All HTTP and WebSocket routes of the server
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Planning poker server" }))
        .route("/rooms", post(room::create_room))
        .route("/rooms/:code", get(room::get_room))
        .route("/rooms/:code/export", get(room::export_room))
        .route("/ws/:code", get(websockets::websocket_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
