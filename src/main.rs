use planning_poker::{
    app::build_router,
    config::{ServerConfig, DEFAULT_LOG_FILTER},
    event::EventBus,
    poker::{RandomRoomCodeGenerator, UuidIdGenerator},
    room::RoomService,
    shared::AppState,
    websockets::{ConnectionManager, InMemoryConnectionManager},
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    info!(
        bind_addr = %config.bind_addr,
        notify_rejections = config.notify_rejections,
        "Starting planning poker server"
    );

    let connection_manager: Arc<dyn ConnectionManager> = Arc::new(InMemoryConnectionManager::new());
    let room_service = RoomService::new(
        EventBus::new(),
        Arc::clone(&connection_manager),
        Arc::new(UuidIdGenerator::new()),
        Arc::new(RandomRoomCodeGenerator::new()),
        config.notify_rejections,
    );
    let app_state = AppState::new(Arc::new(room_service), connection_manager);

    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server running on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}
