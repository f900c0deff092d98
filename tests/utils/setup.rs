#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::{json, Value};
use std::sync::Arc;

use planning_poker::{
    event::EventBus,
    poker::RandomRoomCodeGenerator,
    room::RoomService,
    websockets::{ConnectionManager, MessageHandler, WebsocketReceiveHandler},
};

use super::mocks::{CountingIds, MockConnectionManager};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub room_code: String,
    pub room_service: Arc<RoomService>,
    pub mock_conn_manager: Arc<MockConnectionManager>,
    pub input_handler: WebsocketReceiveHandler,
}

pub struct TestSetupBuilder {
    room_code: String,
    connections: Vec<String>,
    notify_rejections: bool,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            room_code: "ABC123".to_string(),
            connections: vec![],
            notify_rejections: false,
        }
    }

    /// Connections attached to the room before the test starts; none have joined yet
    pub fn with_connections(mut self, connections: Vec<&str>) -> Self {
        self.connections = connections.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_rejection_notices(mut self) -> Self {
        self.notify_rejections = true;
        self
    }

    pub async fn build(self) -> TestSetup {
        let mock_conn_manager = Arc::new(MockConnectionManager::new());
        let room_service = Arc::new(RoomService::new(
            EventBus::new(),
            mock_conn_manager.clone(),
            Arc::new(CountingIds::new()),
            Arc::new(RandomRoomCodeGenerator::new()),
            self.notify_rejections,
        ));
        let input_handler = WebsocketReceiveHandler::new(Arc::clone(&room_service));

        let setup = TestSetup {
            room_code: self.room_code,
            room_service,
            mock_conn_manager,
            input_handler,
        };
        for connection_id in &self.connections {
            setup.connect(connection_id).await;
        }
        setup
    }
}

// ============================================================================
// Client actions, sent as raw JSON frames through the receive handler
// ============================================================================

impl TestSetup {
    pub async fn connect(&self, connection_id: &str) {
        let (sender, _receiver) = tokio::sync::mpsc::unbounded_channel();
        self.mock_conn_manager
            .add_connection(connection_id.to_string(), sender)
            .await;
        self.room_service
            .attach(&self.room_code, connection_id)
            .await;
    }

    pub async fn disconnect(&self, connection_id: &str) {
        self.mock_conn_manager
            .remove_connection(connection_id)
            .await;
        self.room_service
            .detach(&self.room_code, connection_id)
            .await;
    }

    pub async fn send_frame(&self, connection_id: &str, frame: Value) {
        self.input_handler
            .handle_message(connection_id, &self.room_code, frame.to_string())
            .await;
    }

    pub async fn send_join(&self, connection_id: &str, user_id: &str, name: &str, moderator: bool) {
        self.send_frame(
            connection_id,
            json!({
                "type": "join_room",
                "payload": {
                    "user": {"id": user_id, "name": name, "isModerator": moderator},
                    "room": {"code": self.room_code, "name": "Sprint 12"}
                }
            }),
        )
        .await;
    }

    pub async fn send_add_story(&self, connection_id: &str, title: &str) {
        self.send_frame(
            connection_id,
            json!({"type": "add_story", "payload": {"title": title}}),
        )
        .await;
    }

    pub async fn send_vote(&self, connection_id: &str, user_id: &str, value: &str) {
        self.send_frame(
            connection_id,
            json!({"type": "vote", "payload": {"userId": user_id, "value": value}}),
        )
        .await;
    }

    pub async fn send_reveal(&self, connection_id: &str) {
        self.send_frame(connection_id, json!({"type": "reveal_votes"}))
            .await;
    }

    pub async fn send_re_estimate(&self, connection_id: &str) {
        self.send_frame(connection_id, json!({"type": "re_estimate"}))
            .await;
    }

    pub async fn send_end_voting(&self, connection_id: &str) {
        self.send_frame(connection_id, json!({"type": "end_voting"}))
            .await;
    }

    pub async fn send_final_estimate(&self, connection_id: &str, value: &str) {
        self.send_frame(
            connection_id,
            json!({"type": "set_final_estimate", "payload": {"value": value}}),
        )
        .await;
    }

    pub async fn send_chat(&self, connection_id: &str, message: &str) {
        self.send_frame(
            connection_id,
            json!({"type": "send_message", "payload": {"message": message}}),
        )
        .await;
    }

    pub async fn send_leave(&self, connection_id: &str) {
        self.send_frame(connection_id, json!({"type": "leave_room"}))
            .await;
    }

    /// Wait until the room task has applied everything sent so far
    pub async fn settle(&self) {
        let _ = self.room_service.snapshot(&self.room_code).await;
    }

    pub async fn clear_messages(&self) {
        self.settle().await;
        self.mock_conn_manager.clear_messages().await;
    }
}
