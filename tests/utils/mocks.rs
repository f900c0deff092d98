#![allow(dead_code)] // Test utilities may not all be used in every test

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

use planning_poker::poker::IdGenerator;
use planning_poker::websockets::ConnectionManager;

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Records every frame sent to each connection instead of writing to a socket
#[derive(Clone)]
pub struct MockConnectionManager {
    sent_messages: Arc<RwLock<HashMap<String, VecDeque<String>>>>,
    connections: Arc<RwLock<Vec<String>>>,
}

impl MockConnectionManager {
    pub fn new() -> Self {
        Self {
            sent_messages: Arc::new(RwLock::new(HashMap::new())),
            connections: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn get_messages_for(&self, connection_id: &str) -> Vec<String> {
        self.sent_messages
            .read()
            .await
            .get(connection_id)
            .map(|queue| queue.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Pop the oldest frame for a connection, waiting briefly for the room task
    pub async fn consume_message_for(&self, connection_id: &str) -> Option<String> {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
        loop {
            if let Some(message) = self
                .sent_messages
                .write()
                .await
                .get_mut(connection_id)
                .and_then(VecDeque::pop_front)
            {
                return Some(message);
            }
            if tokio::time::Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    pub async fn is_connected(&self, connection_id: &str) -> bool {
        self.connections
            .read()
            .await
            .iter()
            .any(|c| c == connection_id)
    }

    pub async fn clear_messages(&self) {
        self.sent_messages.write().await.clear();
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    async fn add_connection(&self, connection_id: String, _sender: mpsc::UnboundedSender<String>) {
        self.connections.write().await.push(connection_id);
    }

    async fn remove_connection(&self, connection_id: &str) {
        self.connections
            .write()
            .await
            .retain(|c| c != connection_id);
    }

    async fn send_to_connection(&self, connection_id: &str, message: &str) {
        self.sent_messages
            .write()
            .await
            .entry(connection_id.to_string())
            .or_default()
            .push_back(message.to_string());
    }

    async fn send_to_connections(&self, connection_ids: &[String], message: &str) {
        for connection_id in connection_ids {
            self.send_to_connection(connection_id, message).await;
        }
    }

    async fn count_connections(&self) -> usize {
        self.connections.read().await.len()
    }
}

/// Predictable ids so assertions can name stories and messages
pub struct CountingIds(AtomicUsize);

impl CountingIds {
    pub fn new() -> Self {
        Self(AtomicUsize::new(1))
    }

    fn next(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.0.fetch_add(1, Ordering::SeqCst))
    }
}

impl IdGenerator for CountingIds {
    fn room_id(&self) -> String {
        self.next("room")
    }

    fn participant_id(&self) -> String {
        self.next("user")
    }

    fn story_id(&self) -> String {
        self.next("story")
    }

    fn message_id(&self) -> String {
        self.next("msg")
    }
}
