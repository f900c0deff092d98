use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Routes serialized frames to live WebSocket connections
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    async fn add_connection(&self, connection_id: String, sender: mpsc::UnboundedSender<String>);

    async fn remove_connection(&self, connection_id: &str);

    async fn send_to_connection(&self, connection_id: &str, message: &str);

    async fn send_to_connections(&self, connection_ids: &[String], message: &str);

    async fn count_connections(&self) -> usize;
}

pub struct InMemoryConnectionManager {
    // connection_id -> sender
    connections: Arc<RwLock<HashMap<String, mpsc::UnboundedSender<String>>>>,
}

impl InMemoryConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn add_connection(&self, connection_id: String, sender: mpsc::UnboundedSender<String>) {
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, sender);
    }

    async fn remove_connection(&self, connection_id: &str) {
        let mut connections = self.connections.write().await;
        connections.remove(connection_id);
    }

    async fn send_to_connection(&self, connection_id: &str, message: &str) {
        let connections = self.connections.read().await;
        if let Some(sender) = connections.get(connection_id) {
            let _ = sender.send(message.to_string());
        }
    }

    async fn send_to_connections(&self, connection_ids: &[String], message: &str) {
        let connections = self.connections.read().await;
        for connection_id in connection_ids {
            if let Some(sender) = connections.get(connection_id) {
                let _ = sender.send(message.to_string());
            }
        }
    }

    async fn count_connections(&self) -> usize {
        self.connections.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_messages_reach_only_registered_connections() {
        let manager = InMemoryConnectionManager::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        manager.add_connection("a".into(), tx_a).await;
        manager.add_connection("b".into(), tx_b).await;

        manager
            .send_to_connections(&["a".to_string(), "ghost".to_string()], "hello")
            .await;
        manager.remove_connection("b").await;
        manager.send_to_connection("b", "late").await;

        assert_eq!(rx_a.recv().await.as_deref(), Some("hello"));
        assert!(rx_b.try_recv().is_err());
        assert_eq!(manager.count_connections().await, 1);
    }
}
