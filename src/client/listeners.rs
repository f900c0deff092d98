use std::collections::HashMap;
use std::sync::Arc;

use crate::websockets::messages::{BroadcastKind, ServerMessage};

/// Callback invoked for every broadcast of the kind it was registered for
pub type Listener = Arc<dyn Fn(&ServerMessage) + Send + Sync>;

/// Handle returned on registration, used to remove the listener again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Subscribers per broadcast kind, called in registration order
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    listeners: HashMap<BroadcastKind, Vec<(ListenerId, Listener)>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: BroadcastKind, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.entry(kind).or_default().push((id, listener));
        id
    }

    /// Returns false if the id was not registered
    pub fn remove(&mut self, id: ListenerId) -> bool {
        for entries in self.listeners.values_mut() {
            if let Some(index) = entries.iter().position(|(entry_id, _)| *entry_id == id) {
                entries.remove(index);
                return true;
            }
        }
        false
    }

    /// Listeners to call for a message, cloned so they run outside any lock
    pub fn listeners_for(&self, kind: BroadcastKind) -> Vec<Listener> {
        self.listeners
            .get(&kind)
            .map(|entries| entries.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}
