use serde::{Deserialize, Serialize};

use crate::poker::models::{ChatMessage, RoomView, Story};
use crate::websockets::messages::ServerMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

/// A client's local view of one room, rebuilt from broadcasts
///
/// The room snapshot is replaced wholesale on every `room_update`. Chat and
/// story history only grow; a story is appended the first time its id shows
/// up as the current story and is never touched again afterwards.
#[derive(Debug, Clone)]
pub struct RoomProjection {
    room: Option<RoomView>,
    chat_log: Vec<ChatMessage>,
    history: Vec<Story>,
    status: ConnectionStatus,
}

impl RoomProjection {
    pub fn new() -> Self {
        Self {
            room: None,
            chat_log: Vec::new(),
            history: Vec::new(),
            status: ConnectionStatus::Connected,
        }
    }

    pub fn apply(&mut self, message: &ServerMessage) {
        match message {
            ServerMessage::RoomUpdate(room) => {
                if let Some(story) = &room.current_story {
                    if !self.history.iter().any(|seen| seen.id == story.id) {
                        self.history.push(story.clone());
                    }
                }
                self.room = Some(room.clone());
            }
            ServerMessage::ChatMessage(chat) => self.chat_log.push(chat.clone()),
            // Rejection notices carry no room state
            ServerMessage::ActionRejected(_) => {}
        }
    }

    pub fn room(&self) -> Option<&RoomView> {
        self.room.as_ref()
    }

    pub fn chat_log(&self) -> &[ChatMessage] {
        &self.chat_log
    }

    pub fn history(&self) -> &[Story] {
        &self.history
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn set_status(&mut self, status: ConnectionStatus) {
        self.status = status;
    }

    /// Every current participant has a vote on the current story
    pub fn all_voted(&self) -> bool {
        let Some(room) = &self.room else {
            return false;
        };
        let Some(story) = &room.current_story else {
            return false;
        };
        !room.participants.is_empty()
            && room
                .participants
                .iter()
                .all(|p| story.vote_of(&p.id).is_some())
    }
}

impl Default for RoomProjection {
    fn default() -> Self {
        Self::new()
    }
}
