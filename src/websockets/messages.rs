use serde::{Deserialize, Serialize};

use crate::poker::models::{ChatMessage, Participant, RoomView};

/// Events a client sends to the room authority
///
/// Frames are `{"type": "<kind>", "payload": {...}}`; the unit kinds carry
/// no payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinRoom(JoinRoomPayload),
    AddStory(AddStoryPayload),
    Vote(VotePayload),
    RevealVotes,
    ReEstimate,
    EndVoting,
    SetFinalEstimate(FinalEstimatePayload),
    SendMessage(SendMessagePayload),
    LeaveRoom,
}

impl ClientEvent {
    /// Wire name of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            ClientEvent::JoinRoom(_) => "join_room",
            ClientEvent::AddStory(_) => "add_story",
            ClientEvent::Vote(_) => "vote",
            ClientEvent::RevealVotes => "reveal_votes",
            ClientEvent::ReEstimate => "re_estimate",
            ClientEvent::EndVoting => "end_voting",
            ClientEvent::SetFinalEstimate(_) => "set_final_estimate",
            ClientEvent::SendMessage(_) => "send_message",
            ClientEvent::LeaveRoom => "leave_room",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRoomPayload {
    pub user: Participant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<JoinRoomInfo>,
}

/// The parts of the client's room draft the authority looks at
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinRoomInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddStoryPayload {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotePayload {
    pub user_id: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalEstimatePayload {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessagePayload {
    pub message: String,
}

/// Messages the authority pushes to room members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    RoomUpdate(RoomView),
    ChatMessage(ChatMessage),
    /// Only sent to the acting connection, and only when enabled
    ActionRejected(RejectionNotice),
}

impl ServerMessage {
    pub fn kind(&self) -> BroadcastKind {
        match self {
            ServerMessage::RoomUpdate(_) => BroadcastKind::RoomUpdate,
            ServerMessage::ChatMessage(_) => BroadcastKind::ChatMessage,
            ServerMessage::ActionRejected(_) => BroadcastKind::ActionRejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BroadcastKind {
    RoomUpdate,
    ChatMessage,
    ActionRejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionNotice {
    pub event: String,
    pub reason: String,
}
