//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use planning_poker::poker::models::{ChatMessage, RoomView, VotingPhase};
use planning_poker::websockets::messages::{RejectionNotice, ServerMessage};

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    connections: Vec<&'a str>,
}

impl<'a> MessageAssertion<'a> {
    /// Create an assertion for specific connections
    pub fn for_connections(setup: &'a TestSetup, connections: Vec<&'a str>) -> Self {
        Self { setup, connections }
    }

    /// Pop the next frame from every connection; all of them must be identical
    async fn next_message(self) -> ServerMessage {
        let mut messages: Vec<ServerMessage> = vec![];

        for connection in &self.connections {
            let raw = self
                .setup
                .mock_conn_manager
                .consume_message_for(connection)
                .await;
            assert!(raw.is_some(), "{} should have received a message", connection);
            messages.push(serde_json::from_str(&raw.unwrap()).unwrap());
        }

        for (i, message) in messages.iter().enumerate().skip(1) {
            assert_eq!(
                message, &messages[0],
                "{} received a different message than {}",
                self.connections[i], self.connections[0]
            );
        }

        messages.swap_remove(0)
    }

    /// Assert that the connections received a room update (consumes the message from queue)
    pub async fn received_room_update(self) -> RoomContent {
        match self.next_message().await {
            ServerMessage::RoomUpdate(room) => RoomContent { room },
            other => panic!("expected room_update, got {:?}", other),
        }
    }

    pub async fn received_chat_message(self) -> ChatMessage {
        match self.next_message().await {
            ServerMessage::ChatMessage(chat) => chat,
            other => panic!("expected chat_message, got {:?}", other),
        }
    }

    pub async fn received_rejection(self) -> RejectionNotice {
        match self.next_message().await {
            ServerMessage::ActionRejected(notice) => notice,
            other => panic!("expected action_rejected, got {:?}", other),
        }
    }

    /// Assert that the connections have nothing queued once the room is idle
    pub async fn received_no_messages(self) {
        self.setup.settle().await;
        for connection in &self.connections {
            let messages = self
                .setup
                .mock_conn_manager
                .get_messages_for(connection)
                .await;
            assert!(
                messages.is_empty(),
                "{} should not have received any messages, got {:?}",
                connection,
                messages
            );
        }
    }
}

pub struct RoomContent {
    pub room: RoomView,
}

impl RoomContent {
    pub fn verify_participants(self, expected: &[&str]) -> Self {
        let ids: Vec<&str> = self.room.participants.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, expected, "participants differ");
        self
    }

    pub fn verify_phase(self, phase: VotingPhase) -> Self {
        assert_eq!(self.room.phase, phase);
        assert_eq!(self.room.voting_active, phase.voting_active());
        assert_eq!(self.room.votes_revealed, phase.votes_revealed());
        self
    }

    pub fn verify_story_title(self, title: &str) -> Self {
        let story = self.room.current_story.as_ref().expect("room should have a story");
        assert_eq!(story.title, title);
        self
    }

    pub fn verify_vote_count(self, count: usize) -> Self {
        let story = self.room.current_story.as_ref().expect("room should have a story");
        assert_eq!(story.votes.len(), count);
        self
    }
}
