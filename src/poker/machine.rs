use chrono::Utc;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use super::errors::Rejection;
use super::ids::IdGenerator;
use super::models::{
    ChatMessage, Participant, Room, Story, Vote, VoteValue, VotingPhase, MAX_ESTIMATE_CHARS,
    MAX_MESSAGE_CHARS, MAX_NAME_CHARS, MAX_ROOM_NAME_CHARS, MAX_TITLE_CHARS,
};
use crate::websockets::messages::{
    AddStoryPayload, ClientEvent, FinalEstimatePayload, JoinRoomPayload, SendMessagePayload,
    ServerMessage, VotePayload,
};

/// Result of an accepted event
#[derive(Debug, Default)]
pub struct Transition {
    /// Messages for every member of the room, in order
    pub broadcasts: Vec<ServerMessage>,
    /// Participant the acting connection is now bound to
    pub joined: Option<Participant>,
    /// Participant that is no longer part of the room
    pub left: Option<String>,
}

impl Transition {
    fn broadcast(message: ServerMessage) -> Self {
        Self {
            broadcasts: vec![message],
            ..Default::default()
        }
    }
}

/// Authority-side state machine for one room
///
/// Every event is validated in full before anything is mutated, so a
/// rejected event leaves the room exactly as it was.
pub struct SessionMachine {
    room: Room,
    chat_log: Vec<ChatMessage>,
    history: Vec<Story>,
    creator_id: Option<String>,
    moderator_id: Option<String>,
    ids: Arc<dyn IdGenerator>,
}

impl SessionMachine {
    pub fn new(code: String, ids: Arc<dyn IdGenerator>) -> Self {
        let room = Room::new(ids.room_id(), code);
        Self {
            room,
            chat_log: Vec::new(),
            history: Vec::new(),
            creator_id: None,
            moderator_id: None,
            ids,
        }
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn chat_log(&self) -> &[ChatMessage] {
        &self.chat_log
    }

    /// Stories superseded by a newer one, oldest first
    pub fn history(&self) -> &[Story] {
        &self.history
    }

    /// Archived stories followed by the current one, if any
    pub fn stories(&self) -> Vec<Story> {
        let mut stories = self.history.clone();
        stories.extend(self.room.current_story.clone());
        stories
    }

    /// Apply one event on behalf of `actor` (the participant id bound to the
    /// sending connection, if it has joined)
    pub fn apply(
        &mut self,
        actor: Option<&str>,
        event: ClientEvent,
    ) -> Result<Transition, Rejection> {
        match event {
            ClientEvent::JoinRoom(payload) => self.join(actor, payload),
            ClientEvent::AddStory(payload) => self.add_story(actor, payload),
            ClientEvent::Vote(payload) => self.vote(actor, payload),
            ClientEvent::RevealVotes => self.reveal_votes(actor),
            ClientEvent::ReEstimate => self.re_estimate(actor),
            ClientEvent::EndVoting => self.end_voting(actor),
            ClientEvent::SetFinalEstimate(payload) => self.set_final_estimate(actor, payload),
            ClientEvent::SendMessage(payload) => self.send_message(actor, payload),
            ClientEvent::LeaveRoom => {
                let participant = self.participant(actor)?.id.clone();
                Ok(self.remove_participant(&participant).unwrap_or_default())
            }
        }
    }

    /// Drop a participant, keeping any votes they already cast
    pub fn remove_participant(&mut self, participant_id: &str) -> Option<Transition> {
        let index = self
            .room
            .participants
            .iter()
            .position(|p| p.id == participant_id)?;
        let removed = self.room.participants.remove(index);

        info!(
            room_code = %self.room.code,
            participant_id = %removed.id,
            remaining = self.room.participants.len(),
            "Participant left room"
        );

        Some(Transition {
            broadcasts: vec![self.room_update()],
            joined: None,
            left: Some(removed.id),
        })
    }

    fn room_update(&self) -> ServerMessage {
        ServerMessage::RoomUpdate(self.room.view())
    }

    fn participant(&self, actor: Option<&str>) -> Result<&Participant, Rejection> {
        actor
            .and_then(|id| self.room.participant(id))
            .ok_or(Rejection::NotParticipant)
    }

    fn moderator(&self, actor: Option<&str>, action: &'static str) -> Result<(), Rejection> {
        if self.participant(actor)?.is_moderator {
            Ok(())
        } else {
            Err(Rejection::NotModerator(action))
        }
    }

    fn current_story(&self) -> Result<&Story, Rejection> {
        self.room
            .current_story
            .as_ref()
            .ok_or(Rejection::NoActiveStory)
    }

    fn current_story_mut(&mut self) -> Result<&mut Story, Rejection> {
        self.room
            .current_story
            .as_mut()
            .ok_or(Rejection::NoActiveStory)
    }

    fn join(
        &mut self,
        actor: Option<&str>,
        payload: JoinRoomPayload,
    ) -> Result<Transition, Rejection> {
        if let Some(code) = payload.room.as_ref().and_then(|r| r.code.as_deref()) {
            if !code.trim().eq_ignore_ascii_case(&self.room.code) {
                return Err(Rejection::RoomCodeMismatch);
            }
        }

        let name = bounded_text(&payload.user.name, MAX_NAME_CHARS).ok_or(
            Rejection::InvalidName {
                max: MAX_NAME_CHARS,
            },
        )?;

        let supplied_id = payload.user.id.trim();
        // A connection speaks for one participant; switching needs leave_room first
        if let Some(bound) = actor {
            if supplied_id != bound {
                return Err(Rejection::AlreadyJoined);
            }
        }
        let id = if supplied_id.is_empty() {
            self.ids.participant_id()
        } else {
            supplied_id.to_string()
        };

        if let Some(existing) = self.room.participant(&id) {
            debug!(room_code = %self.room.code, participant_id = %id, "Participant rejoined");
            return Ok(Transition {
                broadcasts: vec![self.room_update()],
                joined: Some(existing.clone()),
                left: None,
            });
        }

        if self.room.is_full() {
            return Err(Rejection::RoomFull);
        }

        // Only the creator can come back as moderator after a reconnect
        let is_moderator = if self.creator_id.is_none() {
            self.creator_id = Some(id.clone());
            if payload.user.is_moderator {
                self.moderator_id = Some(id.clone());
            }
            if let Some(room_name) = payload
                .room
                .as_ref()
                .and_then(|r| r.name.as_deref())
                .map(|n| truncate_chars(n.trim(), MAX_ROOM_NAME_CHARS))
                .filter(|n| !n.is_empty())
            {
                self.room.name = room_name;
            }
            payload.user.is_moderator
        } else {
            self.moderator_id.as_deref() == Some(id.as_str())
        };

        let participant = Participant {
            id,
            name,
            is_moderator,
        };
        self.room.participants.push(participant.clone());

        info!(
            room_code = %self.room.code,
            participant_id = %participant.id,
            is_moderator = participant.is_moderator,
            participant_count = self.room.participants.len(),
            "Participant joined room"
        );

        Ok(Transition {
            broadcasts: vec![self.room_update()],
            joined: Some(participant),
            left: None,
        })
    }

    fn add_story(
        &mut self,
        actor: Option<&str>,
        payload: AddStoryPayload,
    ) -> Result<Transition, Rejection> {
        self.moderator(actor, "add stories")?;
        if self.room.phase.voting_active() {
            return Err(Rejection::VotingInProgress);
        }
        let title = bounded_text(&payload.title, MAX_TITLE_CHARS).ok_or(Rejection::EmptyTitle {
            max: MAX_TITLE_CHARS,
        })?;
        let description = payload
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let story = Story::new(self.ids.story_id(), title, description);
        if let Some(previous) = self.room.current_story.replace(story) {
            self.history.push(previous);
        }
        self.room.phase = VotingPhase::Voting;

        info!(
            room_code = %self.room.code,
            archived_stories = self.history.len(),
            "Story added, voting opened"
        );

        Ok(Transition::broadcast(self.room_update()))
    }

    fn vote(&mut self, actor: Option<&str>, payload: VotePayload) -> Result<Transition, Rejection> {
        let voter = self.participant(actor)?.clone();
        self.current_story()?;
        if self.room.phase != VotingPhase::Voting {
            return Err(Rejection::VotingClosed);
        }
        if payload.user_id != voter.id {
            return Err(Rejection::ImpersonatedVote);
        }
        let value = VoteValue::from_str(payload.value.trim())
            .map_err(|_| Rejection::UnknownVoteValue(payload.value.clone()))?;

        let story = self.current_story_mut()?;
        story.upsert_vote(Vote {
            user_id: voter.id.clone(),
            user_name: voter.name,
            value,
        });
        let vote_count = story.votes.len();

        debug!(
            room_code = %self.room.code,
            participant_id = %voter.id,
            votes = vote_count,
            "Vote recorded"
        );

        Ok(Transition::broadcast(self.room_update()))
    }

    fn reveal_votes(&mut self, actor: Option<&str>) -> Result<Transition, Rejection> {
        self.moderator(actor, "reveal votes")?;
        self.current_story()?;
        if !self.room.phase.voting_active() {
            return Err(Rejection::VotingClosed);
        }
        self.room.phase = VotingPhase::Revealed;

        info!(room_code = %self.room.code, "Votes revealed");
        Ok(Transition::broadcast(self.room_update()))
    }

    fn re_estimate(&mut self, actor: Option<&str>) -> Result<Transition, Rejection> {
        self.moderator(actor, "restart estimation")?;
        let story = self.current_story_mut()?;
        story.votes.clear();
        story.final_estimate = None;
        self.room.phase = VotingPhase::Voting;

        info!(room_code = %self.room.code, "Story reopened for a new round");
        Ok(Transition::broadcast(self.room_update()))
    }

    fn end_voting(&mut self, actor: Option<&str>) -> Result<Transition, Rejection> {
        self.moderator(actor, "end voting")?;
        self.current_story()?;
        if !self.room.phase.voting_active() {
            return Err(Rejection::VotingClosed);
        }
        self.room.phase = VotingPhase::Ended;

        info!(room_code = %self.room.code, "Voting ended");
        Ok(Transition::broadcast(self.room_update()))
    }

    fn set_final_estimate(
        &mut self,
        actor: Option<&str>,
        payload: FinalEstimatePayload,
    ) -> Result<Transition, Rejection> {
        self.moderator(actor, "set the final estimate")?;
        self.current_story()?;
        if !self.room.phase.votes_revealed() {
            return Err(Rejection::VotesHidden);
        }
        let value = bounded_text(&payload.value, MAX_ESTIMATE_CHARS).ok_or(
            Rejection::InvalidEstimate {
                max: MAX_ESTIMATE_CHARS,
            },
        )?;
        self.current_story_mut()?.final_estimate = Some(value);

        Ok(Transition::broadcast(self.room_update()))
    }

    fn send_message(
        &mut self,
        actor: Option<&str>,
        payload: SendMessagePayload,
    ) -> Result<Transition, Rejection> {
        let sender = self.participant(actor)?.clone();
        let text = bounded_text(&payload.message, MAX_MESSAGE_CHARS).ok_or(
            Rejection::InvalidMessage {
                max: MAX_MESSAGE_CHARS,
            },
        )?;

        let message = ChatMessage {
            id: self.ids.message_id(),
            user_id: sender.id,
            user_name: sender.name,
            message: text,
            timestamp: Utc::now(),
        };
        self.chat_log.push(message.clone());

        Ok(Transition::broadcast(ServerMessage::ChatMessage(message)))
    }
}

/// Trimmed text if it is non-empty and at most `max` characters
fn bounded_text(raw: &str, max: usize) -> Option<String> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    (len > 0 && len <= max).then(|| trimmed.to_string())
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
