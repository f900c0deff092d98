use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Maximum number of participants a room accepts
pub const MAX_PARTICIPANTS: usize = 15;
pub const MAX_NAME_CHARS: usize = 50;
pub const MAX_ROOM_NAME_CHARS: usize = 100;
pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_MESSAGE_CHARS: usize = 500;
pub const MAX_ESTIMATE_CHARS: usize = 20;
pub const DEFAULT_ROOM_NAME: &str = "Planning Session";

/// A member of a room. Identity is the id alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_moderator: bool,
}

impl PartialEq for Participant {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Participant {}

/// The closed planning poker deck, in display order
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
    EnumIter,
)]
pub enum VoteValue {
    #[serde(rename = "0")]
    #[strum(serialize = "0")]
    Zero,
    #[serde(rename = "1")]
    #[strum(serialize = "1")]
    One,
    #[serde(rename = "2")]
    #[strum(serialize = "2")]
    Two,
    #[serde(rename = "3")]
    #[strum(serialize = "3")]
    Three,
    #[serde(rename = "5")]
    #[strum(serialize = "5")]
    Five,
    #[serde(rename = "8")]
    #[strum(serialize = "8")]
    Eight,
    #[serde(rename = "13")]
    #[strum(serialize = "13")]
    Thirteen,
    #[serde(rename = "21")]
    #[strum(serialize = "21")]
    TwentyOne,
    #[serde(rename = "34")]
    #[strum(serialize = "34")]
    ThirtyFour,
    #[serde(rename = "?")]
    #[strum(serialize = "?")]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub user_id: String,
    pub user_name: String,
    pub value: VoteValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// At most one vote per participant, in order of first vote
    #[serde(default)]
    pub votes: Vec<Vote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_estimate: Option<String>,
}

impl Story {
    pub fn new(id: String, title: String, description: Option<String>) -> Self {
        Self {
            id,
            title,
            description,
            votes: Vec::new(),
            final_estimate: None,
        }
    }

    /// Insert a vote or replace the value of the participant's existing one
    pub fn upsert_vote(&mut self, vote: Vote) {
        match self.votes.iter_mut().find(|v| v.user_id == vote.user_id) {
            Some(existing) => {
                existing.value = vote.value;
                existing.user_name = vote.user_name;
            }
            None => self.votes.push(vote),
        }
    }

    pub fn vote_of(&self, user_id: &str) -> Option<&Vote> {
        self.votes.iter().find(|v| v.user_id == user_id)
    }
}

/// Where the current story is in its estimation round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingPhase {
    #[default]
    NoStory,
    Voting,
    Revealed,
    Ended,
}

impl VotingPhase {
    pub fn voting_active(self) -> bool {
        matches!(self, VotingPhase::Voting | VotingPhase::Revealed)
    }

    pub fn votes_revealed(self) -> bool {
        matches!(self, VotingPhase::Revealed | VotingPhase::Ended)
    }
}

/// Authoritative room state owned by a single session machine
#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    pub code: String,
    pub name: String,
    pub participants: Vec<Participant>,
    pub current_story: Option<Story>,
    pub phase: VotingPhase,
}

impl Room {
    pub fn new(id: String, code: String) -> Self {
        Self {
            id,
            code,
            name: DEFAULT_ROOM_NAME.to_string(),
            participants: Vec::new(),
            current_story: None,
            phase: VotingPhase::NoStory,
        }
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= MAX_PARTICIPANTS
    }

    pub fn participant(&self, participant_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == participant_id)
    }

    pub fn has_participant(&self, participant_id: &str) -> bool {
        self.participant(participant_id).is_some()
    }

    pub fn view(&self) -> RoomView {
        RoomView::from(self)
    }
}

/// Room snapshot as carried by `room_update`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub id: String,
    pub code: String,
    pub name: String,
    pub participants: Vec<Participant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_story: Option<Story>,
    pub voting_active: bool,
    pub votes_revealed: bool,
    #[serde(default)]
    pub phase: VotingPhase,
}

impl From<&Room> for RoomView {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            code: room.code.clone(),
            name: room.name.clone(),
            participants: room.participants.clone(),
            current_story: room.current_story.clone(),
            voting_active: room.phase.voting_active(),
            votes_revealed: room.phase.votes_revealed(),
            phase: room.phase,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// True if `code` is six characters of uppercase ASCII letters and digits
pub fn is_valid_room_code(code: &str) -> bool {
    code.len() == 6
        && code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[rstest]
    #[case("0", VoteValue::Zero)]
    #[case("5", VoteValue::Five)]
    #[case("13", VoteValue::Thirteen)]
    #[case("34", VoteValue::ThirtyFour)]
    #[case("?", VoteValue::Unknown)]
    fn test_deck_tokens_parse(#[case] token: &str, #[case] expected: VoteValue) {
        assert_eq!(VoteValue::from_str(token).unwrap(), expected);
        assert_eq!(expected.to_string(), token);
        assert_eq!(
            serde_json::to_string(&expected).unwrap(),
            format!("\"{}\"", token)
        );
    }

    #[rstest]
    #[case("4")]
    #[case("100")]
    #[case("")]
    #[case("five")]
    fn test_tokens_outside_deck_are_rejected(#[case] token: &str) {
        assert!(VoteValue::from_str(token).is_err());
    }

    #[test]
    fn test_deck_order() {
        let tokens: Vec<String> = VoteValue::iter().map(|v| v.to_string()).collect();
        assert_eq!(
            tokens,
            vec!["0", "1", "2", "3", "5", "8", "13", "21", "34", "?"]
        );
    }

    #[test]
    fn test_upsert_vote_replaces_existing_value() {
        let mut story = Story::new("s1".into(), "Login".into(), None);
        story.upsert_vote(Vote {
            user_id: "u1".into(),
            user_name: "Ana".into(),
            value: VoteValue::Three,
        });
        story.upsert_vote(Vote {
            user_id: "u2".into(),
            user_name: "Bo".into(),
            value: VoteValue::Five,
        });
        story.upsert_vote(Vote {
            user_id: "u1".into(),
            user_name: "Ana".into(),
            value: VoteValue::Eight,
        });

        assert_eq!(story.votes.len(), 2);
        assert_eq!(story.votes[0].user_id, "u1");
        assert_eq!(story.vote_of("u1").unwrap().value, VoteValue::Eight);
    }

    #[rstest]
    #[case(VotingPhase::NoStory, false, false)]
    #[case(VotingPhase::Voting, true, false)]
    #[case(VotingPhase::Revealed, true, true)]
    #[case(VotingPhase::Ended, false, true)]
    fn test_phase_flags(
        #[case] phase: VotingPhase,
        #[case] active: bool,
        #[case] revealed: bool,
    ) {
        assert_eq!(phase.voting_active(), active);
        assert_eq!(phase.votes_revealed(), revealed);
    }

    #[test]
    fn test_room_view_uses_camel_case_wire_names() {
        let mut room = Room::new("room_1".into(), "ABC123".into());
        room.participants.push(Participant {
            id: "u1".into(),
            name: "Ana".into(),
            is_moderator: true,
        });
        let json = serde_json::to_value(room.view()).unwrap();

        assert_eq!(json["code"], "ABC123");
        assert_eq!(json["votingActive"], false);
        assert_eq!(json["votesRevealed"], false);
        assert_eq!(json["phase"], "no_story");
        assert_eq!(json["participants"][0]["isModerator"], true);
        assert!(json.get("currentStory").is_none());
    }

    #[test]
    fn test_participant_equality_is_by_id() {
        let a = Participant {
            id: "u1".into(),
            name: "Ana".into(),
            is_moderator: true,
        };
        let b = Participant {
            id: "u1".into(),
            name: "Someone else".into(),
            is_moderator: false,
        };
        assert_eq!(a, b);
    }

    #[rstest]
    #[case("ABC123", true)]
    #[case("abc123", false)]
    #[case("ABC12", false)]
    #[case("ABC-23", false)]
    fn test_room_code_validation(#[case] code: &str, #[case] valid: bool) {
        assert_eq!(is_valid_room_code(code), valid);
    }
}
