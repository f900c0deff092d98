use thiserror::Error;

/// Reasons the authority drops an event without touching room state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Room is full")]
    RoomFull,

    #[error("Room code does not match this room")]
    RoomCodeMismatch,

    #[error("Participant name must be 1 to {max} characters")]
    InvalidName { max: usize },

    #[error("Connection already joined as another participant")]
    AlreadyJoined,

    #[error("Sender has not joined the room")]
    NotParticipant,

    #[error("Only the moderator can {0}")]
    NotModerator(&'static str),

    #[error("A vote is still in progress")]
    VotingInProgress,

    #[error("Story title must be 1 to {max} characters")]
    EmptyTitle { max: usize },

    #[error("There is no current story")]
    NoActiveStory,

    #[error("Voting is not open for the current story")]
    VotingClosed,

    #[error("Votes have not been revealed yet")]
    VotesHidden,

    #[error("'{0}' is not a card in the deck")]
    UnknownVoteValue(String),

    #[error("Votes can only be cast for yourself")]
    ImpersonatedVote,

    #[error("Final estimate must be 1 to {max} characters")]
    InvalidEstimate { max: usize },

    #[error("Chat message must be 1 to {max} characters")]
    InvalidMessage { max: usize },
}
