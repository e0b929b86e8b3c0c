//! Error types for the engine.
//!
//! A `GameError` is never a crash: it is the engine saying "not now" or
//! "not you". Its `Display` text is the human-readable reason sent back to
//! the client, so the wording is aimed at players, not developers.

use unoforge_protocol::{PlayerId, StackKind};

/// Coarse classification of a [`GameError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong phase, wrong seat, illegal card, bad colour.
    Validation,
    /// The room has no free seat.
    Capacity,
    /// The named player (or room) doesn't exist.
    NotFound,
}

/// Every reason the engine can refuse a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    // -- Seating --
    #[error("Game already in progress")]
    GameInProgress,

    #[error("Room is full (max {0})")]
    RoomFull(usize),

    #[error("Already joined")]
    AlreadyJoined,

    #[error("Name already taken in this room")]
    NameTaken,

    #[error("Name must not be empty")]
    InvalidName,

    #[error("Player {0} not found")]
    PlayerNotFound(PlayerId),

    // -- Round lifecycle --
    #[error("Need at least {0} players")]
    NotEnoughPlayers(usize),

    #[error("Cannot start now")]
    CannotStart,

    #[error("Can only change settings between rounds")]
    SettingsLocked,

    // -- Turn actions --
    /// Another play or draw for this room is still being applied.
    #[error("Action in progress")]
    ActionInProgress,

    #[error("Not accepting plays right now")]
    NotAcceptingPlays,

    #[error("Cannot draw now")]
    CannotDraw,

    #[error("Not your turn")]
    NotYourTurn,

    #[error("Card not in hand")]
    CardNotInHand,

    #[error("Card cannot be played")]
    CardNotPlayable,

    #[error("You must play a {} or draw cards", stack_card(.0))]
    MustMatchStack(StackKind),

    // -- Colour choice --
    #[error("No color choice pending")]
    NoColorChoicePending,

    #[error("Not your color choice")]
    NotYourColorChoice,

    #[error("Invalid color")]
    InvalidColor,

    // -- Challenge --
    #[error("No challenge pending")]
    NoChallengePending,

    #[error("Not your challenge")]
    NotYourChallenge,

    // -- UNO --
    #[error("Can only call UNO with 2 cards")]
    UnoHandSize,

    #[error("Already called UNO")]
    UnoAlreadyCalled,
}

fn stack_card(kind: &StackKind) -> &'static str {
    match kind {
        StackKind::Draw2 => "+2",
        StackKind::Draw4 => "+4",
    }
}

impl GameError {
    /// Classifies this error for callers that branch on category rather
    /// than on the exact variant.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RoomFull(_) => ErrorKind::Capacity,
            Self::PlayerNotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Validation,
        }
    }
}
