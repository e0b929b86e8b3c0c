//! Error types for the room layer.

use unoforge_engine::{ErrorKind, GameError};
use unoforge_protocol::RoomCode;

/// Errors that can occur during room operations.
///
/// Like [`GameError`], the `Display` text is what a client sees as the
/// failure reason.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No live room has this code.
    #[error("Room not found")]
    NotFound(RoomCode),

    /// The engine refused the command.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The connection hasn't joined a room.
    #[error("Not in a room")]
    NotInRoom,

    /// A turn action came from a connection without a seat (a display).
    #[error("Only seated players can do that")]
    NotSeated,

    /// The seat was resumed from another connection since this one joined.
    #[error("Seat is in use by another connection")]
    Superseded,

    /// The room's mailbox is closed: the actor has shut down.
    #[error("Room {0} is unavailable")]
    Unavailable(RoomCode),
}

impl RoomError {
    /// Classifies this error using the engine's taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Game(e) => e.kind(),
            Self::NotFound(_) | Self::NotInRoom | Self::Unavailable(_) => ErrorKind::NotFound,
            Self::NotSeated | Self::Superseded => ErrorKind::Validation,
        }
    }
}
