//! A seat at the table.

use std::time::Instant;

use unoforge_protocol::{Card, CardId, ConnectionId, PlayerId, PlayerSummary};

/// Avatar pool, assigned round-robin by join order.
pub(crate) const AVATARS: [&str; 10] = [
    "cat", "dog", "fox", "owl", "bear", "rabbit", "panda", "koala", "lion", "penguin",
];

/// One seated player and their private hand.
///
/// The hand is only ever exposed to its owner (through a private snapshot);
/// everyone else sees a [`PlayerSummary`] with the card count.
#[derive(Debug, Clone)]
pub struct Player {
    pub(crate) id: PlayerId,
    pub(crate) name: String,
    pub(crate) avatar: &'static str,
    pub(crate) connection: ConnectionId,
    pub(crate) hand: Vec<Card>,
    pub(crate) score: u32,
    pub(crate) said_uno: bool,
    pub(crate) connected: bool,
    pub(crate) disconnected_at: Option<Instant>,
}

impl Player {
    pub(crate) fn new(
        id: PlayerId,
        name: String,
        avatar: &'static str,
        connection: ConnectionId,
    ) -> Self {
        Self {
            id,
            name,
            avatar,
            connection,
            hand: Vec::new(),
            score: 0,
            said_uno: false,
            connected: true,
            disconnected_at: None,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// The connection this seat is currently bound to.
    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    /// When the seat lost its connection, if it is currently disconnected.
    pub fn disconnected_at(&self) -> Option<Instant> {
        self.disconnected_at
    }

    pub(crate) fn card(&self, card_id: CardId) -> Option<Card> {
        self.hand.iter().find(|c| c.id == card_id).copied()
    }

    pub(crate) fn discard(&mut self, card_id: CardId) {
        self.hand.retain(|c| c.id != card_id);
    }

    pub(crate) fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            id: self.id,
            name: self.name.clone(),
            avatar: self.avatar.to_string(),
            card_count: self.hand.len(),
            score: self.score,
            declared_uno: self.said_uno,
            connected: self.connected,
        }
    }
}
