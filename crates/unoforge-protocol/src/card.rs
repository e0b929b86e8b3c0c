//! The card model.
//!
//! A card is an immutable `{ id, color, value }` triple. Ids are unique
//! within a room for the lifetime of the engine, so a client can name the
//! exact physical card it wants to play even when its hand holds two red 7s.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier of a physical card within a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// Card colour. `Wild` is only ever a *card* colour; the active colour of
/// the discard pile is always one of [`Color::PLAYABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Yellow,
    Green,
    Blue,
    Wild,
}

impl Color {
    /// The four colours a player may choose after playing a wild.
    pub const PLAYABLE: [Color; 4] = [Color::Red, Color::Yellow, Color::Green, Color::Blue];

    /// Returns `true` for the wild pseudo-colour.
    pub fn is_wild(self) -> bool {
        matches!(self, Self::Wild)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Wild => "wild",
        };
        f.write_str(name)
    }
}

/// What is printed on the card.
///
/// `Number` carries the face value 0–9; everything else is an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardValue {
    Number(u8),
    Skip,
    Reverse,
    Draw2,
    Wild,
    WildDraw4,
}

impl fmt::Display for CardValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Skip => f.write_str("skip"),
            Self::Reverse => f.write_str("reverse"),
            Self::Draw2 => f.write_str("draw2"),
            Self::Wild => f.write_str("wild"),
            Self::WildDraw4 => f.write_str("wild_draw4"),
        }
    }
}

/// A single physical card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub color: Color,
    pub value: CardValue,
}

impl Card {
    /// Creates a card. Used by the deck builder and by tests that need
    /// hands with known contents.
    pub fn new(id: u32, color: Color, value: CardValue) -> Self {
        Self {
            id: CardId(id),
            color,
            value,
        }
    }

    /// Returns `true` for both wild and wild-draw-four.
    pub fn is_wild(&self) -> bool {
        self.color.is_wild()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_wild() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{}-{}", self.color, self.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_display() {
        assert_eq!(Card::new(1, Color::Red, CardValue::Number(5)).to_string(), "red-5");
        assert_eq!(Card::new(2, Color::Wild, CardValue::WildDraw4).to_string(), "wild_draw4");
    }

    #[test]
    fn test_card_value_json_shape() {
        let json = serde_json::to_value(CardValue::Number(7)).unwrap();
        assert_eq!(json, serde_json::json!({ "number": 7 }));

        let json = serde_json::to_value(CardValue::WildDraw4).unwrap();
        assert_eq!(json, serde_json::json!("wild_draw4"));
    }

    #[test]
    fn test_playable_colors_exclude_wild() {
        assert!(Color::PLAYABLE.iter().all(|c| !c.is_wild()));
        assert_eq!(Color::PLAYABLE.len(), 4);
    }
}
