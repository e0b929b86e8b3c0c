//! Point values for the end-of-round tally.

use unoforge_protocol::{Card, CardValue};

/// Points for a single card left in a losing hand: number cards count their
/// face value, skip/reverse/draw2 count 20, both wilds count 50.
pub fn card_points(card: &Card) -> u32 {
    match card.value {
        CardValue::Number(n) => u32::from(n),
        CardValue::Skip | CardValue::Reverse | CardValue::Draw2 => 20,
        CardValue::Wild | CardValue::WildDraw4 => 50,
    }
}

/// Sum of [`card_points`] over a hand.
pub fn hand_points(hand: &[Card]) -> u32 {
    hand.iter().map(card_points).sum()
}
