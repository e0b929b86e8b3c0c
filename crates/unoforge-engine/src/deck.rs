//! Deck construction and shuffling.
//!
//! Both functions are pure apart from the random source handed in, so the
//! engine can reproduce a deal by seeding its own generator.

use rand::Rng;
use rand::seq::SliceRandom;
use unoforge_protocol::{Card, CardValue, Color};

/// Number of cards in a standard deck.
pub const DECK_SIZE: u32 = 108;

/// Builds an unshuffled 108-card deck.
///
/// Per colour: one 0, two each of 1 through 9, two skip, two reverse, two
/// draw2. Then four wild and four wild-draw-four. Card ids are assigned
/// sequentially from `first_id`, so a caller that builds more than one deck
/// keeps ids unique by advancing its counter by [`DECK_SIZE`].
pub fn build(first_id: u32) -> Vec<Card> {
    let mut cards = Vec::with_capacity(DECK_SIZE as usize);
    let mut next_id = first_id;
    let mut push = |color, value| {
        cards.push(Card::new(next_id, color, value));
        next_id += 1;
    };

    for color in Color::PLAYABLE {
        push(color, CardValue::Number(0));
        for n in 1..=9 {
            push(color, CardValue::Number(n));
            push(color, CardValue::Number(n));
        }
        for value in [CardValue::Skip, CardValue::Reverse, CardValue::Draw2] {
            push(color, value);
            push(color, value);
        }
    }
    for _ in 0..4 {
        push(Color::Wild, CardValue::Wild);
        push(Color::Wild, CardValue::WildDraw4);
    }

    cards
}

/// Fisher-Yates shuffle in place.
pub fn shuffle<R: Rng + ?Sized>(cards: &mut [Card], rng: &mut R) {
    cards.shuffle(rng);
}

/// A fresh deck, already shuffled.
pub fn shuffled<R: Rng + ?Sized>(first_id: u32, rng: &mut R) -> Vec<Card> {
    let mut cards = build(first_id);
    shuffle(&mut cards, rng);
    cards
}
