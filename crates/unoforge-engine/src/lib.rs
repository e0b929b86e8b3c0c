//! The authoritative game engine for unoforge.
//!
//! One [`GameEngine`] exists per room. It owns every piece of round-scoped
//! state (seating, piles, the forced-draw stack, pending colour choices and
//! challenges) and exposes synchronous command methods that either apply a
//! legal action completely or reject it with a [`GameError`]. The engine does
//! no I/O and never suspends, so a room that feeds it one command at a time
//! gets a single race-free ruling on every action.
//!
//! # Key types
//!
//! - [`GameEngine`]: the state machine
//! - [`GameConfig`]: hand size, seat limits, win threshold, challenge toggle
//! - [`GameError`]: every way a command can be refused
//! - [`deck`] / [`scoring`]: the stateless card utilities

pub mod deck;
pub mod scoring;

mod config;
mod error;
mod game;
mod player;

pub use config::GameConfig;
pub use error::{ErrorKind, GameError};
pub use game::GameEngine;
pub use player::Player;
