//! Room lifecycle management for unoforge.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns one
//! [`GameEngine`](unoforge_engine::GameEngine). Commands reach it through a
//! bounded mailbox and are applied one at a time, so every room has a single
//! writer. Rooms share nothing with each other.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates rooms, routes joins, runs disconnect grace
//!   timers, sweeps abandoned rooms
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`GameAction`] / [`Actor`]: what is being asked, and by whom
//! - [`RegistryConfig`]: grace period, code length, mailbox size

mod code;
mod config;
mod error;
mod notify;
mod registry;
mod room;
mod timers;

pub use code::{CODE_ALPHABET, generate_code};
pub use config::RegistryConfig;
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{Actor, GameAction, NotificationSender, RoomHandle, RoomInfo};
pub use timers::GraceExpired;
