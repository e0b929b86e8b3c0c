//! Wire protocol for unoforge.
//!
//! This crate is the shared "language" between the room engine and the two
//! kinds of clients (the public display and the private hand controllers):
//!
//! - **Identity** ([`PlayerId`], [`RoomCode`], [`ConnectionId`]): who is
//!   talking and where.
//! - **Cards** ([`Card`], [`Color`], [`CardValue`]): the immutable card model.
//! - **Game vocabulary** ([`Phase`], [`Effect`], the per-command outcome types,
//!   [`PublicSnapshot`], [`PrivateSnapshot`]): what the engine reports.
//! - **Messages** ([`ClientCommand`], [`Response`], [`Notification`],
//!   [`Envelope`]): what travels on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become bytes.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about sockets, tasks, or rule
//! enforcement. The engine produces these types; the room layer routes
//! them; the transport ships their encoded bytes.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Room (actor) → Engine (rules)
//! ```

mod card;
mod codec;
mod error;
mod game;
mod ids;
mod message;

pub use card::{Card, CardId, CardValue, Color};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use game::{
    ChallengeOutcome, ChallengeVerdict, ColorOutcome, DealtCard, Direction,
    DrawOutcome, Effect, HandScore, JoinOutcome, Phase, PlayOutcome,
    PlayerSummary, PrivateSnapshot, PublicSnapshot, Resolution, RoundStart,
    RoundSummary, ScoreLine, StackKind, StartOutcome, UnoOutcome, UnoPenalty,
};
pub use ids::{ConnectionId, PlayerId, RoomCode};
pub use message::{
    ClientCommand, Envelope, Notification, Payload, Recipient, Response,
    ResponseData,
};
