//! # unoforge
//!
//! An authoritative UNO server for "party" play: one shared screen shows the
//! table, and every player holds their hand on their own phone.
//!
//! The layers, bottom to top:
//!
//! - [`unoforge_transport`]: WebSocket connections
//! - [`unoforge_protocol`]: envelopes, commands, notifications, snapshots
//! - [`unoforge_engine`]: the rules, one pure state machine per room
//! - [`unoforge_room`]: room actors, the registry, reconnection grace timers
//! - this crate: the server builder and the per-connection handler
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use unoforge::prelude::*;
//!
//! # async fn start() -> Result<(), UnoforgeError> {
//! let server = UnoforgeServer::builder()
//!     .bind("0.0.0.0:3000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::UnoforgeError;
pub use server::{UnoforgeServer, UnoforgeServerBuilder};

/// Re-exports for the common case.
pub mod prelude {
    pub use crate::{UnoforgeError, UnoforgeServer, UnoforgeServerBuilder};
    pub use unoforge_engine::GameConfig;
    pub use unoforge_protocol::{
        ClientCommand, Codec, Envelope, JsonCodec, Notification, Payload, PlayerId, Response,
        ResponseData, RoomCode,
    };
    pub use unoforge_room::RegistryConfig;
}
