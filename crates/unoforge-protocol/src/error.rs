//! Error types for the protocol layer.
//!
//! Each crate in unoforge defines its own error enum. A `ProtocolError`
//! always means the problem is in turning messages into bytes or back, never
//! in game rules or networking.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust value).
    ///
    /// Common causes: malformed JSON, an unknown command `type`, or a
    /// colour name that isn't one of the five card colours.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded fine but breaks a protocol rule, for example
    /// a client sending a server-only payload.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
