//! Identity types: players, rooms, and transport connections.
//!
//! All three are "newtype wrappers" around a primitive. You can't pass a
//! `ConnectionId` where a `PlayerId` is expected, even though both are a
//! `u64` underneath, and the compiler keeps the two identities apart.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A stable identifier for a player.
///
/// Issued by the room registry on first join and kept across reconnects:
/// a phone that drops and comes back presents the same `PlayerId` to resume
/// its seat. `#[serde(transparent)]` makes `PlayerId(42)` travel as `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A short, human-typeable room code such as `"K7QD"`.
///
/// Codes are case-insensitive: [`RoomCode::new`] trims and upper-cases the
/// input, so `"k7qd "` and `"K7QD"` name the same room. Deserialization goes
/// through the same normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Normalizes a raw code into its canonical (upper-case) form.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }

    /// Returns the canonical code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomCode {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for RoomCode {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

/// Opaque identifier for a transport connection.
///
/// The engine stores the connection a player is currently bound to (their
/// "connection reference"); it changes on every reconnect while the
/// `PlayerId` stays put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_room_code_new_normalizes_case_and_whitespace() {
        assert_eq!(RoomCode::new(" k7qd "), RoomCode::new("K7QD"));
        assert_eq!(RoomCode::new("k7qd").as_str(), "K7QD");
    }

    #[test]
    fn test_room_code_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomCode::new("ab23")).unwrap();
        assert_eq!(json, "\"AB23\"");
    }

    #[test]
    fn test_room_code_deserialize_normalizes() {
        let code: RoomCode = serde_json::from_str("\" ab23\"").unwrap();
        assert_eq!(code.as_str(), "AB23");
    }

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId::new(7).to_string(), "conn-7");
        assert_eq!(ConnectionId::new(7).into_inner(), 7);
    }
}
