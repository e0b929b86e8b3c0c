//! Messages that travel on the wire.
//!
//! Clients send [`ClientCommand`]s. The server answers every command with
//! exactly one [`Response`] (success flag, reason on failure, typed payload
//! on success) and pushes [`Notification`]s to whoever needs to redraw.
//! Both directions are wrapped in an [`Envelope`].

use serde::{Deserialize, Serialize};

use crate::{
    Card, CardId, ChallengeOutcome, Color, ColorOutcome, DrawOutcome, Effect,
    JoinOutcome, PlayOutcome, PlayerId, PlayerSummary, PrivateSnapshot,
    PublicSnapshot, RoomCode, RoundStart, RoundSummary, UnoOutcome,
};

// ---------------------------------------------------------------------------
// Recipient: who should receive a notification?
// ---------------------------------------------------------------------------

/// Specifies who should receive a notification.
///
/// The room actor pairs every notification it derives with a `Recipient`
/// and fans it out to the matching subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every subscriber of the room: displays and all bound players.
    All,

    /// Only the room's public displays.
    Display,

    /// One specific player (their hand controller).
    Player(PlayerId),
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Intent commands. The sender's identity is never part of the command;
/// the transport adapter attaches it from the connection.
///
/// `#[serde(tag = "type")]` produces `{ "type": "play_card", "card_id": 12 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Display: open a new room and subscribe to it.
    CreateRoom,

    /// Hand: take a seat, or resume one with `player_id`.
    JoinRoom {
        room_code: RoomCode,
        name: String,
        #[serde(default)]
        player_id: Option<PlayerId>,
    },

    /// Hand: give up the seat immediately.
    LeaveRoom,

    StartGame,
    NextRound,
    SetChallengeEnabled { enabled: bool },
    PlayCard { card_id: CardId },
    ChooseColor { color: Color },
    ChallengeWild { do_challenge: bool },
    DrawCard,
    SayUno,
}

impl ClientCommand {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom => "create_room",
            Self::JoinRoom { .. } => "join_room",
            Self::LeaveRoom => "leave_room",
            Self::StartGame => "start_game",
            Self::NextRound => "next_round",
            Self::SetChallengeEnabled { .. } => "set_challenge_enabled",
            Self::PlayCard { .. } => "play_card",
            Self::ChooseColor { .. } => "choose_color",
            Self::ChallengeWild { .. } => "challenge_wild",
            Self::DrawCard => "draw_card",
            Self::SayUno => "say_uno",
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client: responses
// ---------------------------------------------------------------------------

/// Typed success payload, one variant per command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponseData {
    RoomCreated { room_code: RoomCode },
    Joined(JoinOutcome),
    Left,
    Started(RoundStart),
    SettingsUpdated { challenge_enabled: bool },
    Played(PlayOutcome),
    ColorChosen(ColorOutcome),
    Challenged(ChallengeOutcome),
    Drew(DrawOutcome),
    UnoCalled(UnoOutcome),
}

/// The answer to one command.
///
/// Every response carries `ok`; failures carry a human-readable `reason`
/// and successes carry `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// `seq` of the envelope that carried the command.
    pub request_seq: u64,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl Response {
    /// A successful response.
    pub fn success(request_seq: u64, data: ResponseData) -> Self {
        Self {
            request_seq,
            ok: true,
            reason: None,
            data: Some(data),
        }
    }

    /// A rejected command.
    pub fn failure(request_seq: u64, reason: impl Into<String>) -> Self {
        Self {
            request_seq,
            ok: false,
            reason: Some(reason.into()),
            data: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client: notifications
// ---------------------------------------------------------------------------

/// Pushed updates. Snapshots let clients redraw from scratch; the rest are
/// presentation cues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    StateUpdate(PublicSnapshot),
    HandUpdate(PrivateSnapshot),
    PlayerJoined {
        player_id: PlayerId,
        name: String,
        reconnected: bool,
        players: Vec<PlayerSummary>,
    },
    PlayerLeft { player_id: PlayerId },
    /// `dealt` holds the recipient's own cards in deal order; it is empty
    /// for displays.
    GameStarted {
        round: u32,
        first_card: Card,
        effects: Vec<Effect>,
        deal_order: Vec<PlayerId>,
        dealt: Vec<Card>,
    },
    CardEffect { effect: Effect },
    ColorSelectionRequired { player_id: PlayerId },
    ChallengeAvailable { offender_id: PlayerId, color: Color },
    ChallengeResult(ChallengeOutcome),
    UnoCalled { player_id: PlayerId, name: String },
    /// A seat drew one card for playing down to one undeclared.
    UnoPenalty { player_id: PlayerId },
    CardsDrawn { player_id: PlayerId, count: u32 },
    RoundOver(RoundSummary),
    GameOver(RoundSummary),
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The content of an envelope.
///
/// `#[serde(tag = "type", content = "data")]` gives
/// `{ "type": "Command", "data": { "type": "draw_card" } }`, so a client can
/// branch on the outer tag before looking inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Payload {
    /// Client → server.
    Command(ClientCommand),
    /// Server → client, exactly one per command.
    Response(Response),
    /// Server → client, unsolicited.
    Notification(Notification),
    /// Client → server keep-alive.
    Heartbeat { client_time: u64 },
    /// Server → client keep-alive answer, for RTT estimation.
    HeartbeatAck { client_time: u64, server_time: u64 },
    /// Server → client: the envelope itself couldn't be handled.
    Error { code: u16, message: String },
}

/// The top-level message wrapper. Every message on the wire is an Envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Per-sender sequence number. Responses echo the command's `seq` as
    /// `request_seq`.
    pub seq: u64,

    /// Milliseconds since the sender started.
    pub timestamp: u64,

    pub payload: Payload,
}
