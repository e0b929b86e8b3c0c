//! Game vocabulary shared by the engine and its clients.
//!
//! The engine's command methods return these outcome types, and the room
//! layer forwards them (or notifications derived from them) to clients.
//! Every outcome is a plain struct or enum with a fixed field set, so the
//! transport adapter can match on it exhaustively.

use serde::{Deserialize, Serialize};

use crate::{Card, CardValue, Color, PlayerId, RoomCode};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The lifecycle phase of a room's engine.
///
/// ```text
/// Lobby → Playing ⇄ AwaitingColor ⇄ AwaitingChallenge → RoundOver
///                                                          │
///            (next round) ←────────────────────────────────┘
///                                                          │
///                                                      GameOver (terminal)
/// ```
///
/// Exactly one phase governs which command is legal at a time: plays and
/// draws only in `Playing`, colour choices only in `AwaitingColor`,
/// challenge answers only in `AwaitingChallenge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    Playing,
    AwaitingColor,
    AwaitingChallenge,
    RoundOver,
    GameOver,
}

impl Phase {
    /// Returns `true` while a round is being played (including the two
    /// "awaiting" sub-phases).
    pub fn is_in_round(self) -> bool {
        matches!(self, Self::Playing | Self::AwaitingColor | Self::AwaitingChallenge)
    }

    /// Returns `true` if a new round may be dealt from this phase.
    pub fn can_start_round(self) -> bool {
        matches!(self, Self::Lobby | Self::RoundOver)
    }
}

/// Direction of play around the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    /// Seat offset for one step: `+1` or `-1`.
    pub fn step(self) -> isize {
        match self {
            Self::Clockwise => 1,
            Self::CounterClockwise => -1,
        }
    }

    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
        }
    }
}

/// Which forced-draw card an active stack accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackKind {
    Draw2,
    Draw4,
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// A presentational effect accompanying a resolved card.
///
/// Effects never drive state on the client; they exist so the display can
/// animate what just happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// The named seat loses its turn.
    Skip { skipped_id: PlayerId },
    /// Direction of play flipped.
    Reverse { direction: Direction },
    /// A draw2 joined the forced-draw stack, which now totals `stack`.
    Draw2 { stack: u32 },
    /// A wild resolved with its colour already chosen.
    Wild,
    /// A wild-draw-four joined the forced-draw stack.
    WildDraw4 { stack: u32 },
    /// The named seat owes a colour choice before play continues.
    ChooseColor { player_id: PlayerId },
    /// The named seat was made to draw `count` cards on the spot.
    ForcedDraw { player_id: PlayerId, count: u32 },
}

// ---------------------------------------------------------------------------
// Command outcomes
// ---------------------------------------------------------------------------

/// Result of a successful `join_room`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinOutcome {
    pub player_id: PlayerId,
    pub room_code: RoomCode,
    pub name: String,
    /// `true` when the room was past the lobby at join time.
    pub game_in_progress: bool,
    /// `true` when this join resumed an existing seat.
    pub reconnected: bool,
}

/// One card leaving the draw pile during the deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealtCard {
    pub player_id: PlayerId,
    pub card: Card,
}

/// Result of `start_game` / `next_round`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartOutcome {
    pub round: u32,
    pub first_card: Card,
    pub effects: Vec<Effect>,
    /// Deal order, for animation only.
    pub deal_sequence: Vec<DealtCard>,
    /// Set when the opening card is a wild and this seat must pick a colour.
    pub awaiting_color: Option<PlayerId>,
}

impl StartOutcome {
    /// The view of the round start that anyone at the table may see: who
    /// was dealt to, in order, but not what.
    pub fn public(&self) -> RoundStart {
        RoundStart {
            round: self.round,
            first_card: self.first_card,
            effects: self.effects.clone(),
            deal_order: self.deal_sequence.iter().map(|d| d.player_id).collect(),
            awaiting_color: self.awaiting_color,
        }
    }

    /// The cards dealt to one seat, in deal order.
    pub fn dealt_to(&self, player_id: PlayerId) -> Vec<Card> {
        self.deal_sequence
            .iter()
            .filter(|d| d.player_id == player_id)
            .map(|d| d.card)
            .collect()
    }
}

/// A round start with the card faces of the deal removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStart {
    pub round: u32,
    pub first_card: Card,
    pub effects: Vec<Effect>,
    pub deal_order: Vec<PlayerId>,
    pub awaiting_color: Option<PlayerId>,
}

/// The forced draw applied when a hand drops to one card undeclared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnoPenalty {
    pub player_id: PlayerId,
    pub card: Card,
}

/// One loser's hand value at the end of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandScore {
    pub player_id: PlayerId,
    pub points: u32,
}

/// A row of the cumulative score table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLine {
    pub player_id: PlayerId,
    pub name: String,
    pub score: u32,
}

/// Scoring report for the play that emptied a hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub winner_id: PlayerId,
    pub round_score: u32,
    pub total_score: u32,
    pub win_score: u32,
    pub hand_scores: Vec<HandScore>,
    pub scores: Vec<ScoreLine>,
    /// `true` when the winner's total reached the win threshold.
    pub game_over: bool,
}

/// Where a play or colour choice left the turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    /// A wild was played; the same seat must now choose a colour.
    AwaitingColor { player_id: PlayerId },
    /// A wild-draw-four's colour was chosen; the named seat may challenge.
    AwaitingChallenge {
        challenger_id: PlayerId,
        offender_id: PlayerId,
    },
    /// The card's effect ran and the turn moved on (or the round ended).
    Resolved {
        effects: Vec<Effect>,
        round_end: Option<RoundSummary>,
    },
}

impl Resolution {
    /// The round summary, if this resolution ended the round.
    pub fn round_end(&self) -> Option<&RoundSummary> {
        match self {
            Self::Resolved { round_end, .. } => round_end.as_ref(),
            _ => None,
        }
    }
}

/// Result of `play_card`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayOutcome {
    pub player_id: PlayerId,
    pub card: Card,
    pub hand_count: usize,
    pub uno_penalty: Option<UnoPenalty>,
    pub resolution: Resolution,
}

/// Result of `choose_color`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorOutcome {
    pub player_id: PlayerId,
    pub color: Color,
    pub resolution: Resolution,
}

/// How a wild-draw-four challenge was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeVerdict {
    /// The challenger accepted the draw without accusing.
    Declined,
    /// The offender held a playable colour match: the offender draws.
    Succeeded,
    /// The play was legal: the challenger draws the stack plus a penalty.
    Failed,
}

/// Result of `challenge_wild`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeOutcome {
    pub verdict: ChallengeVerdict,
    pub challenger_id: PlayerId,
    pub offender_id: PlayerId,
    /// Number of cards drawn as a result.
    pub drew: u32,
    /// Who drew them.
    pub drew_player: PlayerId,
}

/// Result of `draw_card`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawOutcome {
    pub player_id: PlayerId,
    pub drawn_cards: Vec<Card>,
    pub draw_count: u32,
    pub hand_count: usize,
}

/// Result of `say_uno`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnoOutcome {
    pub player_id: PlayerId,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Public view of one seat. Never includes hand contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub avatar: String,
    pub card_count: usize,
    pub score: u32,
    pub declared_uno: bool,
    pub connected: bool,
}

/// Read-only projection for the shared display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicSnapshot {
    pub room_code: RoomCode,
    pub phase: Phase,
    pub round: u32,
    pub direction: Direction,
    pub current_player_index: usize,
    pub current_player_id: Option<PlayerId>,
    pub current_color: Option<Color>,
    pub current_value: Option<CardValue>,
    pub top_card: Option<Card>,
    pub draw_pile_count: usize,
    pub draw_stack: u32,
    pub challenge_enabled: bool,
    pub win_score: u32,
    pub players: Vec<PlayerSummary>,
}

/// Read-only projection for one hand controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateSnapshot {
    pub player_id: PlayerId,
    pub hand: Vec<Card>,
    pub is_current_turn: bool,
    pub phase: Phase,
    pub current_color: Option<Color>,
    pub current_value: Option<CardValue>,
    pub top_card: Option<Card>,
    pub draw_stack: u32,
    /// `true` when this player owes a colour choice.
    pub must_choose_color: bool,
    /// `true` when this player may answer a wild-draw-four challenge.
    pub can_challenge: bool,
    pub declared_uno: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_is_in_round() {
        assert!(!Phase::Lobby.is_in_round());
        assert!(Phase::Playing.is_in_round());
        assert!(Phase::AwaitingColor.is_in_round());
        assert!(Phase::AwaitingChallenge.is_in_round());
        assert!(!Phase::RoundOver.is_in_round());
        assert!(!Phase::GameOver.is_in_round());
    }

    #[test]
    fn test_phase_can_start_round() {
        assert!(Phase::Lobby.can_start_round());
        assert!(Phase::RoundOver.can_start_round());
        assert!(!Phase::Playing.can_start_round());
        assert!(!Phase::GameOver.can_start_round());
    }

    #[test]
    fn test_direction_step_and_reverse() {
        assert_eq!(Direction::Clockwise.step(), 1);
        assert_eq!(Direction::Clockwise.reversed(), Direction::CounterClockwise);
        assert_eq!(Direction::CounterClockwise.step(), -1);
    }

    #[test]
    fn test_effect_json_is_internally_tagged() {
        let json = serde_json::to_value(Effect::Skip {
            skipped_id: PlayerId(3),
        })
        .unwrap();
        assert_eq!(json["type"], "skip");
        assert_eq!(json["skipped_id"], 3);
    }

    #[test]
    fn test_resolution_json_carries_status_tag() {
        let json = serde_json::to_value(Resolution::AwaitingColor {
            player_id: PlayerId(1),
        })
        .unwrap();
        assert_eq!(json["status"], "awaiting_color");
        assert_eq!(json["player_id"], 1);
    }

    #[test]
    fn test_start_outcome_public_drops_card_faces() {
        use crate::{CardValue, Color};

        let dealt = |player, id, n| DealtCard {
            player_id: PlayerId(player),
            card: Card::new(id, Color::Green, CardValue::Number(n)),
        };
        let outcome = StartOutcome {
            round: 1,
            first_card: Card::new(9, Color::Red, CardValue::Number(0)),
            effects: Vec::new(),
            deal_sequence: vec![dealt(1, 1, 3), dealt(2, 2, 4), dealt(1, 3, 5)],
            awaiting_color: None,
        };

        let public = outcome.public();
        assert_eq!(public.deal_order, vec![PlayerId(1), PlayerId(2), PlayerId(1)]);
        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("green"));

        let own = outcome.dealt_to(PlayerId(1));
        assert_eq!(own.len(), 2);
        assert_eq!(own[1].value, CardValue::Number(5));
    }
}
