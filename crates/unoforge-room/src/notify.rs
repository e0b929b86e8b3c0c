//! Turns engine outcomes into notifications.
//!
//! Every function returns the complete fan-out for one event as
//! `(Recipient, Notification)` pairs; the room actor only delivers them.
//! Each list ends with fresh snapshots: a public one for everyone and a
//! private one per seat, so a client that missed a cue can still redraw.

use unoforge_engine::GameEngine;
use unoforge_protocol::{
    JoinOutcome, Notification, PlayerId, Recipient, Resolution, ResponseData, StartOutcome,
};

pub(crate) type Outbound = Vec<(Recipient, Notification)>;

/// Only the snapshots.
pub(crate) fn state_changed(engine: &GameEngine) -> Outbound {
    let mut out = Vec::new();
    push_snapshots(engine, &mut out);
    out
}

pub(crate) fn joined(engine: &GameEngine, outcome: &JoinOutcome) -> Outbound {
    let mut out = vec![(
        Recipient::All,
        Notification::PlayerJoined {
            player_id: outcome.player_id,
            name: outcome.name.clone(),
            reconnected: outcome.reconnected,
            players: engine.public_snapshot().players,
        },
    )];
    push_snapshots(engine, &mut out);
    out
}

pub(crate) fn left(engine: &GameEngine, player_id: PlayerId) -> Outbound {
    let mut out = vec![(Recipient::All, Notification::PlayerLeft { player_id })];
    push_snapshots(engine, &mut out);
    out
}

/// Fan-out for a round start. Everyone sees who was dealt to; only the
/// seat itself sees which cards it got.
pub(crate) fn round_started(engine: &GameEngine, started: &StartOutcome) -> Outbound {
    let public = started.public();
    let mut out = vec![(
        Recipient::Display,
        Notification::GameStarted {
            round: public.round,
            first_card: public.first_card,
            effects: public.effects.clone(),
            deal_order: public.deal_order.clone(),
            dealt: Vec::new(),
        },
    )];
    for player in engine.players() {
        out.push((
            Recipient::Player(player.id()),
            Notification::GameStarted {
                round: public.round,
                first_card: public.first_card,
                effects: public.effects.clone(),
                deal_order: public.deal_order.clone(),
                dealt: started.dealt_to(player.id()),
            },
        ));
    }
    if let Some(player_id) = started.awaiting_color {
        out.push((
            Recipient::Player(player_id),
            Notification::ColorSelectionRequired { player_id },
        ));
    }
    push_snapshots(engine, &mut out);
    out
}

/// Fan-out after any other successful game action.
pub(crate) fn after_action(engine: &GameEngine, data: &ResponseData) -> Outbound {
    let mut out = Vec::new();
    match data {
        ResponseData::Played(played) => {
            // the drawn card itself only reaches the player's own hand update
            if let Some(penalty) = &played.uno_penalty {
                out.push((
                    Recipient::All,
                    Notification::UnoPenalty {
                        player_id: penalty.player_id,
                    },
                ));
            }
            push_resolution(&played.resolution, &mut out);
        }
        ResponseData::ColorChosen(chosen) => match &chosen.resolution {
            Resolution::AwaitingChallenge {
                challenger_id,
                offender_id,
            } => out.push((
                Recipient::Player(*challenger_id),
                Notification::ChallengeAvailable {
                    offender_id: *offender_id,
                    color: chosen.color,
                },
            )),
            other => push_resolution(other, &mut out),
        },
        ResponseData::Challenged(outcome) => {
            out.push((Recipient::All, Notification::ChallengeResult(outcome.clone())));
            out.push((
                Recipient::All,
                Notification::CardsDrawn {
                    player_id: outcome.drew_player,
                    count: outcome.drew,
                },
            ));
        }
        ResponseData::Drew(drew) => out.push((
            Recipient::All,
            Notification::CardsDrawn {
                player_id: drew.player_id,
                count: drew.draw_count,
            },
        )),
        ResponseData::UnoCalled(called) => out.push((
            Recipient::All,
            Notification::UnoCalled {
                player_id: called.player_id,
                name: called.name.clone(),
            },
        )),
        // round starts go through `round_started`
        ResponseData::Started(_)
        | ResponseData::SettingsUpdated { .. }
        | ResponseData::RoomCreated { .. }
        | ResponseData::Joined(_)
        | ResponseData::Left => {}
    }
    push_snapshots(engine, &mut out);
    out
}

fn push_resolution(resolution: &Resolution, out: &mut Outbound) {
    match resolution {
        Resolution::AwaitingColor { player_id } => out.push((
            Recipient::Player(*player_id),
            Notification::ColorSelectionRequired {
                player_id: *player_id,
            },
        )),
        // only a colour choice opens a challenge; see `after_action`
        Resolution::AwaitingChallenge { .. } => {}
        Resolution::Resolved { effects, round_end } => {
            for effect in effects {
                out.push((
                    Recipient::All,
                    Notification::CardEffect {
                        effect: effect.clone(),
                    },
                ));
            }
            if let Some(summary) = round_end {
                let notification = if summary.game_over {
                    Notification::GameOver(summary.clone())
                } else {
                    Notification::RoundOver(summary.clone())
                };
                out.push((Recipient::All, notification));
            }
        }
    }
}

fn push_snapshots(engine: &GameEngine, out: &mut Outbound) {
    out.push((
        Recipient::All,
        Notification::StateUpdate(engine.public_snapshot()),
    ));
    for player in engine.players() {
        if let Some(snapshot) = engine.private_snapshot(player.id()) {
            out.push((
                Recipient::Player(player.id()),
                Notification::HandUpdate(snapshot),
            ));
        }
    }
}
