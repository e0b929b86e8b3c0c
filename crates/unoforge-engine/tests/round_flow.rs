//! Whole rounds driven through the public API with a naive strategy: play
//! the first card the engine accepts, otherwise draw. Checks the structural
//! properties after every accepted command.

use std::collections::HashSet;

use unoforge_engine::{GameConfig, GameEngine, GameError};
use unoforge_protocol::{Color, ConnectionId, Phase, PlayerId, RoomCode};

fn pid(n: u64) -> PlayerId {
    PlayerId(n)
}

fn table(players: u64, seed: u64, challenge_enabled: bool) -> GameEngine {
    let config = GameConfig {
        challenge_enabled,
        ..GameConfig::default()
    };
    let mut engine = GameEngine::with_seed(RoomCode::new("FLOW"), config, seed);
    for n in 1..=players {
        engine
            .add_player(pid(n), &format!("p{n}"), ConnectionId::new(n))
            .unwrap();
    }
    engine
}

fn assert_conserved(engine: &GameEngine) {
    let ids: Vec<_> = engine.cards_in_play().map(|c| c.id).collect();
    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(ids.len(), 108, "card count drifted");
    assert_eq!(unique.len(), ids.len(), "duplicate card id");
}

fn assert_one_sub_phase(engine: &GameEngine) {
    let choosers = engine
        .players()
        .iter()
        .filter(|p| {
            let snap = engine.private_snapshot(p.id()).unwrap();
            snap.must_choose_color || snap.can_challenge
        })
        .count();
    match engine.phase() {
        Phase::AwaitingColor | Phase::AwaitingChallenge => assert_eq!(choosers, 1),
        _ => assert_eq!(choosers, 0),
    }
}

/// Takes one turn for whoever the engine is waiting on.
fn step(engine: &mut GameEngine, challenge_toggle: &mut bool) {
    match engine.phase() {
        Phase::Playing => {
            let current = engine.current_player_id().unwrap();
            let hand = engine.private_snapshot(current).unwrap().hand;
            if hand.len() == 2 {
                engine.say_uno(current).unwrap();
            }
            let played = hand
                .iter()
                .any(|card| engine.play_card(current, card.id).is_ok());
            if !played {
                let outcome = engine.draw_card(current).unwrap();
                assert_ne!(engine.current_player_id(), Some(outcome.player_id));
            }
        }
        Phase::AwaitingColor => {
            let chooser = engine.pending_color_choice().unwrap();
            engine.choose_color(chooser, Color::Green).unwrap();
        }
        Phase::AwaitingChallenge => {
            let challenger = engine.pending_challenger().unwrap();
            *challenge_toggle = !*challenge_toggle;
            engine.challenge_wild(challenger, *challenge_toggle).unwrap();
        }
        phase => panic!("no one to act in {phase:?}"),
    }
}

fn play_out_round(engine: &mut GameEngine) {
    let mut toggle = false;
    for _ in 0..5_000 {
        if !engine.phase().is_in_round() {
            return;
        }
        step(engine, &mut toggle);
        assert_conserved(engine);
        assert_one_sub_phase(engine);
    }
    panic!("round did not finish");
}

#[test]
fn test_random_rounds_conserve_cards() {
    for seed in 0..40 {
        for players in [2, 3, 5] {
            let mut engine = table(players, seed, seed % 2 == 0);
            engine.start_round().unwrap();
            assert_conserved(&engine);
            play_out_round(&mut engine);
            assert!(matches!(
                engine.phase(),
                Phase::RoundOver | Phase::GameOver
            ));
        }
    }
}

#[test]
fn test_game_runs_to_game_over_and_stops() {
    let mut engine = table(2, 99, true);
    let mut rounds = 0;
    while engine.phase() != Phase::GameOver {
        engine.start_round().unwrap();
        play_out_round(&mut engine);
        rounds += 1;
        assert!(rounds < 200, "game never ended");
    }

    let best = engine.players().iter().map(|p| p.score()).max().unwrap();
    assert!(best >= 500);
    assert_eq!(engine.start_round().unwrap_err(), GameError::CannotStart);
}

#[test]
fn test_rejected_commands_leave_state_unchanged() {
    let mut engine = table(3, 5, false);
    engine.start_round().unwrap();
    let before = engine.public_snapshot();
    let not_on_turn = engine
        .players()
        .iter()
        .map(|p| p.id())
        .find(|id| Some(*id) != engine.current_player_id())
        .unwrap();

    assert!(engine.draw_card(not_on_turn).is_err());
    assert!(engine.challenge_wild(not_on_turn, true).is_err());
    assert!(engine.start_round().is_err());

    assert_eq!(engine.public_snapshot(), before);
}
