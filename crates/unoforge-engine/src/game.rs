//! The room-scoped game state machine.
//!
//! `GameEngine` owns everything that changes during a round. Each public
//! command method validates first and mutates second: a rejected command
//! returns `Err` and leaves the engine exactly as it found it.
//!
//! Piles are `Vec<Card>` with the top at the end, so drawing is `pop()` and
//! discarding is `push()`.

use std::collections::HashSet;
use std::mem;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use unoforge_protocol::{
    Card, CardId, CardValue, ChallengeOutcome, ChallengeVerdict, Color, ColorOutcome,
    ConnectionId, DealtCard, Direction, DrawOutcome, Effect, HandScore, Phase, PlayOutcome,
    PlayerId, PrivateSnapshot, PublicSnapshot, Resolution, RoomCode, RoundSummary, ScoreLine,
    StackKind, StartOutcome, UnoOutcome, UnoPenalty,
};

use crate::player::{AVATARS, Player};
use crate::{GameConfig, GameError, deck, scoring};

/// The pending forced draw. Its presence is the "stack is active" state, so
/// a count can never exist without a kind.
#[derive(Debug, Clone, Copy)]
struct DrawStack {
    kind: StackKind,
    count: u32,
}

/// What a challenge needs to know about the wild-draw-four it judges.
#[derive(Debug, Clone)]
struct ChallengeSnapshot {
    offender_id: PlayerId,
    hand_before_play: Vec<Card>,
    color_before_play: Option<Color>,
}

impl ChallengeSnapshot {
    /// The play was illegal if the offender held a non-wild card of the
    /// colour that was active when they played.
    fn play_was_illegal(&self) -> bool {
        let Some(active) = self.color_before_play else {
            return false;
        };
        self.hand_before_play
            .iter()
            .any(|c| !c.is_wild() && c.color == active)
    }
}

/// One room's game.
pub struct GameEngine {
    code: RoomCode,
    config: GameConfig,
    phase: Phase,
    round: u32,
    players: Vec<Player>,
    direction: Direction,
    current: usize,
    draw_pile: Vec<Card>,
    discard_pile: Vec<Card>,
    current_color: Option<Color>,
    current_value: Option<CardValue>,
    draw_stack: Option<DrawStack>,
    win_score: u32,
    pending_color: Option<PlayerId>,
    challenge: Option<ChallengeSnapshot>,
    uno_declared: HashSet<PlayerId>,
    next_card_id: u32,
    avatar_cursor: usize,
    rng: StdRng,
}

impl GameEngine {
    /// Creates an engine in the lobby, shuffling from OS entropy.
    pub fn new(code: RoomCode, config: GameConfig) -> Self {
        Self::with_rng(code, config, StdRng::from_os_rng())
    }

    /// Creates an engine whose deals are reproducible from `seed`.
    pub fn with_seed(code: RoomCode, config: GameConfig, seed: u64) -> Self {
        Self::with_rng(code, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(code: RoomCode, config: GameConfig, rng: StdRng) -> Self {
        let win_score = config.win_score(config.min_players);
        Self {
            code,
            config,
            phase: Phase::Lobby,
            round: 0,
            players: Vec::new(),
            direction: Direction::Clockwise,
            current: 0,
            draw_pile: Vec::new(),
            discard_pile: Vec::new(),
            current_color: None,
            current_value: None,
            draw_stack: None,
            win_score,
            pending_color: None,
            challenge: None,
            uno_declared: HashSet::new(),
            next_card_id: 0,
            avatar_cursor: 0,
            rng,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Seats in turn order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// The seat on turn. `None` only when the room is empty.
    pub fn current_player_id(&self) -> Option<PlayerId> {
        self.players.get(self.current).map(|p| p.id)
    }

    /// The seat that may answer the pending challenge, if one is open.
    pub fn pending_challenger(&self) -> Option<PlayerId> {
        (self.phase == Phase::AwaitingChallenge).then(|| self.players[self.next_seat()].id)
    }

    /// The seat that owes a colour choice, if one is pending.
    pub fn pending_color_choice(&self) -> Option<PlayerId> {
        self.pending_color
    }

    pub fn current_color(&self) -> Option<Color> {
        self.current_color
    }

    pub fn top_card(&self) -> Option<Card> {
        self.discard_pile.last().copied()
    }

    /// Cards owed by whoever next draws instead of stacking.
    pub fn draw_stack(&self) -> u32 {
        self.draw_stack.map_or(0, |s| s.count)
    }

    pub fn connected_count(&self) -> usize {
        self.players.iter().filter(|p| p.connected).count()
    }

    /// Every card the engine currently holds: draw pile, discard pile and
    /// all hands.
    pub fn cards_in_play(&self) -> impl Iterator<Item = &Card> + '_ {
        self.draw_pile
            .iter()
            .chain(self.discard_pile.iter())
            .chain(self.players.iter().flat_map(|p| p.hand.iter()))
    }

    /// Case-insensitive name lookup.
    pub fn find_player_by_name(&self, name: &str) -> Option<&Player> {
        let wanted = name.trim().to_lowercase();
        self.players.iter().find(|p| p.name.to_lowercase() == wanted)
    }

    // -----------------------------------------------------------------------
    // Seating
    // -----------------------------------------------------------------------

    /// Seats a new player. Only legal in the lobby.
    pub fn add_player(
        &mut self,
        player_id: PlayerId,
        name: &str,
        connection: ConnectionId,
    ) -> Result<&Player, GameError> {
        if self.phase != Phase::Lobby {
            return Err(GameError::GameInProgress);
        }
        if self.players.len() >= self.config.max_players {
            return Err(GameError::RoomFull(self.config.max_players));
        }
        if self.seat_of(player_id).is_some() {
            return Err(GameError::AlreadyJoined);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::InvalidName);
        }
        if self.find_player_by_name(name).is_some() {
            return Err(GameError::NameTaken);
        }

        let avatar = AVATARS[self.avatar_cursor % AVATARS.len()];
        self.avatar_cursor += 1;

        let seat = self.players.len();
        self.players
            .push(Player::new(player_id, name.to_string(), avatar, connection));
        tracing::info!(room = %self.code, %player_id, name, seat, "player seated");
        Ok(&self.players[seat])
    }

    /// Rebinds an existing seat to a new connection. Legal in any phase.
    pub fn reconnect_player(
        &mut self,
        player_id: PlayerId,
        connection: ConnectionId,
    ) -> Result<&Player, GameError> {
        let seat = self
            .seat_of(player_id)
            .ok_or(GameError::PlayerNotFound(player_id))?;
        let player = &mut self.players[seat];
        player.connection = connection;
        player.connected = true;
        player.disconnected_at = None;
        tracing::info!(room = %self.code, %player_id, %connection, "player reconnected");
        Ok(&*player)
    }

    /// Marks a seat as disconnected. The seat keeps its hand and its turn.
    pub fn disconnect_player(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        let seat = self
            .seat_of(player_id)
            .ok_or(GameError::PlayerNotFound(player_id))?;
        let player = &mut self.players[seat];
        player.connected = false;
        player.disconnected_at = Some(Instant::now());
        tracing::info!(room = %self.code, %player_id, "player disconnected");
        Ok(())
    }

    /// Removes a seat for good.
    ///
    /// The departing hand goes to the bottom of the draw pile. If the round
    /// can no longer continue with the seats that remain it is abandoned
    /// without scoring.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<Player, GameError> {
        let seat = self
            .seat_of(player_id)
            .ok_or(GameError::PlayerNotFound(player_id))?;
        let mut player = self.players.remove(seat);
        self.uno_declared.remove(&player_id);
        let hand = mem::take(&mut player.hand);
        let pile = mem::replace(&mut self.draw_pile, hand);
        self.draw_pile.extend(pile);
        tracing::info!(
            room = %self.code,
            %player_id,
            remaining = self.players.len(),
            "player removed"
        );

        if self.players.is_empty() {
            self.current = 0;
            if self.phase.is_in_round() {
                self.abandon_round();
            }
            return Ok(player);
        }

        let was_on_turn = seat == self.current;
        let seats = self.players.len();
        if seat < self.current {
            self.current -= 1;
        } else if was_on_turn {
            // the seat that would have played next is now on turn
            self.current = match self.direction {
                Direction::Clockwise => seat % seats,
                Direction::CounterClockwise => (seat + seats - 1) % seats,
            };
        }

        if !self.phase.is_in_round() {
            return Ok(player);
        }
        if seats < self.config.min_players {
            self.abandon_round();
            return Ok(player);
        }

        match self.phase {
            Phase::AwaitingColor if self.pending_color == Some(player_id) => {
                self.settle_abandoned_color_choice();
            }
            Phase::AwaitingChallenge
                if self
                    .challenge
                    .as_ref()
                    .is_some_and(|c| c.offender_id == player_id) =>
            {
                // the offender left; the folded stack stays with the next seat
                self.challenge = None;
                self.phase = Phase::Playing;
            }
            _ => {}
        }
        Ok(player)
    }

    /// Toggles wild-draw-four challenges. Only between rounds.
    pub fn set_challenge_enabled(&mut self, enabled: bool) -> Result<(), GameError> {
        if !self.phase.can_start_round() {
            return Err(GameError::SettingsLocked);
        }
        self.config.challenge_enabled = enabled;
        tracing::info!(room = %self.code, enabled, "challenge setting changed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Round lifecycle
    // -----------------------------------------------------------------------

    /// Deals a new round. Used for both the first round and every one after.
    pub fn start_round(&mut self) -> Result<StartOutcome, GameError> {
        if self.players.len() < self.config.min_players {
            return Err(GameError::NotEnoughPlayers(self.config.min_players));
        }
        if !self.phase.can_start_round() {
            return Err(GameError::CannotStart);
        }

        self.round += 1;
        self.draw_pile = deck::shuffled(self.next_card_id, &mut self.rng);
        self.next_card_id += deck::DECK_SIZE;
        self.discard_pile.clear();
        self.direction = Direction::Clockwise;
        self.current = 0;
        self.draw_stack = None;
        self.pending_color = None;
        self.challenge = None;
        self.uno_declared.clear();
        self.win_score = self.config.win_score(self.players.len());
        for player in &mut self.players {
            player.hand.clear();
            player.said_uno = false;
        }

        let mut deal_sequence = Vec::with_capacity(self.config.hand_size * self.players.len());
        for _ in 0..self.config.hand_size {
            for seat in 0..self.players.len() {
                let card = self.draw_one();
                self.players[seat].hand.push(card);
                deal_sequence.push(DealtCard {
                    player_id: self.players[seat].id,
                    card,
                });
            }
        }

        let first_card = self.flip_opening_card();
        self.discard_pile.push(first_card);
        self.current_value = Some(first_card.value);
        self.current_color = (!first_card.is_wild()).then_some(first_card.color);
        self.phase = Phase::Playing;
        let effects = self.apply_opening_effect(first_card.value);

        tracing::info!(
            room = %self.code,
            round = self.round,
            players = self.players.len(),
            %first_card,
            "round started"
        );

        Ok(StartOutcome {
            round: self.round,
            first_card,
            effects,
            deal_sequence,
            awaiting_color: self.pending_color,
        })
    }

    fn flip_opening_card(&mut self) -> Card {
        loop {
            let card = self.draw_one();
            if card.value != CardValue::WildDraw4 {
                return card;
            }
            // a wild-draw-four never opens a round
            let at = self.rng.random_range(0..=self.draw_pile.len());
            self.draw_pile.insert(at, card);
            if self
                .draw_pile
                .iter()
                .all(|c| c.value == CardValue::WildDraw4)
            {
                self.add_fresh_deck();
            }
        }
    }

    /// The opening card acts on the first seat itself rather than the seat
    /// after it.
    fn apply_opening_effect(&mut self, value: CardValue) -> Vec<Effect> {
        let first = self.players[0].id;
        match value {
            CardValue::Skip => {
                self.current = self.seat_after(0, 1);
                vec![Effect::Skip { skipped_id: first }]
            }
            CardValue::Reverse if self.players.len() == 2 => {
                self.current = self.seat_after(0, 1);
                vec![Effect::Skip { skipped_id: first }]
            }
            CardValue::Reverse => {
                self.direction = self.direction.reversed();
                self.current = self.seat_after(0, 1);
                vec![Effect::Reverse {
                    direction: self.direction,
                }]
            }
            CardValue::Draw2 => {
                self.give_cards(0, 2);
                self.current = self.seat_after(0, 1);
                vec![Effect::ForcedDraw {
                    player_id: first,
                    count: 2,
                }]
            }
            CardValue::Wild => {
                self.phase = Phase::AwaitingColor;
                self.pending_color = Some(first);
                vec![Effect::ChooseColor { player_id: first }]
            }
            CardValue::Number(_) | CardValue::WildDraw4 => Vec::new(),
        }
    }

    fn abandon_round(&mut self) {
        self.phase = Phase::RoundOver;
        self.draw_stack = None;
        self.pending_color = None;
        self.challenge = None;
        self.uno_declared.clear();
        tracing::info!(room = %self.code, round = self.round, "round abandoned");
    }

    // -----------------------------------------------------------------------
    // Turn commands
    // -----------------------------------------------------------------------

    /// Plays a card from the caller's hand.
    pub fn play_card(
        &mut self,
        player_id: PlayerId,
        card_id: CardId,
    ) -> Result<PlayOutcome, GameError> {
        if self.phase != Phase::Playing {
            return Err(GameError::NotAcceptingPlays);
        }
        let seat = self.turn_seat(player_id)?;
        let Some(card) = self.players[seat].card(card_id) else {
            return Err(GameError::CardNotInHand);
        };
        match self.draw_stack {
            Some(stack) if !stack_accepts(stack.kind, card.value) => {
                return Err(GameError::MustMatchStack(stack.kind));
            }
            Some(_) => {}
            None if !self.is_playable(&card) => return Err(GameError::CardNotPlayable),
            None => {}
        }

        let hand_before_play =
            (card.value == CardValue::WildDraw4).then(|| self.players[seat].hand.clone());
        self.players[seat].discard(card_id);
        self.discard_pile.push(card);
        let color_before_play = self.current_color;
        self.current_value = Some(card.value);
        let uno_penalty = self.apply_uno_rule(seat);

        let resolution = if card.is_wild() {
            if let Some(hand_before_play) = hand_before_play {
                self.challenge = Some(ChallengeSnapshot {
                    offender_id: player_id,
                    hand_before_play,
                    color_before_play,
                });
            }
            self.pending_color = Some(player_id);
            self.phase = Phase::AwaitingColor;
            Resolution::AwaitingColor { player_id }
        } else {
            self.current_color = Some(card.color);
            self.resolve(seat, card.value)
        };

        tracing::debug!(room = %self.code, %player_id, %card, "card played");
        Ok(PlayOutcome {
            player_id,
            card,
            hand_count: self.players[seat].hand.len(),
            uno_penalty,
            resolution,
        })
    }

    /// Settles the colour owed after a wild.
    pub fn choose_color(
        &mut self,
        player_id: PlayerId,
        color: Color,
    ) -> Result<ColorOutcome, GameError> {
        if self.phase != Phase::AwaitingColor {
            return Err(GameError::NoColorChoicePending);
        }
        if self.pending_color != Some(player_id) {
            return Err(GameError::NotYourColorChoice);
        }
        if color.is_wild() {
            return Err(GameError::InvalidColor);
        }

        self.pending_color = None;
        self.current_color = Some(color);
        let seat = self.current;
        let resolution = if self.current_value == Some(CardValue::WildDraw4) {
            self.resolve_wild_draw4(seat)
        } else {
            self.phase = Phase::Playing;
            self.resolve(seat, CardValue::Wild)
        };

        tracing::debug!(room = %self.code, %player_id, %color, "color chosen");
        Ok(ColorOutcome {
            player_id,
            color,
            resolution,
        })
    }

    /// Answers an open wild-draw-four challenge.
    pub fn challenge_wild(
        &mut self,
        challenger_id: PlayerId,
        do_challenge: bool,
    ) -> Result<ChallengeOutcome, GameError> {
        if self.phase != Phase::AwaitingChallenge {
            return Err(GameError::NoChallengePending);
        }
        let challenger = self.next_seat();
        if self.players[challenger].id != challenger_id {
            return Err(GameError::NotYourChallenge);
        }

        let offender = self.current;
        let offender_id = self.players[offender].id;
        let snapshot = self.challenge.take();
        let stack = self.draw_stack.take().map_or(0, |s| s.count);
        let after_challenger = self.seat_after(challenger, 1);

        let (verdict, drawer, drew, next) = if !do_challenge {
            (ChallengeVerdict::Declined, challenger, stack, after_challenger)
        } else if snapshot.as_ref().is_some_and(ChallengeSnapshot::play_was_illegal) {
            let remaining = stack.saturating_sub(4);
            if remaining > 0 {
                self.draw_stack = Some(DrawStack {
                    kind: StackKind::Draw4,
                    count: remaining,
                });
            }
            (ChallengeVerdict::Succeeded, offender, 4, challenger)
        } else {
            (ChallengeVerdict::Failed, challenger, stack + 2, after_challenger)
        };

        self.give_cards(drawer, drew);
        self.current = next;
        self.phase = Phase::Playing;

        let drew_player = self.players[drawer].id;
        tracing::info!(
            room = %self.code,
            %challenger_id,
            %offender_id,
            ?verdict,
            drew,
            "challenge settled"
        );
        Ok(ChallengeOutcome {
            verdict,
            challenger_id,
            offender_id,
            drew,
            drew_player,
        })
    }

    /// Draws the pending stack, or one card, and ends the turn.
    pub fn draw_card(&mut self, player_id: PlayerId) -> Result<DrawOutcome, GameError> {
        if self.phase != Phase::Playing {
            return Err(GameError::CannotDraw);
        }
        let seat = self.turn_seat(player_id)?;

        let draw_count = self.draw_stack.take().map_or(1, |s| s.count);
        let drawn_cards = self.give_cards(seat, draw_count);
        self.current = self.next_seat();

        tracing::debug!(room = %self.code, %player_id, draw_count, "cards drawn");
        Ok(DrawOutcome {
            player_id,
            drawn_cards,
            draw_count,
            hand_count: self.players[seat].hand.len(),
        })
    }

    /// Declares UNO ahead of the play that drops the hand to one card.
    pub fn say_uno(&mut self, player_id: PlayerId) -> Result<UnoOutcome, GameError> {
        let seat = self
            .seat_of(player_id)
            .ok_or(GameError::PlayerNotFound(player_id))?;
        if !self.phase.is_in_round() {
            return Err(GameError::NotAcceptingPlays);
        }
        if self.players[seat].hand.len() != 2 {
            return Err(GameError::UnoHandSize);
        }
        if !self.uno_declared.insert(player_id) {
            return Err(GameError::UnoAlreadyCalled);
        }
        let player = &mut self.players[seat];
        player.said_uno = true;

        tracing::debug!(room = %self.code, %player_id, "uno declared");
        Ok(UnoOutcome {
            player_id,
            name: player.name.clone(),
        })
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// The shared view. Hand contents never appear here.
    pub fn public_snapshot(&self) -> PublicSnapshot {
        PublicSnapshot {
            room_code: self.code.clone(),
            phase: self.phase,
            round: self.round,
            direction: self.direction,
            current_player_index: self.current,
            current_player_id: self.current_player_id(),
            current_color: self.current_color,
            current_value: self.current_value,
            top_card: self.top_card(),
            draw_pile_count: self.draw_pile.len(),
            draw_stack: self.draw_stack(),
            challenge_enabled: self.config.challenge_enabled,
            win_score: self.win_score,
            players: self.players.iter().map(Player::summary).collect(),
        }
    }

    /// One player's own view, or `None` if they have no seat.
    pub fn private_snapshot(&self, player_id: PlayerId) -> Option<PrivateSnapshot> {
        let seat = self.seat_of(player_id)?;
        let player = &self.players[seat];
        Some(PrivateSnapshot {
            player_id,
            hand: player.hand.clone(),
            is_current_turn: self.phase.is_in_round() && seat == self.current,
            phase: self.phase,
            current_color: self.current_color,
            current_value: self.current_value,
            top_card: self.top_card(),
            draw_stack: self.draw_stack(),
            must_choose_color: self.phase == Phase::AwaitingColor
                && self.pending_color == Some(player_id),
            can_challenge: self.pending_challenger() == Some(player_id),
            declared_uno: player.said_uno,
        })
    }

    // -----------------------------------------------------------------------
    // Effect resolution
    // -----------------------------------------------------------------------

    /// Runs a resolved card's effect, advances the turn, and checks whether
    /// the acting seat just won.
    fn resolve(&mut self, seat: usize, value: CardValue) -> Resolution {
        let mut effects = Vec::new();
        match value {
            CardValue::Skip => self.skip_next(&mut effects),
            CardValue::Reverse if self.players.len() == 2 => self.skip_next(&mut effects),
            CardValue::Reverse => {
                self.direction = self.direction.reversed();
                effects.push(Effect::Reverse {
                    direction: self.direction,
                });
                self.current = self.next_seat();
            }
            CardValue::Draw2 => {
                let stack = self.push_stack(StackKind::Draw2, 2);
                effects.push(Effect::Draw2 { stack });
                self.current = self.next_seat();
            }
            CardValue::Wild => {
                effects.push(Effect::Wild);
                self.current = self.next_seat();
            }
            CardValue::WildDraw4 | CardValue::Number(_) => self.current = self.next_seat(),
        }
        let round_end = self.finish_round_if_won(seat);
        Resolution::Resolved { effects, round_end }
    }

    fn resolve_wild_draw4(&mut self, seat: usize) -> Resolution {
        let offender_id = self.players[seat].id;
        let stack = self.push_stack(StackKind::Draw4, 4);
        let challenger = self.next_seat();

        if self.config.challenge_enabled && !self.players[seat].hand.is_empty() {
            self.phase = Phase::AwaitingChallenge;
            return Resolution::AwaitingChallenge {
                challenger_id: self.players[challenger].id,
                offender_id,
            };
        }

        self.phase = Phase::Playing;
        self.challenge = None;
        self.current = challenger;
        let effects = vec![Effect::WildDraw4 { stack }];
        let round_end = self.finish_round_if_won(seat);
        Resolution::Resolved { effects, round_end }
    }

    fn skip_next(&mut self, effects: &mut Vec<Effect>) {
        let skipped = self.next_seat();
        effects.push(Effect::Skip {
            skipped_id: self.players[skipped].id,
        });
        self.current = self.seat_after(self.current, 2);
    }

    fn push_stack(&mut self, kind: StackKind, amount: u32) -> u32 {
        let stack = self.draw_stack.get_or_insert(DrawStack { kind, count: 0 });
        stack.kind = kind;
        stack.count += amount;
        stack.count
    }

    /// A play that drops a hand to one card without a prior declaration
    /// costs one card.
    fn apply_uno_rule(&mut self, seat: usize) -> Option<UnoPenalty> {
        let player_id = self.players[seat].id;
        let declared = self.uno_declared.remove(&player_id);
        if self.players[seat].hand.len() != 1 {
            self.players[seat].said_uno = false;
            return None;
        }
        if declared {
            self.players[seat].said_uno = true;
            return None;
        }

        let card = self.draw_one();
        let player = &mut self.players[seat];
        player.hand.push(card);
        player.said_uno = false;
        tracing::debug!(room = %self.code, %player_id, "uno penalty");
        Some(UnoPenalty { player_id, card })
    }

    fn finish_round_if_won(&mut self, seat: usize) -> Option<RoundSummary> {
        if !self.players[seat].hand.is_empty() {
            return None;
        }
        // hands are scored as they stand; a stack left by the winning card is never drawn
        self.draw_stack = None;
        Some(self.score_round(seat))
    }

    fn score_round(&mut self, winner: usize) -> RoundSummary {
        let hand_scores: Vec<HandScore> = self
            .players
            .iter()
            .enumerate()
            .filter(|(seat, _)| *seat != winner)
            .map(|(_, p)| HandScore {
                player_id: p.id,
                points: scoring::hand_points(&p.hand),
            })
            .collect();
        let round_score: u32 = hand_scores.iter().map(|h| h.points).sum();

        let player = &mut self.players[winner];
        player.score += round_score;
        let winner_id = player.id;
        let total_score = player.score;
        let game_over = total_score >= self.win_score;

        self.phase = if game_over {
            Phase::GameOver
        } else {
            Phase::RoundOver
        };
        self.pending_color = None;
        self.challenge = None;
        self.uno_declared.clear();

        tracing::info!(
            room = %self.code,
            round = self.round,
            winner = %winner_id,
            round_score,
            total_score,
            game_over,
            "round won"
        );

        RoundSummary {
            winner_id,
            round_score,
            total_score,
            win_score: self.win_score,
            hand_scores,
            scores: self
                .players
                .iter()
                .map(|p| ScoreLine {
                    player_id: p.id,
                    name: p.name.clone(),
                    score: p.score,
                })
                .collect(),
            game_over,
        }
    }

    /// A colour choice abandoned by a departing seat is made at random, and
    /// a wild-draw-four still lands on the seat now on turn.
    fn settle_abandoned_color_choice(&mut self) {
        let color = Color::PLAYABLE[self.rng.random_range(0..Color::PLAYABLE.len())];
        self.current_color = Some(color);
        self.pending_color = None;
        if self.current_value == Some(CardValue::WildDraw4) {
            self.push_stack(StackKind::Draw4, 4);
            self.challenge = None;
        }
        self.phase = Phase::Playing;
    }

    // -----------------------------------------------------------------------
    // Piles
    // -----------------------------------------------------------------------

    fn draw_one(&mut self) -> Card {
        loop {
            if let Some(card) = self.draw_pile.pop() {
                return card;
            }
            self.replenish_draw_pile();
        }
    }

    /// Moves `count` cards from the draw pile into a hand. Receiving cards
    /// voids any UNO declaration.
    fn give_cards(&mut self, seat: usize, count: u32) -> Vec<Card> {
        let drawn: Vec<Card> = (0..count).map(|_| self.draw_one()).collect();
        let player = &mut self.players[seat];
        player.hand.extend_from_slice(&drawn);
        player.said_uno = false;
        self.uno_declared.remove(&player.id);
        drawn
    }

    fn replenish_draw_pile(&mut self) {
        if self.discard_pile.len() > 1 {
            let top = self.discard_pile.pop();
            let mut recycled = mem::take(&mut self.discard_pile);
            deck::shuffle(&mut recycled, &mut self.rng);
            self.draw_pile = recycled;
            self.discard_pile.extend(top);
            tracing::debug!(
                room = %self.code,
                cards = self.draw_pile.len(),
                "discard pile reshuffled"
            );
        } else {
            tracing::warn!(room = %self.code, "draw and discard piles exhausted");
            self.add_fresh_deck();
        }
    }

    fn add_fresh_deck(&mut self) {
        let fresh = deck::shuffled(self.next_card_id, &mut self.rng);
        self.next_card_id += deck::DECK_SIZE;
        let pile = mem::replace(&mut self.draw_pile, fresh);
        self.draw_pile.extend(pile);
    }

    // -----------------------------------------------------------------------
    // Seats
    // -----------------------------------------------------------------------

    fn seat_of(&self, player_id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == player_id)
    }

    /// The caller's seat, if and only if it is on turn.
    fn turn_seat(&self, player_id: PlayerId) -> Result<usize, GameError> {
        let seat = self
            .seat_of(player_id)
            .ok_or(GameError::PlayerNotFound(player_id))?;
        if seat != self.current {
            return Err(GameError::NotYourTurn);
        }
        Ok(seat)
    }

    fn seat_after(&self, seat: usize, steps: usize) -> usize {
        let seats = self.players.len() as isize;
        let offset = self.direction.step() * steps as isize;
        (seat as isize + offset).rem_euclid(seats) as usize
    }

    fn next_seat(&self) -> usize {
        self.seat_after(self.current, 1)
    }

    fn is_playable(&self, card: &Card) -> bool {
        card.is_wild()
            || Some(card.color) == self.current_color
            || Some(card.value) == self.current_value
    }
}

fn stack_accepts(kind: StackKind, value: CardValue) -> bool {
    matches!(
        (kind, value),
        (StackKind::Draw2, CardValue::Draw2) | (StackKind::Draw4, CardValue::WildDraw4)
    )
}
