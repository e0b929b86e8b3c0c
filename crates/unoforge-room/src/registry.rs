//! Room registry: creates rooms, routes joins, and reaps abandoned seats.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use unoforge_engine::{GameConfig, GameEngine};
use unoforge_protocol::{ConnectionId, JoinOutcome, PlayerId, RoomCode};

use crate::room::{JoinRequest, spawn_room};
use crate::timers::{GraceExpired, GraceTimers};
use crate::{NotificationSender, RegistryConfig, RoomError, RoomHandle, generate_code};

/// Tracks every live room and which room each player id belongs to.
///
/// The registry is the only owner of room handles; callers that need to
/// talk to a room for a while should take a [`RoomHandle`] via
/// [`handle`](Self::handle) and release whatever lock guards the registry.
///
/// A room is discarded once it has no live display, no connected player and
/// no seat still inside its disconnect grace period.
pub struct RoomRegistry {
    config: RegistryConfig,
    game_config: GameConfig,

    rooms: HashMap<RoomCode, RoomHandle>,

    /// A player id belongs to at most one room.
    player_rooms: HashMap<PlayerId, RoomCode>,

    timers: GraceTimers,
    rng: StdRng,
}

impl RoomRegistry {
    /// Creates an empty registry.
    ///
    /// The returned receiver yields a [`GraceExpired`] whenever a grace
    /// timer runs out. The owner must feed each one back through
    /// [`expire`](Self::expire).
    pub fn new(
        config: RegistryConfig,
        game_config: GameConfig,
    ) -> (Self, mpsc::UnboundedReceiver<GraceExpired>) {
        let (expired_tx, expired_rx) = mpsc::unbounded_channel();
        let registry = Self {
            timers: GraceTimers::new(config.grace_period, expired_tx),
            config,
            game_config,
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
            rng: StdRng::from_os_rng(),
        };
        (registry, expired_rx)
    }

    /// Creates a room with a fresh code and starts its actor.
    ///
    /// `display`, if given, is subscribed as the room's public display.
    pub fn create_room(&mut self, display: Option<NotificationSender>) -> RoomCode {
        let code = loop {
            let candidate = generate_code(&mut self.rng, self.config.code_length);
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
        };

        let engine = GameEngine::new(code.clone(), self.game_config.clone());
        let handle = spawn_room(engine, display, self.config.mailbox_capacity);
        self.rooms.insert(code.clone(), handle);
        tracing::info!(room = %code, rooms = self.rooms.len(), "room created");
        code
    }

    /// Seats a player in a room, or reconnects them to their old seat.
    ///
    /// All seating rules live in the engine; the mapping is only recorded
    /// once the room accepted the join. A successful join cancels any grace
    /// timer running for the resulting player id.
    pub async fn join_room(
        &mut self,
        code: &RoomCode,
        name: &str,
        requested_id: Option<PlayerId>,
        connection: ConnectionId,
        sender: NotificationSender,
    ) -> Result<JoinOutcome, RoomError> {
        let handle = self
            .handle(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let request = JoinRequest {
            requested_id,
            fresh_id: self.fresh_player_id(),
            name: name.to_string(),
            connection,
            sender,
        };
        let outcome = handle.join(request).await?;

        if self.timers.cancel(outcome.player_id) {
            tracing::info!(
                room = %code,
                player_id = %outcome.player_id,
                "player back within grace period"
            );
        }
        self.player_rooms.insert(outcome.player_id, code.clone());
        Ok(outcome)
    }

    /// Marks a player disconnected and starts their grace timer.
    ///
    /// `connection` must be the connection the seat is currently bound to;
    /// a report from an older connection is ignored. Returns whether the
    /// seat was actually marked disconnected.
    pub async fn disconnect(
        &mut self,
        player_id: PlayerId,
        connection: ConnectionId,
    ) -> Result<bool, RoomError> {
        let (code, handle) = self.lookup(player_id)?;
        let applied = handle.disconnect(player_id, connection).await?;
        if applied {
            self.timers.start(player_id, code);
        }
        Ok(applied)
    }

    /// Removes a player right away, then sweeps their room.
    ///
    /// `connection` must be the one the seat is bound to; a connection whose
    /// seat was resumed elsewhere gets [`RoomError::Superseded`] and the seat
    /// stays.
    pub async fn leave(
        &mut self,
        player_id: PlayerId,
        connection: ConnectionId,
    ) -> Result<(), RoomError> {
        let (code, handle) = self.lookup(player_id)?;
        let result = handle.remove(player_id, Some(connection)).await;
        if matches!(result, Err(RoomError::Superseded)) {
            return result;
        }
        self.timers.cancel(player_id);
        self.player_rooms.remove(&player_id);
        self.sweep(&code).await;
        result
    }

    /// Handles a fired grace timer. Returns `false` if the report was stale
    /// (the player came back or dropped again since it was scheduled).
    pub async fn expire(&mut self, expired: GraceExpired) -> bool {
        if !self.timers.claim(&expired) {
            tracing::debug!(player_id = %expired.player_id, "stale grace timer ignored");
            return false;
        }

        let GraceExpired {
            player_id,
            room_code,
            ..
        } = expired;
        if self.player_rooms.get(&player_id) == Some(&room_code) {
            self.player_rooms.remove(&player_id);
            if let Some(handle) = self.rooms.get(&room_code) {
                match handle.remove(player_id, None).await {
                    Ok(()) => tracing::info!(
                        room = %room_code,
                        %player_id,
                        "grace period expired, player removed"
                    ),
                    Err(e) => tracing::warn!(
                        room = %room_code,
                        %player_id,
                        error = %e,
                        "failed to remove expired player"
                    ),
                }
            }
        }
        self.sweep(&room_code).await;
        true
    }

    /// Called when a room's display connection closes.
    pub async fn display_closed(&mut self, code: &RoomCode) -> bool {
        self.sweep(code).await
    }

    /// Discards the room if nobody can come back to it. Returns `true` if
    /// the room was discarded.
    pub async fn sweep(&mut self, code: &RoomCode) -> bool {
        let Some(handle) = self.rooms.get(code) else {
            return false;
        };

        let abandoned = match handle.info().await {
            Ok(info) => {
                info.live_displays == 0
                    && info.connected_players == 0
                    && self.timers.pending_in(code) == 0
            }
            // the actor is gone already
            Err(_) => true,
        };
        if !abandoned {
            return false;
        }

        if let Some(handle) = self.rooms.remove(code) {
            if let Err(e) = handle.shutdown().await {
                tracing::debug!(room = %code, error = %e, "room already stopped");
            }
        }
        self.player_rooms.retain(|_, room| room != code);
        tracing::info!(room = %code, rooms = self.rooms.len(), "room destroyed");
        true
    }

    /// Returns a handle to a live room.
    pub fn handle(&self, code: &RoomCode) -> Option<RoomHandle> {
        self.rooms.get(code).cloned()
    }

    /// Returns the code of the room a player belongs to, if any.
    pub fn room_for_player(&self, player_id: PlayerId) -> Option<RoomCode> {
        self.player_rooms.get(&player_id).cloned()
    }

    /// Whether `player_id` is disconnected and still inside the grace period.
    pub fn in_grace_period(&self, player_id: PlayerId) -> bool {
        self.timers.is_pending(player_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn lookup(&self, player_id: PlayerId) -> Result<(RoomCode, RoomHandle), RoomError> {
        let code = self
            .player_rooms
            .get(&player_id)
            .ok_or(RoomError::NotInRoom)?;
        let handle = self
            .rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        Ok((code.clone(), handle.clone()))
    }

    /// Player ids double as reconnection credentials, so they are random
    /// rather than sequential.
    fn fresh_player_id(&mut self) -> PlayerId {
        loop {
            let id = PlayerId(self.rng.random());
            if !self.player_rooms.contains_key(&id) {
                return id;
            }
        }
    }
}
