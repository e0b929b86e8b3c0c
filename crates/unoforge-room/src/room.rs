//! Room actor: an isolated Tokio task that owns a game engine.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. This is the "actor model": no shared mutable
//! state, just message passing. The actor applies one command at a time,
//! so the engine inside it only ever has a single writer.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc, oneshot};
use unoforge_engine::{GameEngine, GameError, Player};
use unoforge_protocol::{
    CardId, Color, ConnectionId, JoinOutcome, Notification, Phase, PlayerId, PublicSnapshot,
    Recipient, ResponseData, RoomCode,
};

use crate::RoomError;
use crate::notify::{self, Outbound};

/// Channel sender for delivering notifications to one subscriber.
pub type NotificationSender = mpsc::UnboundedSender<Notification>;

/// Who is issuing a game action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// The room's shared display. May start rounds and change settings.
    Display,
    /// A seated player, acting through the connection that joined.
    Player(PlayerId, ConnectionId),
}

/// The game commands a room accepts once a connection is attached to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    StartGame,
    NextRound,
    SetChallengeEnabled(bool),
    PlayCard(CardId),
    ChooseColor(Color),
    ChallengeWild(bool),
    DrawCard,
    SayUno,
}

impl GameAction {
    /// Plays and draws race on turn state, so they must pass the room's
    /// turn gate.
    fn needs_turn_gate(self) -> bool {
        matches!(self, Self::PlayCard(_) | Self::DrawCard)
    }
}

/// Arguments of a join, resolved inside the actor.
pub(crate) struct JoinRequest {
    pub(crate) requested_id: Option<PlayerId>,
    pub(crate) fresh_id: PlayerId,
    pub(crate) name: String,
    pub(crate) connection: ConnectionId,
    pub(crate) sender: NotificationSender,
}

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in most variants is a "reply channel": the caller
/// sends a command and waits for the response on that channel.
pub(crate) enum RoomCommand {
    Join {
        request: JoinRequest,
        reply: oneshot::Sender<Result<JoinOutcome, RoomError>>,
    },

    /// Marks a seat disconnected, but only if `connection` is still the one
    /// bound to it. Replies whether anything changed.
    Disconnect {
        player_id: PlayerId,
        connection: ConnectionId,
        reply: oneshot::Sender<Result<bool, RoomError>>,
    },

    /// Removes a seat. With a `connection`, only if it is still the one
    /// bound to the seat.
    Remove {
        player_id: PlayerId,
        connection: Option<ConnectionId>,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    Act {
        actor: Actor,
        action: GameAction,
        /// Held until the action has been applied.
        permit: Option<OwnedSemaphorePermit>,
        reply: oneshot::Sender<Result<ResponseData, RoomError>>,
    },

    Snapshot {
        reply: oneshot::Sender<PublicSnapshot>,
    },

    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },

    Shutdown,
}

/// Room metadata (not the game state itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub phase: Phase,
    /// Seats, connected or not.
    pub player_count: usize,
    pub connected_players: usize,
    /// Displays whose connection is still open.
    pub live_displays: usize,
}

/// Handle to a running room actor. Used to send commands to it.
///
/// This is cheap to clone: an `mpsc::Sender` plus the room's turn gate.
/// The registry holds one of these per room.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
    turn_gate: Arc<Semaphore>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub(crate) async fn join(&self, request: JoinRequest) -> Result<JoinOutcome, RoomError> {
        self.request(|reply| RoomCommand::Join { request, reply })
            .await?
    }

    pub(crate) async fn disconnect(
        &self,
        player_id: PlayerId,
        connection: ConnectionId,
    ) -> Result<bool, RoomError> {
        self.request(|reply| RoomCommand::Disconnect {
            player_id,
            connection,
            reply,
        })
        .await?
    }

    pub(crate) async fn remove(
        &self,
        player_id: PlayerId,
        connection: Option<ConnectionId>,
    ) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Remove {
            player_id,
            connection,
            reply,
        })
        .await?
    }

    /// Applies a game action and returns its typed result.
    ///
    /// A play or draw that arrives while another play or draw for this room
    /// is still being applied is rejected outright with
    /// [`GameError::ActionInProgress`] rather than queued.
    pub async fn act(&self, actor: Actor, action: GameAction) -> Result<ResponseData, RoomError> {
        let permit = if action.needs_turn_gate() {
            let permit = Arc::clone(&self.turn_gate)
                .try_acquire_owned()
                .map_err(|_| GameError::ActionInProgress)?;
            Some(permit)
        } else {
            None
        };
        self.request(|reply| RoomCommand::Act {
            actor,
            action,
            permit,
            reply,
        })
        .await?
    }

    /// The public view of the room.
    pub async fn snapshot(&self) -> Result<PublicSnapshot, RoomError> {
        self.request(|reply| RoomCommand::Snapshot { reply }).await
    }

    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        self.request(|reply| RoomCommand::GetInfo { reply }).await
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    code: RoomCode,
    engine: GameEngine,
    displays: Vec<NotificationSender>,
    /// Per-seat outbound channels, for seats that are currently connected.
    players: HashMap<PlayerId, NotificationSender>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(room = %self.code, "room actor started");
        self.dispatch(notify::state_changed(&self.engine));

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join { request, reply } => {
                    let _ = reply.send(self.handle_join(request));
                }
                RoomCommand::Disconnect {
                    player_id,
                    connection,
                    reply,
                } => {
                    let _ = reply.send(self.handle_disconnect(player_id, connection));
                }
                RoomCommand::Remove {
                    player_id,
                    connection,
                    reply,
                } => {
                    let _ = reply.send(self.handle_remove(player_id, connection));
                }
                RoomCommand::Act {
                    actor,
                    action,
                    permit,
                    reply,
                } => {
                    let result = self.handle_act(actor, action);
                    drop(permit);
                    let _ = reply.send(result);
                }
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(self.engine.public_snapshot());
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room = %self.code, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room = %self.code, "room actor stopped");
    }

    /// Seats a player, or resumes a seat.
    ///
    /// A requested id that already holds a seat resumes it. Otherwise a name
    /// matching a *disconnected* seat resumes that seat. Anything else is a
    /// fresh join, which the engine only allows in the lobby.
    fn handle_join(&mut self, request: JoinRequest) -> Result<JoinOutcome, RoomError> {
        let resumed = request
            .requested_id
            .filter(|id| self.engine.player(*id).is_some())
            .or_else(|| {
                self.engine
                    .find_player_by_name(&request.name)
                    .filter(|p| !p.is_connected())
                    .map(Player::id)
            });

        let (player_id, reconnected) = match resumed {
            Some(player_id) => {
                self.engine.reconnect_player(player_id, request.connection)?;
                (player_id, true)
            }
            None => {
                self.engine
                    .add_player(request.fresh_id, &request.name, request.connection)?;
                (request.fresh_id, false)
            }
        };
        self.players.insert(player_id, request.sender);

        let name = self
            .engine
            .player(player_id)
            .map(|p| p.name().to_string())
            .unwrap_or(request.name);
        let outcome = JoinOutcome {
            player_id,
            room_code: self.code.clone(),
            name,
            game_in_progress: self.engine.phase() != Phase::Lobby,
            reconnected,
        };
        tracing::info!(
            room = %self.code,
            %player_id,
            reconnected,
            players = self.engine.players().len(),
            "player joined"
        );
        self.dispatch(notify::joined(&self.engine, &outcome));
        Ok(outcome)
    }

    fn handle_disconnect(
        &mut self,
        player_id: PlayerId,
        connection: ConnectionId,
    ) -> Result<bool, RoomError> {
        let Some(player) = self.engine.player(player_id) else {
            return Err(GameError::PlayerNotFound(player_id).into());
        };
        if player.connection() != connection || !player.is_connected() {
            // the seat already moved to a newer connection
            return Ok(false);
        }
        self.engine.disconnect_player(player_id)?;
        self.players.remove(&player_id);
        self.dispatch(notify::state_changed(&self.engine));
        Ok(true)
    }

    fn handle_remove(
        &mut self,
        player_id: PlayerId,
        connection: Option<ConnectionId>,
    ) -> Result<(), RoomError> {
        if let Some(connection) = connection {
            self.check_bound(player_id, connection)?;
        }
        self.engine.remove_player(player_id)?;
        self.players.remove(&player_id);
        tracing::info!(
            room = %self.code,
            %player_id,
            players = self.engine.players().len(),
            "player left"
        );
        self.dispatch(notify::left(&self.engine, player_id));
        Ok(())
    }

    /// Rejects a command from a connection the seat has since moved away
    /// from. Unknown seats are left for the engine to report.
    fn check_bound(&self, player_id: PlayerId, connection: ConnectionId) -> Result<(), RoomError> {
        match self.engine.player(player_id) {
            Some(player) if player.connection() != connection => Err(RoomError::Superseded),
            _ => Ok(()),
        }
    }

    fn handle_act(&mut self, actor: Actor, action: GameAction) -> Result<ResponseData, RoomError> {
        match self.apply(actor, action) {
            Ok((data, out)) => {
                self.dispatch(out);
                Ok(data)
            }
            Err(e) => {
                tracing::debug!(room = %self.code, ?actor, ?action, reason = %e, "action rejected");
                Err(e)
            }
        }
    }

    fn apply(
        &mut self,
        actor: Actor,
        action: GameAction,
    ) -> Result<(ResponseData, Outbound), RoomError> {
        if let Actor::Player(id, connection) = actor {
            self.check_bound(id, connection)?;
        }

        let engine = &mut self.engine;
        let data = match (action, actor) {
            (GameAction::StartGame | GameAction::NextRound, _) => {
                let started = engine.start_round()?;
                let out = notify::round_started(engine, &started);
                return Ok((ResponseData::Started(started.public()), out));
            }
            (GameAction::SetChallengeEnabled(enabled), _) => {
                engine.set_challenge_enabled(enabled)?;
                ResponseData::SettingsUpdated {
                    challenge_enabled: enabled,
                }
            }
            (_, Actor::Display) => return Err(RoomError::NotSeated),
            (GameAction::PlayCard(card_id), Actor::Player(id, _)) => {
                ResponseData::Played(engine.play_card(id, card_id)?)
            }
            (GameAction::ChooseColor(color), Actor::Player(id, _)) => {
                ResponseData::ColorChosen(engine.choose_color(id, color)?)
            }
            (GameAction::ChallengeWild(do_challenge), Actor::Player(id, _)) => {
                ResponseData::Challenged(engine.challenge_wild(id, do_challenge)?)
            }
            (GameAction::DrawCard, Actor::Player(id, _)) => {
                ResponseData::Drew(engine.draw_card(id)?)
            }
            (GameAction::SayUno, Actor::Player(id, _)) => {
                ResponseData::UnoCalled(engine.say_uno(id)?)
            }
        };
        let out = notify::after_action(engine, &data);
        Ok((data, out))
    }

    /// Dispatches notifications to the correct recipients.
    fn dispatch(&mut self, out: Outbound) {
        self.displays.retain(|d| !d.is_closed());
        for (recipient, notification) in out {
            match recipient {
                Recipient::All => {
                    for display in &self.displays {
                        let _ = display.send(notification.clone());
                    }
                    for sender in self.players.values() {
                        let _ = sender.send(notification.clone());
                    }
                }
                Recipient::Display => {
                    for display in &self.displays {
                        let _ = display.send(notification.clone());
                    }
                }
                Recipient::Player(player_id) => self.send_to(player_id, notification),
            }
        }
    }

    /// Sends a notification to a single seat. Silently drops it if the seat
    /// has no live connection.
    fn send_to(&self, player_id: PlayerId, notification: Notification) {
        if let Some(sender) = self.players.get(&player_id) {
            let _ = sender.send(notification);
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            code: self.code.clone(),
            phase: self.engine.phase(),
            player_count: self.engine.players().len(),
            connected_players: self.engine.connected_count(),
            live_displays: self.displays.iter().filter(|d| !d.is_closed()).count(),
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
///
/// `mailbox_capacity` controls backpressure: if the channel fills up,
/// senders wait (bounded channel).
pub(crate) fn spawn_room(
    engine: GameEngine,
    display: Option<NotificationSender>,
    mailbox_capacity: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(mailbox_capacity);
    let code = engine.code().clone();

    let actor = RoomActor {
        code: code.clone(),
        engine,
        displays: display.into_iter().collect(),
        players: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        code,
        sender: tx,
        turn_gate: Arc::new(Semaphore::new(1)),
    }
}

#[cfg(test)]
mod tests {
    use unoforge_engine::GameConfig;

    use super::*;

    fn pid(n: u64) -> PlayerId {
        PlayerId(n)
    }

    fn room() -> (RoomHandle, mpsc::UnboundedReceiver<Notification>) {
        let (display_tx, display_rx) = mpsc::unbounded_channel();
        let engine = GameEngine::with_seed(RoomCode::new("ROOM"), GameConfig::default(), 11);
        (spawn_room(engine, Some(display_tx), 8), display_rx)
    }

    fn request(n: u64, name: &str) -> (JoinRequest, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let request = JoinRequest {
            requested_id: None,
            fresh_id: pid(n),
            name: name.to_string(),
            connection: ConnectionId::new(n),
            sender: tx,
        };
        (request, rx)
    }

    #[tokio::test]
    async fn test_display_receives_initial_state() {
        let (_handle, mut display) = room();
        let first = display.recv().await.unwrap();
        assert!(matches!(first, Notification::StateUpdate(_)));
    }

    #[tokio::test]
    async fn test_join_then_resume_by_name_after_disconnect() {
        let (handle, _display) = room();
        let (req, _rx) = request(1, "Ada");
        handle.join(req).await.unwrap();

        assert!(handle.disconnect(pid(1), ConnectionId::new(1)).await.unwrap());

        let (mut again, _rx2) = request(2, "ada");
        again.connection = ConnectionId::new(50);
        let outcome = handle.join(again).await.unwrap();
        assert_eq!(outcome.player_id, pid(1));
        assert!(outcome.reconnected);
        assert_eq!(outcome.name, "Ada");
    }

    #[tokio::test]
    async fn test_join_name_of_connected_player_rejected() {
        let (handle, _display) = room();
        let (req, _rx) = request(1, "Ada");
        handle.join(req).await.unwrap();

        let (dup, _rx2) = request(2, "ADA");
        let err = handle.join(dup).await.unwrap_err();
        assert!(matches!(err, RoomError::Game(GameError::NameTaken)));
    }

    #[tokio::test]
    async fn test_stale_connection_disconnect_is_ignored() {
        let (handle, _display) = room();
        let (req, _rx) = request(1, "Ada");
        handle.join(req).await.unwrap();

        assert!(!handle.disconnect(pid(1), ConnectionId::new(99)).await.unwrap());
        assert_eq!(handle.info().await.unwrap().connected_players, 1);
    }

    #[tokio::test]
    async fn test_resumed_seat_ignores_old_connection() {
        let (handle, _display) = room();
        let (req, _old_rx) = request(1, "Ada");
        handle.join(req).await.unwrap();

        // resumed by id while the first connection is still open
        let (mut resume, _new_rx) = request(7, "Ada");
        resume.requested_id = Some(pid(1));
        resume.connection = ConnectionId::new(2);
        assert!(handle.join(resume).await.unwrap().reconnected);

        let old = Actor::Player(pid(1), ConnectionId::new(1));
        let err = handle.act(old, GameAction::SayUno).await.unwrap_err();
        assert!(matches!(err, RoomError::Superseded));
        let err = handle
            .remove(pid(1), Some(ConnectionId::new(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, RoomError::Superseded));
        assert_eq!(handle.info().await.unwrap().player_count, 1);

        handle.remove(pid(1), Some(ConnectionId::new(2))).await.unwrap();
        assert_eq!(handle.info().await.unwrap().player_count, 0);
    }

    #[tokio::test]
    async fn test_display_cannot_play() {
        let (handle, _display) = room();
        let err = handle
            .act(Actor::Display, GameAction::DrawCard)
            .await
            .unwrap_err();
        assert!(matches!(err, RoomError::NotSeated));
    }

    #[tokio::test]
    async fn test_busy_turn_gate_rejects_play() {
        let (handle, _display) = room();
        let _held = Arc::clone(&handle.turn_gate).try_acquire_owned().unwrap();

        let err = handle
            .act(Actor::Player(pid(1), ConnectionId::new(1)), GameAction::DrawCard)
            .await
            .unwrap_err();
        assert!(matches!(err, RoomError::Game(GameError::ActionInProgress)));

        // non-turn actions don't need the gate
        let err = handle
            .act(Actor::Player(pid(1), ConnectionId::new(1)), GameAction::SayUno)
            .await
            .unwrap_err();
        assert!(matches!(err, RoomError::Game(GameError::PlayerNotFound(_))));
    }

    #[tokio::test]
    async fn test_turn_gate_released_after_action() {
        let (handle, _display) = room();
        let ada = Actor::Player(pid(1), ConnectionId::new(1));
        let _ = handle.act(ada, GameAction::DrawCard).await;
        assert_eq!(handle.turn_gate.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_makes_room_unavailable() {
        let (handle, _display) = room();
        handle.shutdown().await.unwrap();
        // give the actor a chance to exit
        tokio::task::yield_now().await;
        let err = handle.info().await.unwrap_err();
        assert!(matches!(err, RoomError::Unavailable(_)));
    }
}
