//! Per-connection handler: command routing and notification forwarding.
//!
//! Each accepted connection gets its own Tokio task running this handler,
//! plus a writer task that forwards the room's notifications. The flow is:
//!   1. Start the writer task on a fresh notification channel
//!   2. Loop: receive envelopes → answer heartbeats, execute commands
//!   3. On close: stop the writer, then report the disconnect
//!
//! A connection starts unattached. `create_room` makes it a room's display;
//! `join_room` binds it to a seat. Every later command is attributed to that
//! display or seat, never to anything the client claims. Once the seat is
//! resumed from another connection, this one is turned away and detached.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use unoforge_engine::GameError;
use unoforge_protocol::{
    ClientCommand, Codec, ConnectionId, Envelope, Notification, Payload, PlayerId, Response,
    ResponseData, RoomCode,
};
use unoforge_room::{Actor, GameAction, NotificationSender, RoomError};
use unoforge_transport::{Connection, WebSocketConnection};

use crate::UnoforgeError;
use crate::server::ServerState;

/// A connection with no traffic for this long is dropped. Clients keep
/// idle connections alive with heartbeats.
const RECV_TIMEOUT: Duration = Duration::from_secs(15);

/// What a connection is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Role {
    Unattached,
    Display(RoomCode),
    Seat {
        player_id: PlayerId,
        room_code: RoomCode,
    },
}

/// Drop guard that reports the connection's departure to the registry.
///
/// A seat is marked disconnected (starting its grace period); a display
/// lets the registry sweep the room. Since `Drop` is synchronous, we spawn
/// a fire-and-forget task for the async lock.
struct ConnectionGuard<C: Codec> {
    connection: ConnectionId,
    role: Role,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        let role = std::mem::replace(&mut self.role, Role::Unattached);
        if role == Role::Unattached {
            return;
        }
        let connection = self.connection;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut registry = state.registry.lock().await;
            match role {
                Role::Seat { player_id, .. } => {
                    if let Err(e) = registry.disconnect(player_id, connection).await {
                        tracing::debug!(%player_id, error = %e, "disconnect not applied");
                    }
                }
                Role::Display(room_code) => {
                    registry.display_closed(&room_code).await;
                }
                Role::Unattached => {}
            }
        });
    }
}

/// Everything needed to put an envelope on this connection. Shared by the
/// reader loop and the notification writer, so both draw from one `seq`.
struct Outbox<C: Codec> {
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
    seq: AtomicU64,
    start: Instant,
}

impl<C: Codec> Outbox<C> {
    async fn send(&self, payload: Payload) -> Result<(), UnoforgeError> {
        let envelope = Envelope {
            seq: next_seq(&self.seq),
            timestamp: self.start.elapsed().as_millis() as u64,
            payload,
        };
        let bytes = self.state.codec.encode(&envelope)?;
        self.conn.send(&bytes).await?;
        Ok(())
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), UnoforgeError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let outbox = Arc::new(Outbox {
        conn,
        state: Arc::clone(&state),
        seq: AtomicU64::new(1),
        start: Instant::now(),
    });

    let (notify_tx, notify_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(forward_notifications(Arc::clone(&outbox), notify_rx));

    let mut guard = ConnectionGuard {
        connection: conn_id,
        role: Role::Unattached,
        state,
    };
    let result = serve(&outbox, &mut guard.role, notify_tx).await;

    // The writer owns the notification receiver. Once it is gone the room
    // sees this subscriber as closed.
    writer.abort();
    let _ = writer.await;
    drop(guard);
    result
}

/// The reader loop.
async fn serve<C: Codec>(
    outbox: &Outbox<C>,
    role: &mut Role,
    notify_tx: NotificationSender,
) -> Result<(), UnoforgeError> {
    let conn_id = outbox.conn.id();

    loop {
        let data = match tokio::time::timeout(RECV_TIMEOUT, outbox.conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%conn_id, "connection timed out");
                break;
            }
        };

        let envelope: Envelope = match outbox.state.codec.decode(&data) {
            Ok(env) => env,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode envelope");
                send_error(outbox, 400, &format!("invalid envelope: {e}")).await?;
                continue;
            }
        };

        match envelope.payload {
            Payload::Heartbeat { client_time } => {
                outbox
                    .send(Payload::HeartbeatAck {
                        client_time,
                        server_time: outbox.start.elapsed().as_millis() as u64,
                    })
                    .await?;
            }
            Payload::Command(command) => {
                let name = command.name();
                let response = match execute(outbox, role, conn_id, &notify_tx, command).await {
                    Ok(data) => Response::success(envelope.seq, data),
                    Err(e) => {
                        tracing::debug!(%conn_id, command = name, reason = %e, "command rejected");
                        Response::failure(envelope.seq, e.to_string())
                    }
                };
                outbox.send(Payload::Response(response)).await?;
            }
            _ => {
                send_error(outbox, 400, "clients may only send commands and heartbeats").await?;
            }
        }
    }

    Ok(())
}

/// Runs one command on behalf of this connection.
async fn execute<C: Codec>(
    outbox: &Outbox<C>,
    role: &mut Role,
    conn_id: ConnectionId,
    notify_tx: &NotificationSender,
    command: ClientCommand,
) -> Result<ResponseData, RoomError> {
    let state = &outbox.state;

    match command {
        ClientCommand::CreateRoom => {
            if *role != Role::Unattached {
                return Err(GameError::AlreadyJoined.into());
            }
            let room_code = state
                .registry
                .lock()
                .await
                .create_room(Some(notify_tx.clone()));
            *role = Role::Display(room_code.clone());
            Ok(ResponseData::RoomCreated { room_code })
        }

        ClientCommand::JoinRoom {
            room_code,
            name,
            player_id,
        } => {
            if *role != Role::Unattached {
                return Err(GameError::AlreadyJoined.into());
            }
            let outcome = state
                .registry
                .lock()
                .await
                .join_room(&room_code, &name, player_id, conn_id, notify_tx.clone())
                .await?;
            *role = Role::Seat {
                player_id: outcome.player_id,
                room_code: outcome.room_code.clone(),
            };
            Ok(ResponseData::Joined(outcome))
        }

        ClientCommand::LeaveRoom => match role {
            Role::Seat { player_id, .. } => {
                let player_id = *player_id;
                *role = Role::Unattached;
                state.registry.lock().await.leave(player_id, conn_id).await?;
                Ok(ResponseData::Left)
            }
            Role::Display(_) => Err(RoomError::NotSeated),
            Role::Unattached => Err(RoomError::NotInRoom),
        },

        other => {
            let action = game_action(other).ok_or(RoomError::NotInRoom)?;
            let (actor, room_code) = match role {
                Role::Seat {
                    player_id,
                    room_code,
                } => (Actor::Player(*player_id, conn_id), room_code),
                Role::Display(room_code) => (Actor::Display, room_code),
                Role::Unattached => return Err(RoomError::NotInRoom),
            };

            // Lock only for the lookup; the room applies the action on its own.
            let handle = state
                .registry
                .lock()
                .await
                .handle(room_code)
                .ok_or_else(|| RoomError::NotFound(room_code.clone()))?;
            let result = handle.act(actor, action).await;
            if matches!(result, Err(RoomError::Superseded)) {
                // the seat now lives on another connection
                *role = Role::Unattached;
            }
            result
        }
    }
}

fn game_action(command: ClientCommand) -> Option<GameAction> {
    let action = match command {
        ClientCommand::StartGame => GameAction::StartGame,
        ClientCommand::NextRound => GameAction::NextRound,
        ClientCommand::SetChallengeEnabled { enabled } => GameAction::SetChallengeEnabled(enabled),
        ClientCommand::PlayCard { card_id } => GameAction::PlayCard(card_id),
        ClientCommand::ChooseColor { color } => GameAction::ChooseColor(color),
        ClientCommand::ChallengeWild { do_challenge } => GameAction::ChallengeWild(do_challenge),
        ClientCommand::DrawCard => GameAction::DrawCard,
        ClientCommand::SayUno => GameAction::SayUno,
        ClientCommand::CreateRoom | ClientCommand::JoinRoom { .. } | ClientCommand::LeaveRoom => {
            return None;
        }
    };
    Some(action)
}

/// Forwards room notifications to the client until either side goes away.
async fn forward_notifications<C: Codec>(
    outbox: Arc<Outbox<C>>,
    mut notifications: mpsc::UnboundedReceiver<Notification>,
) {
    while let Some(notification) = notifications.recv().await {
        if let Err(e) = outbox.send(Payload::Notification(notification)).await {
            tracing::debug!(error = %e, "notification not delivered");
            break;
        }
    }
}

/// Sends a `Payload::Error` envelope to the client.
async fn send_error<C: Codec>(
    outbox: &Outbox<C>,
    code: u16,
    message: &str,
) -> Result<(), UnoforgeError> {
    outbox
        .send(Payload::Error {
            code,
            message: message.to_string(),
        })
        .await
}

/// Increments and returns the next sequence number.
fn next_seq(seq: &AtomicU64) -> u64 {
    seq.fetch_add(1, Ordering::Relaxed)
}
