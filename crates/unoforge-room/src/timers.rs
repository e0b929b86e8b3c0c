//! Per-player disconnect grace timers.
//!
//! A timer is a spawned task that sleeps for the grace period and then
//! reports a [`GraceExpired`] on a channel. Firing never touches a room
//! directly: the registry drains the channel and asks [`GraceTimers::claim`]
//! whether the report is still current.
//!
//! Every timer carries a generation number. Cancelling aborts the task and
//! forgets the generation, so a report that was already queued when the
//! player came back no longer matches and is ignored.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use unoforge_protocol::{PlayerId, RoomCode};

/// A grace period ran out for a disconnected player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraceExpired {
    pub player_id: PlayerId,
    pub room_code: RoomCode,
    generation: u64,
}

struct PendingTimer {
    generation: u64,
    room_code: RoomCode,
    task: JoinHandle<()>,
}

pub(crate) struct GraceTimers {
    grace: Duration,
    next_generation: u64,
    pending: HashMap<PlayerId, PendingTimer>,
    expired_tx: mpsc::UnboundedSender<GraceExpired>,
}

impl GraceTimers {
    pub(crate) fn new(grace: Duration, expired_tx: mpsc::UnboundedSender<GraceExpired>) -> Self {
        Self {
            grace,
            next_generation: 0,
            pending: HashMap::new(),
            expired_tx,
        }
    }

    /// Starts (or restarts) the timer for `player_id`.
    pub(crate) fn start(&mut self, player_id: PlayerId, room_code: RoomCode) {
        self.cancel(player_id);
        self.next_generation += 1;
        let generation = self.next_generation;

        let grace = self.grace;
        let tx = self.expired_tx.clone();
        let expired = GraceExpired {
            player_id,
            room_code: room_code.clone(),
            generation,
        };
        let task = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let _ = tx.send(expired);
        });

        self.pending.insert(
            player_id,
            PendingTimer {
                generation,
                room_code,
                task,
            },
        );
        tracing::debug!(%player_id, generation, "grace timer started");
    }

    /// Cancels the timer for `player_id`. Returns `true` if one was pending.
    pub(crate) fn cancel(&mut self, player_id: PlayerId) -> bool {
        match self.pending.remove(&player_id) {
            Some(timer) => {
                timer.task.abort();
                tracing::debug!(%player_id, generation = timer.generation, "grace timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Consumes a fired timer. Returns `false` for a report that was
    /// cancelled or superseded after it fired.
    pub(crate) fn claim(&mut self, expired: &GraceExpired) -> bool {
        match self.pending.get(&expired.player_id) {
            Some(timer) if timer.generation == expired.generation => {
                self.pending.remove(&expired.player_id);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn is_pending(&self, player_id: PlayerId) -> bool {
        self.pending.contains_key(&player_id)
    }

    /// Number of seats in `room_code` still inside their grace period.
    pub(crate) fn pending_in(&self, room_code: &RoomCode) -> usize {
        self.pending
            .values()
            .filter(|t| &t.room_code == room_code)
            .count()
    }
}

impl Drop for GraceTimers {
    fn drop(&mut self) {
        for timer in self.pending.values() {
            timer.task.abort();
        }
    }
}
