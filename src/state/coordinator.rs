//! The single-writer authority of one room.
//!
//! Every operation on a room is a [`RoomCommand`] sent to its coordinator task. The task owns the
//! room, the score ledger, the open client channels and the round timers, and processes commands
//! one at a time, so no locking is needed around any of them.

use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    config::RoundTimings,
    dao::{models::RoomEntity, room_store::RoomStore, storage::StorageError},
    dto::{
        room::{RankingEntry, RoomView},
        ws::ServerMessage,
    },
    state::{
        connections::{Connection, ConnectionRegistry},
        ledger::ScoreLedger,
        room::{Departure, Room, RoomError, User},
        state_machine::RoundEvent,
        timers::{RoundTimers, TimerKind},
    },
};

type Reply<T> = oneshot::Sender<Result<T, RoomError>>;

/// Failure to get an answer from a coordinator.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The coordinator exited before answering. The command may be sent again to a fresh one.
    #[error("room coordinator stopped")]
    Stopped,
    /// The room refused the command.
    #[error(transparent)]
    Room(#[from] RoomError),
}

/// Commands understood by a room coordinator.
#[derive(Debug)]
pub enum RoomCommand {
    /// Store a new room. Fails if the room exists.
    Create {
        /// Room to create.
        room: Room,
        /// Answer with the created room.
        reply: Reply<RoomView>,
    },
    /// Admit a user.
    Join {
        /// Joining user.
        user: User,
        /// Passphrase presented.
        passphrase: String,
        /// Answer with the updated room.
        reply: Reply<RoomView>,
    },
    /// Start a round.
    Start {
        /// Caller; must be the creator.
        user_id: String,
        /// Acknowledgement.
        reply: Reply<()>,
    },
    /// A final result or a running click update. Both share the same path.
    SubmitScore {
        /// Reporting member.
        user_id: String,
        /// Reported taps.
        tap_count: u32,
        /// Acknowledgement.
        reply: Reply<()>,
    },
    /// Remove a member.
    Leave {
        /// Leaving user.
        user_id: String,
        /// Acknowledgement.
        reply: Reply<()>,
    },
    /// Attach an open client channel of a member.
    Connect {
        /// Channel owner; must be a member.
        user_id: String,
        /// Channel to register.
        connection: Connection,
        /// Acknowledgement.
        reply: Reply<()>,
    },
    /// Forget one client channel. Membership is unaffected.
    Disconnect {
        /// Channel owner.
        user_id: String,
        /// Channel to forget.
        connection_id: Uuid,
    },
    /// Read the current room.
    Snapshot {
        /// Answer with the room.
        reply: Reply<RoomView>,
    },
    /// Delivered by a round timer. `round` identifies the round that armed it.
    TimerFired {
        /// Timer that fired.
        kind: TimerKind,
        /// Round that armed the timer.
        round: u64,
    },
}

impl RoomCommand {
    /// Answer the command with `err` without executing it.
    fn reject(self, err: RoomError) {
        match self {
            RoomCommand::Create { reply, .. }
            | RoomCommand::Join { reply, .. }
            | RoomCommand::Snapshot { reply } => {
                let _ = reply.send(Err(err));
            }
            RoomCommand::Start { reply, .. }
            | RoomCommand::SubmitScore { reply, .. }
            | RoomCommand::Leave { reply, .. }
            | RoomCommand::Connect { reply, .. } => {
                let _ = reply.send(Err(err));
            }
            RoomCommand::Disconnect { .. } | RoomCommand::TimerFired { .. } => {}
        }
    }
}

/// Cloneable address of a running coordinator.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: Arc<str>,
    tx: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Id of the room this handle addresses.
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Whether the coordinator behind this handle has exited.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> RoomCommand,
    ) -> Result<T, CommandError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| CommandError::Stopped)?;
        let result = rx.await.map_err(|_| CommandError::Stopped)?;
        result.map_err(CommandError::Room)
    }

    /// Create the room.
    pub async fn create(&self, room: Room) -> Result<RoomView, CommandError> {
        self.request(|reply| RoomCommand::Create { room, reply })
            .await
    }

    /// Join the room.
    pub async fn join(&self, user: User, passphrase: String) -> Result<RoomView, CommandError> {
        self.request(|reply| RoomCommand::Join {
            user,
            passphrase,
            reply,
        })
        .await
    }

    /// Start a round as `user_id`.
    pub async fn start(&self, user_id: String) -> Result<(), CommandError> {
        self.request(|reply| RoomCommand::Start { user_id, reply })
            .await
    }

    /// Report a tap count for the running round.
    pub async fn submit_score(&self, user_id: String, tap_count: u32) -> Result<(), CommandError> {
        self.request(|reply| RoomCommand::SubmitScore {
            user_id,
            tap_count,
            reply,
        })
        .await
    }

    /// Leave the room.
    pub async fn leave(&self, user_id: String) -> Result<(), CommandError> {
        self.request(|reply| RoomCommand::Leave { user_id, reply })
            .await
    }

    /// Attach a client channel; the member receives `room_info` on it.
    pub async fn connect(
        &self,
        user_id: String,
        connection: Connection,
    ) -> Result<(), CommandError> {
        self.request(|reply| RoomCommand::Connect {
            user_id,
            connection,
            reply,
        })
        .await
    }

    /// Fire-and-forget: a closed coordinator has no channels left to forget.
    pub async fn disconnect(&self, user_id: String, connection_id: Uuid) {
        let _ = self
            .tx
            .send(RoomCommand::Disconnect {
                user_id,
                connection_id,
            })
            .await;
    }

    /// Current view of the room.
    pub async fn snapshot(&self) -> Result<RoomView, CommandError> {
        self.request(|reply| RoomCommand::Snapshot { reply }).await
    }
}

/// Start the coordinator task for `room_id`.
///
/// The task first rehydrates the room from `store`; commands queue up until that completes.
pub fn spawn_coordinator(
    room_id: String,
    store: Arc<dyn RoomStore>,
    timings: RoundTimings,
    command_buffer: usize,
) -> (RoomHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(command_buffer.max(1));
    let coordinator = RoomCoordinator {
        room_id: room_id.clone(),
        store,
        timings,
        room: None,
        ledger: ScoreLedger::default(),
        connections: ConnectionRegistry::default(),
        timers: RoundTimers::default(),
        round: 0,
        commands: tx.downgrade(),
    };
    let task = tokio::spawn(coordinator.run(rx));
    let handle = RoomHandle {
        room_id: Arc::from(room_id),
        tx,
    };
    (handle, task)
}

struct RoomCoordinator {
    room_id: String,
    store: Arc<dyn RoomStore>,
    timings: RoundTimings,
    room: Option<Room>,
    ledger: ScoreLedger,
    connections: ConnectionRegistry,
    timers: RoundTimers,
    /// Incremented on every start; timer callbacks carrying an older value are stale.
    round: u64,
    /// Weak so pending timers never keep a retired coordinator's queue open.
    commands: mpsc::WeakSender<RoomCommand>,
}

impl RoomCoordinator {
    async fn run(mut self, mut rx: mpsc::Receiver<RoomCommand>) {
        debug!(room_id = %self.room_id, "coordinator spawned");

        if let Err(err) = self.rehydrate().await {
            error!(room_id = %self.room_id, error = %err, "failed to rehydrate room");
            rx.close();
            while let Some(command) = rx.recv().await {
                command.reject(RoomError::Storage(StorageError::load_failed(
                    &self.room_id,
                    &err,
                )));
            }
            return;
        }

        while let Some(command) = rx.recv().await {
            self.handle(command).await;
            if self.room.is_none() {
                break;
            }
        }

        // Commands still queued are dropped unanswered; their senders observe `Stopped`.
        self.timers.cancel_all();
        info!(room_id = %self.room_id, "coordinator retired");
    }

    async fn rehydrate(&mut self) -> Result<(), StorageError> {
        let Some(entity) = self.store.get(&self.room_id).await? else {
            return Ok(());
        };
        let room = Room::from(entity);
        let playing = room.phase().round_in_progress();
        info!(
            room_id = %self.room_id,
            members = room.members().len(),
            phase = ?room.phase(),
            "room rehydrated"
        );
        self.room = Some(room);

        // The ledger did not survive; give clients the grace window to report again.
        if playing {
            self.round += 1;
            self.arm(TimerKind::ResultGrace, self.timings.grace);
        }
        Ok(())
    }

    async fn handle(&mut self, command: RoomCommand) {
        match command {
            RoomCommand::Create { room, reply } => {
                let _ = reply.send(self.create(room).await);
            }
            RoomCommand::Join {
                user,
                passphrase,
                reply,
            } => {
                let _ = reply.send(self.join(user, passphrase).await);
            }
            RoomCommand::Start { user_id, reply } => {
                let _ = reply.send(self.start(&user_id).await);
            }
            RoomCommand::SubmitScore {
                user_id,
                tap_count,
                reply,
            } => {
                let _ = reply.send(self.submit_score(&user_id, tap_count).await);
            }
            RoomCommand::Leave { user_id, reply } => {
                let _ = reply.send(self.leave(&user_id).await);
            }
            RoomCommand::Connect {
                user_id,
                connection,
                reply,
            } => {
                let _ = reply.send(self.connect(&user_id, connection));
            }
            RoomCommand::Disconnect {
                user_id,
                connection_id,
            } => {
                self.connections.deregister(&user_id, connection_id);
                debug!(room_id = %self.room_id, user_id = %user_id, "channel closed");
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.current().map(RoomView::from));
            }
            RoomCommand::TimerFired { kind, round } => self.timer_fired(kind, round).await,
        }
    }

    fn current(&self) -> Result<&Room, RoomError> {
        self.room.as_ref().ok_or(RoomError::NotFound)
    }

    async fn persist(&self, room: &Room) -> Result<(), StorageError> {
        self.store.put(RoomEntity::from(room)).await
    }

    async fn create(&mut self, room: Room) -> Result<RoomView, RoomError> {
        if self.room.is_some() {
            return Err(RoomError::AlreadyExists);
        }
        self.persist(&room).await?;
        info!(
            room_id = %self.room_id,
            creator_id = %room.creator_id(),
            max_users = room.max_users(),
            "room created"
        );
        let view = RoomView::from(&room);
        self.room = Some(room);
        Ok(view)
    }

    async fn join(&mut self, user: User, passphrase: String) -> Result<RoomView, RoomError> {
        let mut next = self.current()?.clone();
        let user_id = user.id.clone();
        let now_full = next.admit(user, &passphrase)?;
        self.persist(&next).await?;

        info!(room_id = %self.room_id, user_id = %user_id, "user joined");
        let view = RoomView::from(&next);
        self.room = Some(next);
        self.connections
            .broadcast(&ServerMessage::RoomUpdated { room: view.clone() });
        if now_full {
            self.connections
                .broadcast(&ServerMessage::RoomFull { room: view.clone() });
        }
        Ok(view)
    }

    async fn start(&mut self, user_id: &str) -> Result<(), RoomError> {
        let mut next = self.current()?.clone();
        if next.phase().round_in_progress() {
            return Err(RoomError::RoundInProgress);
        }
        if next.creator_id() != user_id {
            return Err(RoomError::NotCreator);
        }
        next.apply(RoundEvent::Start)?;
        self.persist(&next).await?;

        self.room = Some(next);
        self.ledger.clear();
        self.round += 1;
        info!(room_id = %self.room_id, round = self.round, "round started");

        self.connections.broadcast(&ServerMessage::GameStart {
            wait: self.timings.countdown.as_secs(),
            duration: self.timings.duration.as_secs(),
        });
        self.arm(TimerKind::RoundDuration, self.timings.duration);
        Ok(())
    }

    async fn submit_score(&mut self, user_id: &str, tap_count: u32) -> Result<(), RoomError> {
        let room = self.room.as_ref().ok_or(RoomError::NotFound)?;
        if !room.phase().round_in_progress() {
            return Err(RoomError::RoundNotActive);
        }
        let user = room.member(user_id).ok_or(RoomError::UnknownUser)?;
        self.ledger.upsert(user, tap_count);

        if self.ledger.covers(room.members()) {
            debug!(room_id = %self.room_id, "every member reported; ending round early");
            self.end_round().await;
        }
        Ok(())
    }

    async fn leave(&mut self, user_id: &str) -> Result<(), RoomError> {
        let mut next = self.current()?.clone();
        match next.remove_member(user_id) {
            Departure::Absent => Ok(()),
            Departure::Emptied => {
                self.store.delete(&self.room_id).await?;
                self.timers.cancel_all();
                self.connections.remove_user(user_id);
                self.room = None;
                info!(room_id = %self.room_id, user_id = %user_id, "last member left; room deleted");
                Ok(())
            }
            Departure::Left { new_creator } => {
                self.persist(&next).await?;
                if let Some(creator_id) = new_creator {
                    info!(room_id = %self.room_id, creator_id = %creator_id, "creator reassigned");
                }
                info!(room_id = %self.room_id, user_id = %user_id, "user left");

                let playing = next.phase().round_in_progress();
                let view = RoomView::from(&next);
                self.room = Some(next);
                self.connections.remove_user(user_id);
                self.connections
                    .broadcast(&ServerMessage::RoomUpdated { room: view });

                if playing && self.remaining_reported() {
                    self.end_round().await;
                }
                Ok(())
            }
        }
    }

    fn remaining_reported(&self) -> bool {
        self.room
            .as_ref()
            .is_some_and(|room| self.ledger.covers(room.members()))
    }

    fn connect(&mut self, user_id: &str, connection: Connection) -> Result<(), RoomError> {
        let room = self.current()?;
        if room.member(user_id).is_none() {
            return Err(RoomError::UnknownUser);
        }
        let view = RoomView::from(room);
        self.connections.register(user_id, connection);
        self.connections
            .send_to_user(user_id, &ServerMessage::RoomInfo { room: view });
        info!(room_id = %self.room_id, user_id = %user_id, "channel opened");
        Ok(())
    }

    async fn timer_fired(&mut self, kind: TimerKind, round: u64) {
        let playing = self
            .room
            .as_ref()
            .is_some_and(|room| room.phase().round_in_progress());
        if round != self.round || !playing {
            debug!(
                room_id = %self.room_id,
                timer = ?kind,
                round,
                current_round = self.round,
                "ignoring stale timer"
            );
            return;
        }

        match kind {
            TimerKind::RoundDuration => {
                self.timers.cancel(TimerKind::RoundDuration);
                self.arm(TimerKind::ResultGrace, self.timings.grace);
            }
            TimerKind::ResultGrace => self.end_round().await,
        }
    }

    /// Close the running round and publish its ranking. A no-op outside a round.
    async fn end_round(&mut self) {
        let Some(room) = self.room.as_ref() else {
            return;
        };
        if !room.phase().round_in_progress() {
            return;
        }

        self.timers.cancel_all();
        self.ledger.fill_absent(room.members());
        let rankings: Vec<RankingEntry> = self
            .ledger
            .rankings()
            .into_iter()
            .map(RankingEntry::from)
            .collect();

        let mut next = room.clone();
        if let Err(err) = next.apply(RoundEvent::Finish) {
            warn!(room_id = %self.room_id, error = %err, "round could not be finished");
            return;
        }
        // A round always terminates, storage or not.
        if let Err(err) = self.persist(&next).await {
            error!(room_id = %self.room_id, error = %err, "failed to persist finished round");
        }
        self.room = Some(next);

        info!(
            room_id = %self.room_id,
            round = self.round,
            ranked = rankings.len(),
            "round ended"
        );
        self.connections
            .broadcast(&ServerMessage::GameResult { rankings });
    }

    fn arm(&mut self, kind: TimerKind, delay: Duration) {
        let commands = self.commands.clone();
        let round = self.round;
        self.timers.schedule(kind, delay, async move {
            if let Some(tx) = commands.upgrade() {
                let _ = tx.send(RoomCommand::TimerFired { kind, round }).await;
            }
        });
    }
}
