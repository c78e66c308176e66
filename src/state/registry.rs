//! Registry of room coordinators.

use std::{future::Future, sync::Arc};

use dashmap::{DashMap, mapref::entry::Entry};
use tracing::{debug, warn};

use crate::{
    config::RoundTimings,
    dao::room_store::RoomStore,
    dto::room::RoomView,
    error::ServiceError,
    state::{
        coordinator::{CommandError, RoomHandle, spawn_coordinator},
        room::RoomError,
    },
};

/// How many times a command is re-sent after hitting a coordinator that was retiring.
const MAX_DISPATCH_ATTEMPTS: usize = 3;

/// One coordinator per room id, spawned on first use and evicted when it retires.
#[derive(Clone)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<String, RoomHandle>>,
    store: Arc<dyn RoomStore>,
    timings: RoundTimings,
    command_buffer: usize,
}

impl RoomRegistry {
    /// Empty registry spawning coordinators with these settings.
    pub fn new(store: Arc<dyn RoomStore>, timings: RoundTimings, command_buffer: usize) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            store,
            timings,
            command_buffer,
        }
    }

    #[cfg(test)]
    pub(crate) fn live_count(&self) -> usize {
        self.rooms.len()
    }

    /// Handle of the coordinator for `room_id`, spawning one if none is running.
    pub fn handle(&self, room_id: &str) -> RoomHandle {
        if let Some(handle) = self.rooms.get(room_id) {
            if !handle.is_closed() {
                return handle.clone();
            }
        }

        match self.rooms.entry(room_id.to_owned()) {
            Entry::Occupied(entry) if !entry.get().is_closed() => entry.get().clone(),
            Entry::Occupied(mut entry) => {
                let handle = self.spawn(room_id);
                entry.insert(handle.clone());
                handle
            }
            Entry::Vacant(entry) => {
                let handle = self.spawn(room_id);
                entry.insert(handle.clone());
                handle
            }
        }
    }

    /// Handle of the running coordinator for `room_id`, without spawning one.
    pub fn live(&self, room_id: &str) -> Option<RoomHandle> {
        self.rooms
            .get(room_id)
            .map(|handle| handle.clone())
            .filter(|handle| !handle.is_closed())
    }

    fn spawn(&self, room_id: &str) -> RoomHandle {
        let (handle, task) = spawn_coordinator(
            room_id.to_owned(),
            Arc::clone(&self.store),
            self.timings,
            self.command_buffer,
        );

        let rooms = Arc::clone(&self.rooms);
        let room_id = room_id.to_owned();
        tokio::spawn(async move {
            if let Err(err) = task.await {
                warn!(room_id = %room_id, error = %err, "room coordinator panicked");
            }
            // A fresh coordinator may already own the slot.
            if rooms.remove_if(&room_id, |_, handle| handle.is_closed()).is_some() {
                debug!(room_id = %room_id, "evicted retired coordinator");
            }
        });

        handle
    }

    /// Run `op` against the coordinator of `room_id`, re-sending it to a fresh coordinator when
    /// the current one retired before answering.
    pub async fn dispatch<T, F, Fut>(&self, room_id: &str, op: F) -> Result<T, ServiceError>
    where
        F: Fn(RoomHandle) -> Fut,
        Fut: Future<Output = Result<T, CommandError>>,
    {
        for attempt in 1..=MAX_DISPATCH_ATTEMPTS {
            match op(self.handle(room_id)).await {
                Ok(value) => return Ok(value),
                Err(CommandError::Room(err)) => return Err(err.into()),
                Err(CommandError::Stopped) => {
                    debug!(room_id = %room_id, attempt, "coordinator stopped; retrying");
                    self.rooms.remove_if(room_id, |_, handle| handle.is_closed());
                }
            }
        }
        warn!(room_id = %room_id, "room coordinator kept stopping");
        Err(ServiceError::CoordinatorUnavailable)
    }

    /// Views of every room with a live coordinator.
    pub async fn list(&self) -> Vec<RoomView> {
        let handles: Vec<RoomHandle> = self
            .rooms
            .iter()
            .filter(|entry| !entry.value().is_closed())
            .map(|entry| entry.value().clone())
            .collect();

        let mut views = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.snapshot().await {
                Ok(view) => views.push(view),
                Err(CommandError::Stopped | CommandError::Room(RoomError::NotFound)) => {}
                Err(err) => {
                    warn!(room_id = %handle.room_id(), error = %err, "failed to snapshot room");
                }
            }
        }
        views.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        views
    }
}
