//! Runtime state: room coordinators and their registry.

pub mod connections;
pub mod coordinator;
pub mod ledger;
pub mod registry;
pub mod room;
pub mod state_machine;
pub mod timers;

use std::sync::Arc;

use crate::{config::AppConfig, dao::room_store::RoomStore};

pub use self::coordinator::{CommandError, RoomHandle};
pub use self::registry::RoomRegistry;

/// State handle shared by every route.
pub type SharedState = Arc<AppState>;

/// Central application state: the room store and the live room coordinators.
pub struct AppState {
    store: Arc<dyn RoomStore>,
    rooms: RoomRegistry,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, store: Arc<dyn RoomStore>) -> SharedState {
        let rooms = RoomRegistry::new(
            Arc::clone(&store),
            config.round(),
            config.command_buffer(),
        );
        Arc::new(Self { store, rooms })
    }

    /// Room store backend.
    pub fn store(&self) -> Arc<dyn RoomStore> {
        Arc::clone(&self.store)
    }

    /// Registry of room coordinators keyed by room id.
    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }
}
