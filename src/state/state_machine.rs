//! Room phases and the round transitions between them.

use thiserror::Error;

use crate::dao::models::PhaseEntity;

/// Phases a room moves through while hosting rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomPhase {
    /// No round has been played yet.
    #[default]
    Lobby,
    /// A round is running and scores are accepted.
    Playing,
    /// The last round is over and its ranking has been published.
    Finished,
}

impl RoomPhase {
    /// Whether a round is currently running. Lobby-only operations are gated on this.
    pub fn round_in_progress(self) -> bool {
        matches!(self, RoomPhase::Playing)
    }
}

/// Events that can be applied to a room phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    /// The creator starts a new round.
    Start,
    /// The round ended (timers expired or every member reported).
    Finish,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the room was in when the invalid event was received.
    pub from: RoomPhase,
    /// The event that cannot be applied from this phase.
    pub event: RoundEvent,
}

/// Compute the phase reached by applying `event` to `from`.
///
/// A finished room starts its next round directly; it never goes back to [`RoomPhase::Lobby`].
pub fn next_phase(from: RoomPhase, event: RoundEvent) -> Result<RoomPhase, InvalidTransition> {
    match (from, event) {
        (RoomPhase::Lobby | RoomPhase::Finished, RoundEvent::Start) => Ok(RoomPhase::Playing),
        (RoomPhase::Playing, RoundEvent::Finish) => Ok(RoomPhase::Finished),
        (from, event) => Err(InvalidTransition { from, event }),
    }
}

impl From<PhaseEntity> for RoomPhase {
    fn from(value: PhaseEntity) -> Self {
        match value {
            PhaseEntity::Lobby => RoomPhase::Lobby,
            PhaseEntity::Playing => RoomPhase::Playing,
            PhaseEntity::Finished => RoomPhase::Finished,
        }
    }
}

impl From<RoomPhase> for PhaseEntity {
    fn from(value: RoomPhase) -> Self {
        match value {
            RoomPhase::Lobby => PhaseEntity::Lobby,
            RoomPhase::Playing => PhaseEntity::Playing,
            RoomPhase::Finished => PhaseEntity::Finished,
        }
    }
}
