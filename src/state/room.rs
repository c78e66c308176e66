//! The room aggregate and its rules.

use thiserror::Error;

use crate::{
    dao::{
        models::{RoomEntity, UserEntity},
        storage::StorageError,
    },
    state::state_machine::{InvalidTransition, RoomPhase, RoundEvent, next_phase},
};

/// Failures of room operations. Every kind except [`RoomError::Storage`] is a local,
/// non-retryable validation failure.
#[derive(Debug, Error)]
pub enum RoomError {
    /// No room with this id.
    #[error("room not found")]
    NotFound,
    /// A room with this id already exists.
    #[error("room already exists")]
    AlreadyExists,
    /// The user is already a member.
    #[error("user already in room")]
    DuplicateUser,
    /// The room has no free place.
    #[error("room is full")]
    RoomFull,
    /// A round is running.
    #[error("round already in progress")]
    RoundInProgress,
    /// No round is running.
    #[error("no round is active")]
    RoundNotActive,
    /// Only the creator may do this.
    #[error("only the room creator can start a round")]
    NotCreator,
    /// The passphrase does not match.
    #[error("passphrase does not match")]
    BadPassphrase,
    /// The user is not a member.
    #[error("user is not a member of this room")]
    UnknownUser,
    /// The room store failed.
    #[error("room could not be persisted: {0}")]
    Storage(#[from] StorageError),
}

impl From<InvalidTransition> for RoomError {
    fn from(err: InvalidTransition) -> Self {
        match err.event {
            RoundEvent::Start => RoomError::RoundInProgress,
            RoundEvent::Finish => RoomError::RoundNotActive,
        }
    }
}

/// A room member. Names are display-only and need not be unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// User id.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Result of removing a member from a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Departure {
    /// The user was not a member; nothing changed.
    Absent,
    /// The user left and others remain. Carries the new creator when ownership moved.
    Left {
        /// Member promoted to creator when the creator left.
        new_creator: Option<String>,
    },
    /// The last member left; the room must be deleted.
    Emptied,
}

/// The room aggregate. Only its coordinator mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    id: String,
    /// Display name of the room.
    pub name: String,
    creator_id: String,
    max_users: usize,
    members: Vec<User>,
    passphrase: String,
    phase: RoomPhase,
}

impl Room {
    /// Open a room in the lobby with `creator` as its only member and owner.
    pub fn new(
        id: String,
        name: String,
        max_users: usize,
        creator: User,
        passphrase: String,
    ) -> Self {
        Self {
            id,
            name,
            creator_id: creator.id.clone(),
            max_users,
            members: vec![creator],
            passphrase,
            phase: RoomPhase::Lobby,
        }
    }

    /// Room id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current creator.
    pub fn creator_id(&self) -> &str {
        &self.creator_id
    }

    /// Capacity including the creator.
    pub fn max_users(&self) -> usize {
        self.max_users
    }

    /// Members in join order.
    pub fn members(&self) -> &[User] {
        &self.members
    }

    /// Current phase.
    pub fn phase(&self) -> RoomPhase {
        self.phase
    }

    /// Member with `user_id`, if any.
    pub fn member(&self, user_id: &str) -> Option<&User> {
        self.members.iter().find(|user| user.id == user_id)
    }

    /// Whether no place is left.
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_users
    }

    /// Admit `user` to the room. Returns `true` when the room became full with this join.
    pub fn admit(&mut self, user: User, passphrase: &str) -> Result<bool, RoomError> {
        if self.phase.round_in_progress() {
            return Err(RoomError::RoundInProgress);
        }
        if self.member(&user.id).is_some() {
            return Err(RoomError::DuplicateUser);
        }
        if self.is_full() {
            return Err(RoomError::RoomFull);
        }
        if self.passphrase != passphrase {
            return Err(RoomError::BadPassphrase);
        }

        self.members.push(user);
        Ok(self.members.len() == self.max_users)
    }

    /// Remove `user_id`, handing ownership to the earliest-joined remaining member when the
    /// creator leaves.
    pub fn remove_member(&mut self, user_id: &str) -> Departure {
        let Some(position) = self.members.iter().position(|user| user.id == user_id) else {
            return Departure::Absent;
        };
        self.members.remove(position);

        let Some(first) = self.members.first() else {
            return Departure::Emptied;
        };

        if self.creator_id == user_id {
            self.creator_id = first.id.clone();
            Departure::Left {
                new_creator: Some(self.creator_id.clone()),
            }
        } else {
            Departure::Left { new_creator: None }
        }
    }

    /// Move to the phase reached by `event`.
    pub fn apply(&mut self, event: RoundEvent) -> Result<RoomPhase, InvalidTransition> {
        self.phase = next_phase(self.phase, event)?;
        Ok(self.phase)
    }
}

impl From<User> for UserEntity {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

impl From<UserEntity> for User {
    fn from(value: UserEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

impl From<&Room> for RoomEntity {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            name: room.name.clone(),
            creator_id: room.creator_id.clone(),
            max_users: room.max_users,
            members: room.members.iter().cloned().map(Into::into).collect(),
            passphrase: room.passphrase.clone(),
            phase: room.phase.into(),
        }
    }
}

impl From<RoomEntity> for Room {
    fn from(value: RoomEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            creator_id: value.creator_id,
            max_users: value.max_users,
            members: value.members.into_iter().map(Into::into).collect(),
            passphrase: value.passphrase,
            phase: value.phase.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    fn user(id: &str) -> User {
        User {
            id: id.into(),
            name: format!("name-{id}"),
        }
    }

    fn room(max_users: usize) -> Room {
        Room::new(
            "r1".into(),
            "friday".into(),
            max_users,
            user("a"),
            "pass".into(),
        )
    }

    #[test]
    fn creator_is_first_member() {
        let room = room(4);
        assert_eq!(room.creator_id(), "a");
        assert_eq!(room.members(), &[user("a")]);
        assert_eq!(room.phase(), RoomPhase::Lobby);
    }

    #[test]
    fn third_join_on_two_seat_room_is_full() {
        let mut room = room(2);
        assert!(room.admit(user("b"), "pass").unwrap());
        assert_eq!(room.members().len(), 2);
        assert!(matches!(
            room.admit(user("c"), "pass"),
            Err(RoomError::RoomFull)
        ));
    }

    #[test]
    fn join_checks() {
        let mut room = room(4);
        assert!(matches!(
            room.admit(user("a"), "pass"),
            Err(RoomError::DuplicateUser)
        ));
        assert!(matches!(
            room.admit(user("b"), "wrong"),
            Err(RoomError::BadPassphrase)
        ));
        assert!(!room.admit(user("b"), "pass").unwrap());

        room.apply(RoundEvent::Start).unwrap();
        assert!(matches!(
            room.admit(user("c"), "pass"),
            Err(RoomError::RoundInProgress)
        ));

        room.apply(RoundEvent::Finish).unwrap();
        assert!(!room.admit(user("c"), "pass").unwrap());
    }

    #[test]
    fn creator_leaving_hands_over_to_earliest_member() {
        let mut room = room(4);
        room.admit(user("b"), "pass").unwrap();
        room.admit(user("c"), "pass").unwrap();

        assert_eq!(
            room.remove_member("a"),
            Departure::Left {
                new_creator: Some("b".into())
            }
        );
        assert_eq!(room.creator_id(), "b");
        assert_eq!(room.members(), &[user("b"), user("c")]);
    }

    #[test]
    fn non_creator_leaving_keeps_owner() {
        let mut room = room(4);
        room.admit(user("b"), "pass").unwrap();
        assert_eq!(
            room.remove_member("b"),
            Departure::Left { new_creator: None }
        );
        assert_eq!(room.creator_id(), "a");
    }

    #[test]
    fn leaving_twice_is_a_no_op() {
        let mut room = room(4);
        room.admit(user("b"), "pass").unwrap();
        room.remove_member("b");
        let before = room.clone();
        assert_eq!(room.remove_member("b"), Departure::Absent);
        assert_eq!(room.remove_member("b"), Departure::Absent);
        assert_eq!(room, before);
    }

    #[test]
    fn last_member_leaving_empties_room() {
        let mut room = room(4);
        assert_eq!(room.remove_member("a"), Departure::Emptied);
        assert!(room.members().is_empty());
    }

    #[test]
    fn entity_round_trip_keeps_order_and_phase() {
        let mut room = room(3);
        room.admit(user("b"), "pass").unwrap();
        room.apply(RoundEvent::Start).unwrap();

        let restored = Room::from(RoomEntity::from(&room));
        assert_eq!(restored, room);
    }

    proptest! {
        #[test]
        fn joins_never_exceed_capacity_or_duplicate(
            max_users in 2usize..=10,
            ids in prop::collection::vec("[a-f]", 0..30),
        ) {
            let mut room = room(max_users);
            for id in ids {
                let _ = room.admit(user(&id), "pass");
                prop_assert!(room.members().len() <= max_users);
            }
            let unique: HashSet<_> = room.members().iter().map(|u| u.id.clone()).collect();
            prop_assert_eq!(unique.len(), room.members().len());
        }
    }
}
