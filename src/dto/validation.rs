//! Validation helpers for DTOs.

use validator::ValidationError;

const MAX_USER_ID_LEN: usize = 64;
const MAX_DISPLAY_NAME_LEN: usize = 20;
const MAX_ROOM_NAME_LEN: usize = 50;

/// Validates a client-chosen user id: 1 to 64 characters, no whitespace.
///
/// ```ignore
/// validate_user_id("alice-42") // Ok
/// validate_user_id("")         // Err - empty
/// validate_user_id("a b")      // Err - whitespace
/// ```
pub fn validate_user_id(id: &str) -> Result<(), ValidationError> {
    let len = id.chars().count();
    if len == 0 || len > MAX_USER_ID_LEN {
        let mut err = ValidationError::new("user_id_length");
        err.message = Some(
            format!("User ID must be 1 to {MAX_USER_ID_LEN} characters (got {len})").into(),
        );
        return Err(err);
    }

    if id.chars().any(char::is_whitespace) {
        let mut err = ValidationError::new("user_id_format");
        err.message = Some("User ID must not contain whitespace".into());
        return Err(err);
    }

    Ok(())
}

/// Validates a display name: 1 to 20 characters once surrounding whitespace is trimmed.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if len == 0 || len > MAX_DISPLAY_NAME_LEN {
        let mut err = ValidationError::new("display_name_length");
        err.message = Some(
            format!("Name must be 1 to {MAX_DISPLAY_NAME_LEN} characters (got {len})").into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Validates a room name: 1 to 50 characters once surrounding whitespace is trimmed.
pub fn validate_room_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if len == 0 || len > MAX_ROOM_NAME_LEN {
        let mut err = ValidationError::new("room_name_length");
        err.message = Some(
            format!("Room name must be 1 to {MAX_ROOM_NAME_LEN} characters (got {len})").into(),
        );
        return Err(err);
    }
    Ok(())
}
