//! Service errors and their HTTP mapping.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, state::room::RoomError};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A room operation was refused.
    #[error(transparent)]
    Room(RoomError),
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// The room coordinator kept exiting before it could answer.
    #[error("room coordinator unavailable")]
    CoordinatorUnavailable,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<RoomError> for ServiceError {
    fn from(err: RoomError) -> Self {
        match err {
            RoomError::Storage(source) => ServiceError::Unavailable(source),
            other => ServiceError::Room(other),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input or a refused state change.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Caller is known but not allowed to do this.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<RoomError> for AppError {
    fn from(err: RoomError) -> Self {
        let message = err.to_string();
        match err {
            RoomError::NotFound | RoomError::UnknownUser => AppError::NotFound(message),
            RoomError::AlreadyExists
            | RoomError::DuplicateUser
            | RoomError::RoomFull
            | RoomError::RoundInProgress
            | RoomError::RoundNotActive => AppError::BadRequest(message),
            RoomError::NotCreator | RoomError::BadPassphrase => AppError::Forbidden(message),
            RoomError::Storage(source) => AppError::ServiceUnavailable(source.to_string()),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Room(room) => room.into(),
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::CoordinatorUnavailable => {
                AppError::ServiceUnavailable("room coordinator unavailable".into())
            }
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn room_errors_map_to_statuses() {
        assert_eq!(status_of(RoomError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(RoomError::UnknownUser), StatusCode::NOT_FOUND);
        assert_eq!(status_of(RoomError::AlreadyExists), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(RoomError::DuplicateUser), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(RoomError::RoomFull), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(RoomError::RoundInProgress), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(RoomError::RoundNotActive), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(RoomError::NotCreator), StatusCode::FORBIDDEN);
        assert_eq!(status_of(RoomError::BadPassphrase), StatusCode::FORBIDDEN);
    }

    #[test]
    fn storage_failures_are_unavailable() {
        let storage = StorageError::unavailable("down".into(), std::io::Error::other("refused"));
        assert_eq!(
            status_of(ServiceError::from(RoomError::Storage(storage))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ServiceError::CoordinatorUnavailable),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn room_error_stays_tagged_through_service_layer() {
        let err = ServiceError::from(RoomError::RoomFull);
        assert!(matches!(err, ServiceError::Room(RoomError::RoomFull)));
    }
}
