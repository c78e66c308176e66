//! Error types of the CouchDB room store.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Result alias for CouchDB operations.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures talking to the CouchDB room database.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// A required setting is not in the environment.
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the variable.
        var: &'static str,
    },
    /// The HTTP client could not be built.
    #[error("failed to build CouchDB HTTP client")]
    ClientBuilder {
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The database existence check could not be sent.
    #[error("failed to reach room database `{database}`")]
    DatabaseQuery {
        /// Database name.
        database: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The database creation request could not be sent.
    #[error("failed to create room database `{database}`")]
    DatabaseCreate {
        /// Database name.
        database: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The database answered with an unexpected status.
    #[error("room database `{database}` answered {status}")]
    DatabaseStatus {
        /// Database name.
        database: String,
        /// Status returned by CouchDB.
        status: StatusCode,
    },
    /// A document request could not be sent.
    #[error("request for `{path}` could not be sent")]
    RequestSend {
        /// Document id.
        path: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// A document request answered with an unexpected status.
    #[error("request for `{path}` answered {status}")]
    RequestStatus {
        /// Document id.
        path: String,
        /// Status returned by CouchDB.
        status: StatusCode,
    },
    /// Another writer replaced the document between our read and write.
    #[error("room document `{path}` changed concurrently")]
    RevisionConflict {
        /// Document id.
        path: String,
    },
    /// A document body did not match the room layout.
    #[error("room document `{path}` could not be decoded")]
    DecodeResponse {
        /// Document id.
        path: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
}

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}
