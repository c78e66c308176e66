//! Error types of the MongoDB room store.

use mongodb::error::Error as MongoError;
use thiserror::Error;

/// Result alias for MongoDB operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures talking to the MongoDB room collection.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// A required setting is not in the environment.
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the variable.
        var: &'static str,
    },
    /// The connection string could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// Rejected connection string.
        uri: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The client could not be built from the options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The server never answered a ping at startup.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Pings tried.
        attempts: u32,
        /// Last driver error.
        #[source]
        source: MongoError,
    },
    /// A health check ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A room could not be written.
    #[error("failed to save room `{id}`")]
    SaveRoom {
        /// Room id.
        id: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A room could not be read.
    #[error("failed to load room `{id}`")]
    LoadRoom {
        /// Room id.
        id: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A room could not be removed.
    #[error("failed to delete room `{id}`")]
    DeleteRoom {
        /// Room id.
        id: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
}
