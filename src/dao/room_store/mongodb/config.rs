//! MongoDB connection settings.

use mongodb::options::ClientOptions;

use super::error::{MongoDaoError, MongoResult};

const DEFAULT_DATABASE: &str = "tap_rally";
const DEFAULT_CONNECT_ATTEMPTS: u32 = 10;

/// Connection settings for the MongoDB room store.
#[derive(Clone)]
pub struct MongoConfig {
    /// Parsed client options.
    pub options: ClientOptions,
    /// Database holding the `rooms` collection.
    pub database_name: String,
    /// Pings tried before startup gives up on the server.
    pub connect_attempts: u32,
}

impl MongoConfig {
    /// Parse `uri` and target `database_name`, or the default database.
    pub async fn from_uri(uri: &str, database_name: Option<&str>) -> MongoResult<Self> {
        let mut options =
            ClientOptions::parse(uri)
                .await
                .map_err(|source| MongoDaoError::InvalidUri {
                    uri: uri.to_owned(),
                    source,
                })?;
        options
            .app_name
            .get_or_insert_with(|| env!("CARGO_PKG_NAME").to_owned());

        Ok(Self {
            options,
            database_name: database_name.unwrap_or(DEFAULT_DATABASE).to_owned(),
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
        })
    }

    /// Read `MONGO_URI` (required), `MONGO_DB` and `MONGO_CONNECT_ATTEMPTS`.
    pub async fn from_env() -> MongoResult<Self> {
        let uri = std::env::var("MONGO_URI")
            .map_err(|_| MongoDaoError::MissingEnvVar { var: "MONGO_URI" })?;
        let database = std::env::var("MONGO_DB").ok();
        let mut config = Self::from_uri(&uri, database.as_deref()).await?;
        if let Some(attempts) = std::env::var("MONGO_CONNECT_ATTEMPTS")
            .ok()
            .and_then(|raw| raw.parse::<u32>().ok())
        {
            config.connect_attempts = attempts.max(1);
        }
        Ok(config)
    }
}
