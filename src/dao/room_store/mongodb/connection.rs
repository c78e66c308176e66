//! Startup connection to MongoDB.

use std::time::Duration;

use mongodb::{Database, bson::doc};
use tokio::time::sleep;
use tracing::{debug, info};

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
};

const FIRST_DELAY: Duration = Duration::from_millis(250);
const MAX_DELAY: Duration = Duration::from_secs(5);

/// Doubling delay between startup pings, capped at [`MAX_DELAY`].
#[derive(Debug)]
struct Backoff {
    delay: Duration,
}

impl Backoff {
    fn new() -> Self {
        Self { delay: FIRST_DELAY }
    }

    fn next_delay(&mut self) -> Duration {
        let current = self.delay;
        self.delay = (self.delay * 2).min(MAX_DELAY);
        current
    }
}

/// Open the configured database once the server answers a ping.
pub async fn open_database(config: &MongoConfig) -> MongoResult<Database> {
    let client = mongodb::Client::with_options(config.options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(&config.database_name);

    let mut backoff = Backoff::new();
    let mut attempts = 0;
    loop {
        attempts += 1;
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => break,
            Err(source) if attempts >= config.connect_attempts => {
                return Err(MongoDaoError::InitialPing { attempts, source });
            }
            Err(err) => {
                let delay = backoff.next_delay();
                debug!(attempts, delay_ms = delay.as_millis() as u64, error = %err, "MongoDB not reachable yet");
                sleep(delay).await;
            }
        }
    }

    info!(database = %config.database_name, attempts, "connected to MongoDB");
    Ok(database)
}
