//! Store health reporting.

use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the room store and report whether rooms can currently be served.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.store().health_check().await {
        Ok(()) => HealthResponse::ok(),
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            HealthResponse::degraded()
        }
    }
}
