//! Health check payload.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response of the `/healthcheck` route.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// "ok" when the room store answered, "degraded" otherwise.
    pub status: String,
}

impl HealthResponse {
    /// Store answered.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    /// Store did not answer.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
        }
    }
}
