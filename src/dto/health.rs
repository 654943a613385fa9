use serde::Serialize;
use std::time::SystemTime;
use utoipa::ToSchema;

use crate::dto::format_system_time;

/// Health response returned by `GET /api/health`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Server time when the health check was answered.
    pub time: String,
}

impl HealthResponse {
    /// The storage backend is reachable.
    pub fn ok() -> Self {
        Self::with_status("ok")
    }

    /// The service runs without a working storage backend.
    pub fn degraded() -> Self {
        Self::with_status("degraded")
    }

    fn with_status(status: &str) -> Self {
        Self {
            status: status.to_string(),
            time: format_system_time(SystemTime::now()),
        }
    }
}
