use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Whether a remote document store is configured.
    pub remote_storage: bool,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(remote_storage: bool) -> Self {
        Self {
            status: "ok".to_string(),
            remote_storage,
        }
    }

    /// Create a health response indicating the remote store is unreachable.
    pub fn degraded(remote_storage: bool) -> Self {
        Self {
            status: "degraded".to_string(),
            remote_storage,
        }
    }
}
