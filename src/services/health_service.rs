use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether the document store answers, logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let persistence = state.persistence();
    let remote = persistence.has_remote();

    match persistence.health_check().await {
        Ok(()) => state.update_degraded(false),
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            state.update_degraded(true);
        }
    }

    if state.is_degraded() {
        HealthResponse::degraded(remote)
    } else {
        HealthResponse::ok(remote)
    }
}
