use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::state::SharedState;

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);

/// Poll the document store and keep the shared degraded flag in sync with it.
///
/// Healthy stores are polled every `poll_interval`; while the store is down
/// the check backs off exponentially up to [`MAX_DELAY`].
pub async fn run(state: SharedState, poll_interval: Duration) {
    let mut delay = INITIAL_DELAY;

    loop {
        match state.persistence().health_check().await {
            Ok(()) => {
                if state.is_degraded() {
                    info!("storage healthy again; leaving degraded mode");
                    state.update_degraded(false);
                }
                delay = INITIAL_DELAY;
                sleep(poll_interval).await;
            }
            Err(err) => {
                if !state.is_degraded() {
                    warn!(error = %err, "storage health check failed; entering degraded mode");
                    state.update_degraded(true);
                } else {
                    warn!(error = %err, retry_in = ?delay, "storage still unavailable");
                }
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{game_store::MemoryGameStore, persistence::Persistence},
        state::AppState,
    };

    #[tokio::test]
    async fn flips_degraded_flag_with_store_health() {
        let local = MemoryGameStore::new();
        let remote = MemoryGameStore::new();
        let persistence =
            Persistence::new(Arc::new(local)).with_remote(Arc::new(remote.clone()));
        let state = AppState::new(AppConfig::default(), persistence);
        let mut watcher = state.degraded_watcher();

        remote.fail_reads(true);
        let task = tokio::spawn(run(state.clone(), Duration::from_secs(30)));

        watcher.changed().await.unwrap();
        assert!(*watcher.borrow_and_update());

        remote.fail_reads(false);
        watcher.changed().await.unwrap();
        assert!(!*watcher.borrow_and_update());

        task.abort();
    }
}
