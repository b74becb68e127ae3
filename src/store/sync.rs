use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};

use super::EntityStore;

/// Spawns the periodic resync pass. Returns `None` when `interval` is zero.
///
/// This is a heuristic for noticing writes from other processes sharing the
/// repository. It does not order or merge concurrent writes.
pub fn spawn_resync(store: Arc<EntityStore>, interval: Duration) -> Option<JoinHandle<()>> {
    if interval.is_zero() {
        tracing::info!("Store resync disabled");
        return None;
    }

    tracing::info!("Store resync every {:?}", interval);

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately and the store was just hydrated
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let changed = store.resync().await;
            if changed > 0 {
                tracing::debug!("Resync picked up {} collection(s)", changed);
            }
        }
    }))
}
