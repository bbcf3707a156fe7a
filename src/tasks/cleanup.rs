//! Background Cleanup Task
//!
//! Periodic sweep that removes expired entries and re-enforces the byte
//! budget. Each engine instance owns exactly one of these tasks, spawned
//! at construction and stopped by `close`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::store::LruState;

/// Spawns the engine's periodic cleanup task.
///
/// The task sleeps for `interval` between runs; each run executes the same
/// eviction routine as the engine's other triggers, under the same
/// exclusive lock. The engine stops the task by raising its closed flag
/// and aborting the returned handle; a run that finds the flag raised
/// exits without sweeping.
pub(crate) fn spawn_cleanup_task<V>(
    state: Arc<RwLock<LruState<V>>>,
    interval: Duration,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    tokio::spawn(async move {
        debug!("starting cleanup task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut state = state.write();
                if state.is_closed() {
                    break;
                }
                state.evict(Instant::now())
            };

            if removed > 0 {
                info!("cleanup sweep removed {} entries", removed);
            } else {
                debug!("cleanup sweep found nothing to remove");
            }
        }
    })
}
