//! Periodic metrics collection scheduling.
//!
//! One spawned tokio task per platform key polls the injected monitor on a
//! fixed interval and feeds successful samples to the aggregator. A tick
//! failure (monitor or aggregator) is logged and absorbed; the loop always
//! survives to the next tick. Each task carries a `watch`-channel shutdown
//! signal, created before the spawn so the stop path never races task
//! startup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::aggregator::MetricsAggregator;
use crate::monitor::PlatformMonitor;

struct CollectionTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Schedules recurring polling of platform monitors.
///
/// At most one active task per platform key: starting collection for an
/// already-registered key cancels the previous task first.
pub struct MetricsCollector {
    aggregator: Arc<MetricsAggregator>,
    tasks: Mutex<HashMap<String, CollectionTask>>,
}

impl MetricsCollector {
    pub fn new(aggregator: Arc<MetricsAggregator>) -> Self {
        Self {
            aggregator,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Start polling `monitor` every `interval`, feeding results to the
    /// aggregator under `platform`. Replaces any existing task for the key.
    pub fn start_collection<M>(&self, platform: &str, monitor: M, interval: Duration)
    where
        M: PlatformMonitor + Send + Sync + 'static,
    {
        self.stop_collection(platform);

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let aggregator = self.aggregator.clone();
        let key = platform.to_string();

        let handle = tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            // The first interval tick fires immediately; skip it so the
            // first sample lands one full interval after start, matching
            // the scheduling contract.
            tick.tick().await;

            loop {
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = tick.tick() => {
                        match monitor.collect_metrics().await {
                            Ok(sample) => match aggregator.process_metrics(sample).await {
                                Ok(()) => debug!(platform = %key, "Collected metrics"),
                                Err(e) => {
                                    warn!(platform = %key, "Failed to collect metrics for {key}: {e}");
                                }
                            },
                            Err(e) => {
                                warn!(platform = %key, "Failed to collect metrics for {key}: {e}");
                            }
                        }
                    }
                }
            }
        });

        let mut tasks = self.tasks.lock().expect("collector tasks poisoned");
        tasks.insert(
            platform.to_string(),
            CollectionTask {
                shutdown: shutdown_tx,
                handle,
            },
        );
        info!(platform = %platform, interval_ms = interval.as_millis() as u64, "Started metrics collection");
    }

    /// Cancel the task for a platform key. Silent no-op if none is
    /// registered.
    pub fn stop_collection(&self, platform: &str) {
        let task = {
            let mut tasks = self.tasks.lock().expect("collector tasks poisoned");
            tasks.remove(platform)
        };
        if let Some(task) = task {
            // The watch send fails only if the task already exited; abort
            // covers that case too.
            let _ = task.shutdown.send(true);
            task.handle.abort();
            info!(platform = %platform, "Stopped metrics collection");
        }
    }

    /// Cancel every registered task.
    pub fn stop_all_collections(&self) {
        let keys: Vec<String> = {
            let tasks = self.tasks.lock().expect("collector tasks poisoned");
            tasks.keys().cloned().collect()
        };
        for key in keys {
            self.stop_collection(&key);
        }
    }

    /// Whether a task is currently registered for the key.
    pub fn is_collecting(&self, platform: &str) -> bool {
        self.tasks
            .lock()
            .expect("collector tasks poisoned")
            .contains_key(platform)
    }

    /// Number of registered collection tasks.
    pub fn active_count(&self) -> usize {
        self.tasks.lock().expect("collector tasks poisoned").len()
    }
}

impl Drop for MetricsCollector {
    fn drop(&mut self) {
        let tasks = self.tasks.get_mut().expect("collector tasks poisoned");
        for task in tasks.values() {
            task.handle.abort();
        }
    }
}
