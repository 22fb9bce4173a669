//! Bounded per-platform metrics history with running statistics and
//! threshold anomaly detection.
//!
//! The aggregator is the single owner of the `platform -> history` mapping.
//! One long-lived instance per process is expected; it is shared behind an
//! `Arc` and serializes all history mutation through an internal mutex, so
//! concurrent `process_metrics` calls for the same platform can never
//! interleave the append+evict pair and violate the capacity bound. No await
//! point sits inside the critical section.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{info, warn};

use fapm_core::error::{Error, Result};
use fapm_core::metrics::{
    Anomaly, MetricsSample, RingBuffer, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT,
};
use fapm_core::validate::validate_metrics;

/// Running averages over a platform's retained window.
///
/// Computed over the full window (a bounded moving average, not exponential
/// decay). All averages are `0.0` when the window is empty.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlatformStats {
    pub avg_memory: f64,
    pub avg_cpu: f64,
    pub avg_fps: f64,
    pub avg_frame_time: f64,
    /// Number of samples currently in the window.
    pub sample_count: usize,
}

/// Mean of a slice, `0.0` for an empty slice.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

struct AggregatorState {
    histories: HashMap<String, RingBuffer<MetricsSample>>,
    history_limit: usize,
}

/// Owns per-platform bounded history, computes running statistics, and flags
/// threshold anomalies for the most recent sample.
pub struct MetricsAggregator {
    state: Mutex<AggregatorState>,
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsAggregator {
    /// Aggregator with the default per-platform history limit (100).
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AggregatorState {
                histories: HashMap::new(),
                history_limit: DEFAULT_HISTORY_LIMIT,
            }),
        }
    }

    /// Validate a sample, append it to its platform's history (evicting the
    /// oldest entry at capacity), and log any threshold anomalies.
    ///
    /// Validation failures propagate unchanged; anomalies are a logged side
    /// effect, not a return value.
    pub async fn process_metrics(&self, sample: MetricsSample) -> Result<()> {
        validate_metrics(&sample)?;

        let platform = sample.platform.clone();
        let timestamp = sample.timestamp;
        let anomalies = {
            let mut state = self.state.lock().expect("aggregator state poisoned");
            let limit = state.history_limit;
            let history = state
                .histories
                .entry(platform.clone())
                .or_insert_with(|| RingBuffer::new(limit));
            history.push(sample);
            // Anomalies are a function of the latest sample only, never the
            // whole window.
            history
                .latest()
                .map(|s| s.metrics.anomalies())
                .unwrap_or_default()
        };

        info!(platform = %platform, timestamp, "Processed metrics");
        if !anomalies.is_empty() {
            self.report_anomalies(&platform, &anomalies);
        }
        Ok(())
    }

    fn report_anomalies(&self, platform: &str, anomalies: &[Anomaly]) {
        let summary: Vec<String> = anomalies
            .iter()
            .map(|a| format!("{}={} (threshold {})", a.kind, a.value, a.threshold))
            .collect();
        warn!(
            platform = %platform,
            anomalies = %summary.join(", "),
            "Detected anomalies"
        );
    }

    /// Owned snapshot of a platform's retained samples, oldest first.
    /// Empty for platforms that never reported.
    pub fn history(&self, platform: &str) -> Vec<MetricsSample> {
        let state = self.state.lock().expect("aggregator state poisoned");
        state
            .histories
            .get(platform)
            .map(|h| h.to_vec())
            .unwrap_or_default()
    }

    /// Platform keys with at least one retained sample.
    pub fn platforms(&self) -> Vec<String> {
        let state = self.state.lock().expect("aggregator state poisoned");
        state.histories.keys().cloned().collect()
    }

    /// Running averages for a platform's current window.
    ///
    /// `None` only for platforms that never reported; a platform with an
    /// empty window after `set_history_limit` still yields zeroed stats.
    pub fn stats(&self, platform: &str) -> Option<PlatformStats> {
        let state = self.state.lock().expect("aggregator state poisoned");
        let history = state.histories.get(platform)?;
        let field = |f: fn(&MetricsSample) -> f64| -> Vec<f64> { history.iter().map(f).collect() };
        Some(PlatformStats {
            avg_memory: average(&field(|s| s.metrics.memory)),
            avg_cpu: average(&field(|s| s.metrics.cpu)),
            avg_fps: average(&field(|s| s.metrics.fps)),
            avg_frame_time: average(&field(|s| s.metrics.frame_time)),
            sample_count: history.len(),
        })
    }

    /// Administrative reset: wipe every platform's history.
    pub fn clear_history(&self) {
        let mut state = self.state.lock().expect("aggregator state poisoned");
        state.histories.clear();
        info!("Cleared all metrics history");
    }

    /// Current per-platform history limit.
    pub fn history_limit(&self) -> usize {
        self.state
            .lock()
            .expect("aggregator state poisoned")
            .history_limit
    }

    /// Change the per-platform history limit, truncating existing histories
    /// to their newest `limit` entries. Rejects limits outside 1..=1000.
    pub fn set_history_limit(&self, limit: usize) -> Result<()> {
        if limit < 1 || limit > MAX_HISTORY_LIMIT {
            return Err(Error::config(format!(
                "History limit must be between 1 and {MAX_HISTORY_LIMIT}"
            )));
        }
        let mut state = self.state.lock().expect("aggregator state poisoned");
        state.history_limit = limit;
        for history in state.histories.values_mut() {
            history.set_capacity(limit);
        }
        info!(limit, "History limit updated");
        Ok(())
    }
}
