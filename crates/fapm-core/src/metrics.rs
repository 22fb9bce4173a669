//! # Metrics & Crash Domain Types
//!
//! Domain data types for performance samples, crash reports, threshold
//! anomalies, and a generic ring buffer for bounded per-platform history.
//!
//! These types are the shared vocabulary between:
//! - `fapm-engine` (aggregation, collection scheduling)
//! - `fapm-gateway` (HTTP boundary, outbound Telex messages)

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

// ── Thresholds ───────────────────────────────────────────────────────────────

/// Memory usage (percent) above which a sample is anomalous.
pub const MEMORY_THRESHOLD: f64 = 90.0;

/// CPU usage (percent) above which a sample is anomalous.
pub const CPU_THRESHOLD: f64 = 80.0;

/// Frame rate (frames/sec) below which a sample is anomalous.
pub const FPS_THRESHOLD: f64 = 30.0;

/// Frame time (milliseconds) above which a sample is anomalous.
///
/// 33.33ms per frame is the budget for 30 FPS, so this is the frame-time
/// expression of [`FPS_THRESHOLD`].
pub const FRAME_TIME_THRESHOLD_MS: f64 = 33.33;

/// Default number of samples retained per platform.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Upper bound accepted by `MetricsAggregator::set_history_limit`.
pub const MAX_HISTORY_LIMIT: usize = 1000;

// ── MetricsSample ────────────────────────────────────────────────────────────

/// One performance observation from a platform monitor.
///
/// Immutable once validated; owned by the aggregator's history store after
/// ingestion. Serializes with the camelCase field names used on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSample {
    /// Platform key the sample was collected from (e.g. "flutter").
    pub platform: String,
    /// Collection time in epoch milliseconds.
    pub timestamp: i64,
    /// The measured values.
    pub metrics: MetricValues,
}

/// The four measured values carried by every sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricValues {
    /// Memory usage as a percentage (0–100).
    pub memory: f64,
    /// CPU usage as a percentage (0–100).
    pub cpu: f64,
    /// Frames per second (≥ 0).
    pub fps: f64,
    /// Time to render a frame in milliseconds (≥ 0).
    pub frame_time: f64,
}

impl MetricsSample {
    /// Degenerate all-zero sample recorded when a platform crashes, so that
    /// crashes count toward aggregate anomaly tracking. The crash's own
    /// diagnostics are kept separately (see `ApmIntegration::recent_crashes`).
    pub fn crash_marker(platform: impl Into<String>, timestamp: i64) -> Self {
        Self {
            platform: platform.into(),
            timestamp,
            metrics: MetricValues {
                memory: 0.0,
                cpu: 0.0,
                fps: 0.0,
                frame_time: 0.0,
            },
        }
    }
}

impl MetricValues {
    /// Threshold anomalies present in this observation.
    ///
    /// A pure function of the values: compares each field against the fixed
    /// thresholds and returns one [`Anomaly`] per violated bound. Several
    /// anomalies can co-occur in one sample. Nothing is persisted or
    /// deduplicated across calls.
    pub fn anomalies(&self) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();
        if self.memory > MEMORY_THRESHOLD {
            anomalies.push(Anomaly::new(AnomalyKind::Memory, self.memory, MEMORY_THRESHOLD));
        }
        if self.cpu > CPU_THRESHOLD {
            anomalies.push(Anomaly::new(AnomalyKind::Cpu, self.cpu, CPU_THRESHOLD));
        }
        if self.fps < FPS_THRESHOLD {
            anomalies.push(Anomaly::new(AnomalyKind::Fps, self.fps, FPS_THRESHOLD));
        }
        if self.frame_time > FRAME_TIME_THRESHOLD_MS {
            anomalies.push(Anomaly::new(
                AnomalyKind::FrameTime,
                self.frame_time,
                FRAME_TIME_THRESHOLD_MS,
            ));
        }
        anomalies
    }
}

// ── Anomaly ──────────────────────────────────────────────────────────────────

/// Which metric violated its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnomalyKind {
    Memory,
    Cpu,
    Fps,
    FrameTime,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::Memory => "memory",
            AnomalyKind::Cpu => "cpu",
            AnomalyKind::Fps => "fps",
            AnomalyKind::FrameTime => "frameTime",
        }
    }
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single metric value exceeding its fixed threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub value: f64,
    pub threshold: f64,
}

impl Anomaly {
    pub fn new(kind: AnomalyKind, value: f64, threshold: f64) -> Self {
        Self {
            kind,
            value,
            threshold,
        }
    }
}

// ── CrashReport ──────────────────────────────────────────────────────────────

/// A crash observation from a platform monitor.
///
/// Not stored in the metrics history; the integration façade records an
/// all-zero [`MetricsSample`] for the crash and keeps the report itself for
/// the alerts channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashReport {
    /// Platform key the crash occurred on.
    pub platform: String,
    /// Crash time in epoch milliseconds.
    pub timestamp: i64,
    /// The main error message.
    pub error: String,
    /// Stack trace, when the platform could capture one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    /// Device the crash occurred on.
    pub device_info: DeviceInfo,
}

/// Device identification attached to a crash report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub os: String,
    pub version: String,
    pub device: String,
}

// ── RingBuffer<T> ────────────────────────────────────────────────────────────

/// A bounded FIFO buffer that evicts the oldest entries when full.
///
/// Backs each platform's metrics history. Unlike a fixed ring, the capacity
/// can be lowered at runtime (`set_capacity`), which drops the oldest entries
/// until the new bound holds.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    buf: VecDeque<T>,
    capacity: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a value, evicting the oldest if at capacity.
    pub fn push(&mut self, value: T) {
        if self.buf.len() == self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, dropping the oldest entries if the buffer is
    /// currently over the new bound.
    pub fn set_capacity(&mut self, capacity: usize) {
        while self.buf.len() > capacity {
            self.buf.pop_front();
        }
        self.capacity = capacity;
    }

    /// Iterate over items from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buf.iter()
    }

    /// The most recently pushed item.
    pub fn latest(&self) -> Option<&T> {
        self.buf.back()
    }

    /// The oldest retained item.
    pub fn oldest(&self) -> Option<&T> {
        self.buf.front()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Owned snapshot of the retained window, oldest first.
    pub fn to_vec(&self) -> Vec<T> {
        self.buf.iter().cloned().collect()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
