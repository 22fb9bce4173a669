//! Platform monitor capability and the mock Flutter implementation.
//!
//! A [`PlatformMonitor`] is the injected capability the collector polls:
//! `collect_metrics` produces one sample (and may fail), `handle_crash`
//! turns a panic message into a structured crash report.
//!
//! [`FlutterMonitor`] is the mock implementation: there is no real device
//! instrumentation, so it generates plausible values in the same ranges the
//! Flutter tooling reports (fps hovering just under 60, frame time just over
//! the 16.67ms budget).

use chrono::Utc;
use rand::Rng;

use fapm_core::error::Result;
use fapm_core::metrics::{CrashReport, DeviceInfo, MetricValues, MetricsSample};

/// Capability polled by the collector. The `Send` bound on returned futures
/// lets collection loops run as spawned tokio tasks.
#[trait_variant::make(PlatformMonitor: Send)]
pub trait LocalPlatformMonitor {
    /// Collect one performance sample. May fail; the collector absorbs
    /// failures and keeps polling.
    async fn collect_metrics(&self) -> Result<MetricsSample>;

    /// Build a crash report for an error raised on this platform.
    async fn handle_crash(&self, error: &str) -> Result<CrashReport>;
}

/// Mock Flutter monitor producing randomized but realistic values.
#[derive(Debug, Clone, Default)]
pub struct FlutterMonitor;

impl FlutterMonitor {
    pub const PLATFORM: &'static str = "flutter";

    pub fn new() -> Self {
        Self
    }

    fn device_info() -> DeviceInfo {
        DeviceInfo {
            os: "iOS/Android".into(),
            version: "1.0.0".into(),
            device: "Unknown".into(),
        }
    }
}

impl PlatformMonitor for FlutterMonitor {
    async fn collect_metrics(&self) -> Result<MetricsSample> {
        let mut rng = rand::thread_rng();
        Ok(MetricsSample {
            platform: Self::PLATFORM.into(),
            timestamp: Utc::now().timestamp_millis(),
            metrics: MetricValues {
                memory: rng.gen_range(0.0..100.0),
                cpu: rng.gen_range(0.0..100.0),
                fps: 60.0 - rng.gen_range(0.0..10.0),
                frame_time: 16.67 + rng.gen_range(0.0..5.0),
            },
        })
    }

    async fn handle_crash(&self, error: &str) -> Result<CrashReport> {
        Ok(CrashReport {
            platform: Self::PLATFORM.into(),
            timestamp: Utc::now().timestamp_millis(),
            error: error.to_string(),
            stack_trace: None,
            device_info: Self::device_info(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fapm_core::validate::{validate_crash_report, validate_metrics};

    #[tokio::test]
    async fn test_mock_samples_are_valid_and_in_range() {
        let monitor = FlutterMonitor::new();
        for _ in 0..50 {
            let sample = PlatformMonitor::collect_metrics(&monitor).await.unwrap();
            assert_eq!(sample.platform, "flutter");
            validate_metrics(&sample).unwrap();
            assert!(sample.metrics.fps > 49.9 && sample.metrics.fps <= 60.0);
            assert!(sample.metrics.frame_time >= 16.67 && sample.metrics.frame_time < 21.68);
        }
    }

    #[tokio::test]
    async fn test_crash_report_carries_error_message() {
        let monitor = FlutterMonitor::new();
        let report = PlatformMonitor::handle_crash(&monitor, "widget tree exploded")
            .await
            .unwrap();
        assert_eq!(report.error, "widget tree exploded");
        validate_crash_report(&report).unwrap();
    }
}
