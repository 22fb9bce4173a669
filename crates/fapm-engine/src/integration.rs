//! Public APM entry point.
//!
//! Translates "metrics received" / "crash received" events into aggregator
//! calls. Crashes are recorded in the metrics stream as an all-zero sample
//! (so they count toward aggregate anomaly tracking) while the crash report
//! itself — error, stack trace, device info — is retained in a bounded
//! crash log rather than discarded.

use std::sync::{Arc, Mutex};

use tracing::{error, warn};

use fapm_core::error::{Error, Result};
use fapm_core::metrics::{CrashReport, MetricsSample, RingBuffer};
use fapm_core::validate::validate_crash_report;

use crate::aggregator::MetricsAggregator;

/// Crash reports retained for the alerts channel.
const CRASH_LOG_LIMIT: usize = 50;

/// Integration façade owning the aggregator and the crash log.
///
/// Explicitly constructed and passed around; there is no process-wide
/// singleton. Expected lifecycle: one instance per process, shared behind
/// an `Arc` between the collector, the HTTP boundary, and outbound
/// forwarding.
pub struct ApmIntegration {
    aggregator: Arc<MetricsAggregator>,
    crashes: Mutex<RingBuffer<CrashReport>>,
}

impl Default for ApmIntegration {
    fn default() -> Self {
        Self::new()
    }
}

impl ApmIntegration {
    /// Façade with a fresh aggregator.
    pub fn new() -> Self {
        Self::with_aggregator(Arc::new(MetricsAggregator::new()))
    }

    /// Façade sharing an externally owned aggregator.
    pub fn with_aggregator(aggregator: Arc<MetricsAggregator>) -> Self {
        Self {
            aggregator,
            crashes: Mutex::new(RingBuffer::new(CRASH_LOG_LIMIT)),
        }
    }

    /// The shared aggregator.
    pub fn aggregator(&self) -> &Arc<MetricsAggregator> {
        &self.aggregator
    }

    /// Forward a metrics sample to the aggregator.
    ///
    /// `None` fails with "Invalid metrics data" without touching the
    /// aggregator. Downstream failures are logged and re-thrown wrapped as
    /// "Metrics processing failed: …", preserving the original message.
    pub async fn handle_metrics(&self, sample: Option<MetricsSample>) -> Result<()> {
        let Some(sample) = sample else {
            return Err(Error::validation("Invalid metrics data"));
        };

        self.aggregator.process_metrics(sample).await.map_err(|e| {
            error!("Metrics processing failed: {e}");
            Error::metrics_processing(e)
        })
    }

    /// Record a crash: validate the report, keep its diagnostics in the
    /// crash log, and feed an all-zero sample through the metrics pipeline.
    ///
    /// `None` fails with "Invalid crash report". Downstream failures are
    /// logged and re-thrown wrapped as "Crash processing failed: …".
    pub async fn handle_crash(&self, report: Option<CrashReport>) -> Result<()> {
        let Some(report) = report else {
            return Err(Error::validation("Invalid crash report"));
        };

        let result = self.record_crash(report).await;
        result.map_err(|e| {
            error!("Crash processing failed: {e}");
            Error::crash_processing(e)
        })
    }

    async fn record_crash(&self, report: CrashReport) -> Result<()> {
        validate_crash_report(&report)?;

        warn!(
            platform = %report.platform,
            error = %report.error,
            "Crash detected"
        );

        let marker = MetricsSample::crash_marker(&report.platform, report.timestamp);
        {
            let mut crashes = self.crashes.lock().expect("crash log poisoned");
            crashes.push(report);
        }
        self.aggregator.process_metrics(marker).await
    }

    /// Snapshot of recently recorded crash reports, oldest first.
    pub fn recent_crashes(&self) -> Vec<CrashReport> {
        self.crashes.lock().expect("crash log poisoned").to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fapm_core::metrics::{DeviceInfo, MetricValues};

    fn sample(timestamp: i64) -> MetricsSample {
        MetricsSample {
            platform: "flutter".into(),
            timestamp,
            metrics: MetricValues {
                memory: 50.0,
                cpu: 30.0,
                fps: 60.0,
                frame_time: 16.67,
            },
        }
    }

    fn report() -> CrashReport {
        CrashReport {
            platform: "flutter".into(),
            timestamp: 1_700_000_000_000,
            error: "RenderFlex overflowed".into(),
            stack_trace: Some("#0 performLayout".into()),
            device_info: DeviceInfo {
                os: "Android".into(),
                version: "14".into(),
                device: "Pixel 8".into(),
            },
        }
    }

    #[tokio::test]
    async fn test_handle_metrics_none_rejects_without_aggregation() {
        let integration = ApmIntegration::new();
        let err = integration.handle_metrics(None).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid metrics data");
        assert!(integration.aggregator().platforms().is_empty());
    }

    #[tokio::test]
    async fn test_handle_metrics_forwards_to_aggregator() {
        let integration = ApmIntegration::new();
        integration.handle_metrics(Some(sample(7))).await.unwrap();

        let history = integration.aggregator().history("flutter");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].timestamp, 7);
    }

    #[tokio::test]
    async fn test_handle_metrics_wraps_validation_failures() {
        let integration = ApmIntegration::new();
        let mut bad = sample(7);
        bad.metrics.memory = -1.0;

        let err = integration.handle_metrics(Some(bad)).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Metrics processing failed: "));
        // The original field message survives for pattern-matching callers.
        assert!(msg.contains("Memory must be a number between 0 and 100"));
    }

    #[tokio::test]
    async fn test_handle_crash_none_rejects() {
        let integration = ApmIntegration::new();
        let err = integration.handle_crash(None).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid crash report");
        assert!(integration.recent_crashes().is_empty());
    }

    #[tokio::test]
    async fn test_handle_crash_records_zero_sample_and_diagnostics() {
        let integration = ApmIntegration::new();
        integration.handle_crash(Some(report())).await.unwrap();

        // The metrics stream got the degenerate all-zero sample...
        let history = integration.aggregator().history("flutter");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].metrics.memory, 0.0);
        assert_eq!(history[0].metrics.fps, 0.0);
        assert_eq!(history[0].timestamp, 1_700_000_000_000);

        // ...while the crash diagnostics are preserved separately.
        let crashes = integration.recent_crashes();
        assert_eq!(crashes.len(), 1);
        assert_eq!(crashes[0].error, "RenderFlex overflowed");
        assert_eq!(crashes[0].device_info.device, "Pixel 8");
    }

    #[tokio::test]
    async fn test_handle_crash_wraps_invalid_reports() {
        let integration = ApmIntegration::new();
        let mut bad = report();
        bad.device_info.os = String::new();

        let err = integration.handle_crash(Some(bad)).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Crash processing failed: "));
        assert!(msg.contains("OS is required and must be a string"));
        assert!(integration.aggregator().history("flutter").is_empty());
    }

    #[tokio::test]
    async fn test_crash_log_is_bounded() {
        let integration = ApmIntegration::new();
        for n in 0..60 {
            let mut r = report();
            r.error = format!("crash {n}");
            integration.handle_crash(Some(r)).await.unwrap();
        }

        let crashes = integration.recent_crashes();
        assert_eq!(crashes.len(), 50);
        assert_eq!(crashes[0].error, "crash 10");
        assert_eq!(crashes.last().unwrap().error, "crash 59");
    }
}
