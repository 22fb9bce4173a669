//! Boundary validation for inbound metrics and crash reports.
//!
//! Pure predicate functions: no side effects, first violated field wins.
//! Checks run in a fixed field order so the reported message is
//! deterministic, and every message is a stable string the HTTP boundary
//! and tests can match on.
//!
//! Shape-level problems (missing fields, wrong JSON types, null bodies) are
//! rejected before these functions run — serde refuses to deserialize them,
//! and the façade maps absent payloads to its own "Invalid metrics data" /
//! "Invalid crash report" errors. What remains here is range and emptiness
//! checking on structurally valid input.

use crate::error::{Error, Result};
use crate::metrics::{CrashReport, MetricsSample};

/// Validate a metrics sample before it enters the aggregator.
///
/// Field order: platform, timestamp, then memory, cpu, fps, frame time.
pub fn validate_metrics(sample: &MetricsSample) -> Result<()> {
    if sample.platform.trim().is_empty() {
        return Err(Error::validation("Platform is required and must be a string"));
    }
    if sample.timestamp <= 0 {
        return Err(Error::validation("Timestamp is required and must be a number"));
    }

    let m = &sample.metrics;
    if !m.memory.is_finite() || !(0.0..=100.0).contains(&m.memory) {
        return Err(Error::validation("Memory must be a number between 0 and 100"));
    }
    if !m.cpu.is_finite() || !(0.0..=100.0).contains(&m.cpu) {
        return Err(Error::validation("CPU must be a number between 0 and 100"));
    }
    if !m.fps.is_finite() || m.fps < 0.0 {
        return Err(Error::validation("FPS must be a positive number"));
    }
    if !m.frame_time.is_finite() || m.frame_time < 0.0 {
        return Err(Error::validation("Frame time must be a positive number"));
    }

    Ok(())
}

/// Validate a crash report before the façade records it.
///
/// Field order: platform, timestamp, error message, then device info
/// (os, version, device).
pub fn validate_crash_report(report: &CrashReport) -> Result<()> {
    if report.platform.trim().is_empty() {
        return Err(Error::validation("Platform is required and must be a string"));
    }
    if report.timestamp <= 0 {
        return Err(Error::validation("Timestamp is required and must be a number"));
    }
    if report.error.trim().is_empty() {
        return Err(Error::validation(
            "Error message is required and must be a string",
        ));
    }

    let device = &report.device_info;
    if device.os.trim().is_empty() {
        return Err(Error::validation("OS is required and must be a string"));
    }
    if device.version.trim().is_empty() {
        return Err(Error::validation("Version is required and must be a string"));
    }
    if device.device.trim().is_empty() {
        return Err(Error::validation(
            "Device name is required and must be a string",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{DeviceInfo, MetricValues};

    fn sample() -> MetricsSample {
        MetricsSample {
            platform: "flutter".into(),
            timestamp: 1_700_000_000_000,
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
            error: "NullPointerException".into(),
            stack_trace: Some("#0 main (package:app/main.dart:1:1)".into()),
            device_info: DeviceInfo {
                os: "Android".into(),
                version: "14".into(),
                device: "Pixel 8".into(),
            },
        }
    }

    fn metrics_message(mutate: impl FnOnce(&mut MetricsSample)) -> String {
        let mut s = sample();
        mutate(&mut s);
        validate_metrics(&s).unwrap_err().to_string()
    }

    fn crash_message(mutate: impl FnOnce(&mut CrashReport)) -> String {
        let mut r = report();
        mutate(&mut r);
        validate_crash_report(&r).unwrap_err().to_string()
    }

    #[test]
    fn test_valid_sample_passes() {
        assert!(validate_metrics(&sample()).is_ok());
    }

    #[test]
    fn test_boundary_values_pass() {
        let mut s = sample();
        s.metrics.memory = 0.0;
        s.metrics.cpu = 100.0;
        s.metrics.fps = 0.0;
        s.metrics.frame_time = 0.0;
        assert!(validate_metrics(&s).is_ok());
    }

    #[test]
    fn test_empty_platform_rejected() {
        assert_eq!(
            metrics_message(|s| s.platform = String::new()),
            "Platform is required and must be a string"
        );
    }

    #[test]
    fn test_missing_timestamp_rejected() {
        assert_eq!(
            metrics_message(|s| s.timestamp = 0),
            "Timestamp is required and must be a number"
        );
    }

    #[test]
    fn test_memory_out_of_range_rejected() {
        for bad in [-1.0, 101.0, f64::NAN] {
            assert_eq!(
                metrics_message(|s| s.metrics.memory = bad),
                "Memory must be a number between 0 and 100"
            );
        }
    }

    #[test]
    fn test_cpu_out_of_range_rejected() {
        assert_eq!(
            metrics_message(|s| s.metrics.cpu = 100.5),
            "CPU must be a number between 0 and 100"
        );
    }

    #[test]
    fn test_negative_fps_rejected() {
        assert_eq!(
            metrics_message(|s| s.metrics.fps = -1.0),
            "FPS must be a positive number"
        );
    }

    #[test]
    fn test_negative_frame_time_rejected() {
        assert_eq!(
            metrics_message(|s| s.metrics.frame_time = -0.1),
            "Frame time must be a positive number"
        );
    }

    #[test]
    fn test_checks_run_in_field_order() {
        // Everything is wrong; the platform check must win.
        let msg = metrics_message(|s| {
            s.platform = String::new();
            s.timestamp = -5;
            s.metrics.memory = 200.0;
        });
        assert_eq!(msg, "Platform is required and must be a string");
    }

    #[test]
    fn test_valid_crash_report_passes() {
        assert!(validate_crash_report(&report()).is_ok());
    }

    #[test]
    fn test_crash_report_without_stack_trace_passes() {
        let mut r = report();
        r.stack_trace = None;
        assert!(validate_crash_report(&r).is_ok());
    }

    #[test]
    fn test_crash_empty_error_rejected() {
        assert_eq!(
            crash_message(|r| r.error = "  ".into()),
            "Error message is required and must be a string"
        );
    }

    #[test]
    fn test_crash_device_info_fields_rejected() {
        assert_eq!(
            crash_message(|r| r.device_info.os = String::new()),
            "OS is required and must be a string"
        );
        assert_eq!(
            crash_message(|r| r.device_info.version = String::new()),
            "Version is required and must be a string"
        );
        assert_eq!(
            crash_message(|r| r.device_info.device = String::new()),
            "Device name is required and must be a string"
        );
    }

    #[test]
    fn test_crash_checks_run_in_field_order() {
        let msg = crash_message(|r| {
            r.timestamp = 0;
            r.error = String::new();
        });
        assert_eq!(msg, "Timestamp is required and must be a number");
    }
}
