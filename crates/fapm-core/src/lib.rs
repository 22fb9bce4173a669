//! # fapm-core - Core Domain Types
//!
//! Foundation crate for the Flutter APM shim. Provides domain types, error
//! handling, boundary validation, and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on
//! external crates (serde, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`metrics`)
//! - [`MetricsSample`] / [`MetricValues`] - One performance observation
//! - [`CrashReport`] / [`DeviceInfo`] - A crash observation with diagnostics
//! - [`Anomaly`] / [`AnomalyKind`] - A metric value exceeding its threshold
//! - [`RingBuffer`] - Bounded FIFO backing per-platform history
//! - Threshold constants ([`MEMORY_THRESHOLD`], [`CPU_THRESHOLD`],
//!   [`FPS_THRESHOLD`], [`FRAME_TIME_THRESHOLD_MS`])
//!
//! ### Validation (`validate`)
//! - [`validate_metrics()`] - Field-order range checks for samples
//! - [`validate_crash_report()`] - Field-order checks for crash reports
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum (validation / config / processing / transport)
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use fapm_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod metrics;
pub mod validate;

/// Prelude for common imports used throughout all flutter-apm crates
pub mod prelude {
    pub use super::error::{Error, Result};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result};
pub use metrics::{
    Anomaly, AnomalyKind, CrashReport, DeviceInfo, MetricValues, MetricsSample, RingBuffer,
    CPU_THRESHOLD, DEFAULT_HISTORY_LIMIT, FPS_THRESHOLD, FRAME_TIME_THRESHOLD_MS,
    MAX_HISTORY_LIMIT, MEMORY_THRESHOLD,
};
pub use validate::{validate_crash_report, validate_metrics};
