//! # fapm-engine - Aggregation & Collection
//!
//! The core of the APM shim: bounded per-platform metrics history with
//! running statistics and threshold anomaly detection, periodic collection
//! scheduling, and the public integration façade.
//!
//! Depends on [`fapm_core`] for domain types, validation, and error handling.
//!
//! ## Public API
//!
//! ### Aggregation (`aggregator`)
//! - [`MetricsAggregator`] - Validate, append, evict, and flag anomalies
//! - [`PlatformStats`] - Bounded moving averages over the retained window
//! - [`average()`] - Mean of a slice, zero when empty
//!
//! ### Collection (`collector`)
//! - [`MetricsCollector`] - At-most-one polling task per platform key
//!
//! ### Monitors (`monitor`)
//! - [`PlatformMonitor`] - Injected capability producing samples and crash reports
//! - [`FlutterMonitor`] - Mock implementation with randomized values
//!
//! ### Façade (`integration`)
//! - [`ApmIntegration`] - `handle_metrics` / `handle_crash` entry points

pub mod aggregator;
pub mod collector;
pub mod integration;
pub mod monitor;

// Public API re-exports
pub use aggregator::{average, MetricsAggregator, PlatformStats};
pub use collector::MetricsCollector;
pub use integration::ApmIntegration;
pub use monitor::{FlutterMonitor, PlatformMonitor};
