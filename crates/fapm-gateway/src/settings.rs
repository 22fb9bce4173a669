//! Integration settings: defaults, partial-payload merge, and validation.
//!
//! Settings arrive as partial JSON payloads from the integration platform
//! and merge over the current values. Validation happens before any field is
//! applied, so a payload with one bad field changes nothing.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use fapm_core::error::{Error, Result};

/// How aggressively anomaly alerts are raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AlertSensitivity {
    High,
    #[default]
    Medium,
    Low,
}

/// Effective integration settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApmSettings {
    /// Collection schedule as a five-field crontab expression.
    pub collection_interval: String,
    /// Channel receiving periodic metrics messages.
    pub metrics_channel: String,
    /// Channel receiving crash/anomaly alerts.
    pub alerts_channel: String,
    /// Platform keys to collect from.
    pub monitored_platforms: Vec<String>,
    pub memory_threshold: f64,
    pub cpu_threshold: f64,
    pub fps_threshold: f64,
    pub enable_crash_reporting: bool,
    pub alert_sensitivity: AlertSensitivity,
}

impl Default for ApmSettings {
    fn default() -> Self {
        Self {
            collection_interval: "*/5 * * * *".into(),
            metrics_channel: "default-metrics".into(),
            alerts_channel: "default-alerts".into(),
            monitored_platforms: Vec::new(),
            memory_threshold: 90.0,
            cpu_threshold: 80.0,
            fps_threshold: 30.0,
            enable_crash_reporting: true,
            alert_sensitivity: AlertSensitivity::Medium,
        }
    }
}

/// Monitored platforms arrive either as a JSON array or as a comma-separated
/// string, depending on which form the settings UI sends.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PlatformList {
    List(Vec<String>),
    Csv(String),
}

impl PlatformList {
    fn into_vec(self) -> Vec<String> {
        match self {
            PlatformList::List(platforms) => platforms,
            PlatformList::Csv(csv) => csv
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }
}

/// Partial settings payload; absent fields keep their current values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    pub collection_interval: Option<String>,
    pub metrics_channel: Option<String>,
    pub alerts_channel: Option<String>,
    pub monitored_platforms: Option<PlatformList>,
    pub memory_threshold: Option<f64>,
    pub cpu_threshold: Option<f64>,
    pub fps_threshold: Option<f64>,
    pub enable_crash_reporting: Option<bool>,
    pub alert_sensitivity: Option<AlertSensitivity>,
}

/// Five fields, each `*` or a number, with an optional `/step`.
fn crontab_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\*|\d+)(/\d+)?(\s+(\*|\d+)(/\d+)?){4}$").expect("crontab pattern compiles")
    })
}

fn is_valid_crontab(expression: &str) -> bool {
    crontab_pattern().is_match(expression)
}

/// Holds the current settings and applies validated patches.
#[derive(Debug, Default)]
pub struct SettingsHandler {
    settings: ApmSettings,
}

impl SettingsHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and merge a partial payload, returning the effective
    /// settings. A failed validation leaves the current settings untouched.
    pub fn load_settings(&mut self, patch: SettingsPatch) -> Result<&ApmSettings> {
        Self::validate(&patch)?;

        if let Some(interval) = patch.collection_interval {
            self.settings.collection_interval = interval;
        }
        if let Some(channel) = patch.metrics_channel {
            self.settings.metrics_channel = channel;
        }
        if let Some(channel) = patch.alerts_channel {
            self.settings.alerts_channel = channel;
        }
        if let Some(platforms) = patch.monitored_platforms {
            self.settings.monitored_platforms = platforms.into_vec();
        }
        if let Some(threshold) = patch.memory_threshold {
            self.settings.memory_threshold = threshold;
        }
        if let Some(threshold) = patch.cpu_threshold {
            self.settings.cpu_threshold = threshold;
        }
        if let Some(threshold) = patch.fps_threshold {
            self.settings.fps_threshold = threshold;
        }
        if let Some(enabled) = patch.enable_crash_reporting {
            self.settings.enable_crash_reporting = enabled;
        }
        if let Some(sensitivity) = patch.alert_sensitivity {
            self.settings.alert_sensitivity = sensitivity;
        }

        info!("Settings loaded successfully");
        Ok(&self.settings)
    }

    fn validate(patch: &SettingsPatch) -> Result<()> {
        if let Some(interval) = &patch.collection_interval {
            if !is_valid_crontab(interval) {
                return Err(Error::config("Invalid collection interval format"));
            }
        }
        if let Some(threshold) = patch.memory_threshold {
            if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
                return Err(Error::config("Memory threshold must be between 0 and 100"));
            }
        }
        if let Some(threshold) = patch.cpu_threshold {
            if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
                return Err(Error::config("CPU threshold must be between 0 and 100"));
            }
        }
        if let Some(threshold) = patch.fps_threshold {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(Error::config("FPS threshold must be a positive number"));
            }
        }
        Ok(())
    }

    /// The effective settings.
    pub fn settings(&self) -> &ApmSettings {
        &self.settings
    }
}
