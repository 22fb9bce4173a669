//! Application error types with rich context

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Input Validation Errors
    // ─────────────────────────────────────────────────────────────
    /// Malformed metrics or crash-report input. Displays the precise field
    /// message so callers can surface it unchanged.
    #[error("{message}")]
    Validation { message: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("{message}")]
    Config { message: String },

    // ─────────────────────────────────────────────────────────────
    // Processing Errors
    // ─────────────────────────────────────────────────────────────
    /// Metrics pipeline failure, wrapping the downstream cause. The cause's
    /// message stays in the display string so callers can pattern-match it.
    #[error("Metrics processing failed: {source}")]
    MetricsProcessing {
        #[source]
        source: Box<Error>,
    },

    /// Crash pipeline failure, wrapping the downstream cause.
    #[error("Crash processing failed: {source}")]
    CrashProcessing {
        #[source]
        source: Box<Error>,
    },

    // ─────────────────────────────────────────────────────────────
    // Transport Errors
    // ─────────────────────────────────────────────────────────────
    /// Outbound messaging request failure.
    #[error("API request failed: {message}")]
    Transport { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn metrics_processing(source: Error) -> Self {
        Self::MetricsProcessing {
            source: Box::new(source),
        }
    }

    pub fn crash_processing(source: Error) -> Self {
        Self::CrashProcessing {
            source: Box::new(source),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Whether the caller can recover by correcting its input.
    ///
    /// Validation and configuration failures are the caller's to fix and are
    /// never retried; everything else is an internal/transport fault. The
    /// HTTP boundary maps this split to 400 vs 500. Processing wrappers
    /// classify by their cause.
    pub fn is_caller_error(&self) -> bool {
        match self {
            Error::Validation { .. } | Error::Config { .. } => true,
            Error::MetricsProcessing { source } | Error::CrashProcessing { source } => {
                source.is_caller_error()
            }
            _ => false,
        }
    }
}
