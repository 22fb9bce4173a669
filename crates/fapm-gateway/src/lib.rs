//! # fapm-gateway - External Collaborators
//!
//! Everything that talks to the outside world on behalf of the APM engine:
//! the settings handler, the outbound Telex messaging client, and the thin
//! HTTP boundary.
//!
//! Depends on [`fapm_core`] for domain types and [`fapm_engine`] for the
//! integration façade behind the HTTP handlers.
//!
//! ## Public API
//!
//! ### Settings (`settings`)
//! - [`ApmSettings`] / [`SettingsPatch`] - Effective settings and partial payloads
//! - [`SettingsHandler`] - Validate-then-merge over defaults
//! - [`AlertSensitivity`] / [`PlatformList`]
//!
//! ### Outbound Messaging (`telex`)
//! - [`TelexClient`] - Bearer-authenticated Telex REST wrapper
//!
//! ### HTTP Boundary (`http`)
//! - [`build_router()`] / [`serve()`] - health / metrics / crash-report endpoints

pub mod http;
pub mod settings;
pub mod telex;

// Public API re-exports
pub use http::{build_router, serve};
pub use settings::{AlertSensitivity, ApmSettings, PlatformList, SettingsHandler, SettingsPatch};
pub use telex::TelexClient;
