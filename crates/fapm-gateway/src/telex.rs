//! Outbound Telex messaging client.
//!
//! A thin authenticated wrapper over the Telex REST API: metrics and crash
//! payloads are serialized to pretty JSON and posted as channel messages.
//! Failures are logged with context and surface as transport errors; there
//! is no retry policy here.

use reqwest::Method;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error};

use fapm_core::error::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://api.telex.im";

/// Bearer-authenticated Telex API client scoped to one organisation.
#[derive(Debug, Clone)]
pub struct TelexClient {
    base_url: String,
    org_id: String,
    auth_token: String,
    http: reqwest::Client,
}

impl TelexClient {
    pub fn new(org_id: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            org_id: org_id.into(),
            auth_token: auth_token.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Point the client at a different API host (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn messages_path(&self, channel_id: &str) -> String {
        format!(
            "/organisations/{}/channels/{}/messages",
            self.org_id, channel_id
        )
    }

    fn integration_settings_path(&self, integration_id: &str) -> String {
        format!(
            "/organisations/{}/integrations/{}/settings",
            self.org_id, integration_id
        )
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .request(method, &url)
            .bearer_auth(&self.auth_token)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!("API request failed: {e}");
                Error::transport(e.to_string())
            })?;

        if let Err(e) = response.error_for_status_ref() {
            error!("API request failed: {e}");
            return Err(Error::transport(e.to_string()));
        }
        debug!(path, "Telex request succeeded");
        Ok(())
    }

    /// Post a serialized metrics payload to a channel.
    pub async fn send_metrics_message<T: Serialize>(
        &self,
        channel_id: &str,
        metrics: &T,
    ) -> Result<()> {
        let content = serde_json::to_string_pretty(metrics)?;
        self.request(
            Method::POST,
            &self.messages_path(channel_id),
            &json!({ "content": content }),
        )
        .await
    }

    /// Post a serialized crash alert to a channel.
    pub async fn send_crash_alert<T: Serialize>(&self, channel_id: &str, crash: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(crash)?;
        self.request(
            Method::POST,
            &self.messages_path(channel_id),
            &json!({ "content": content }),
        )
        .await
    }

    /// Push updated integration settings back to Telex.
    pub async fn update_integration_settings<T: Serialize>(
        &self,
        integration_id: &str,
        settings: &T,
    ) -> Result<()> {
        let body = serde_json::to_value(settings)?;
        self.request(
            Method::PUT,
            &self.integration_settings_path(integration_id),
            &body,
        )
        .await
    }
}
