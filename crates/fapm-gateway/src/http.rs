//! Thin HTTP boundary for the APM shim.
//!
//! Request dispatch only — all policy lives behind the [`ApmIntegration`]
//! façade. Error mapping follows the error taxonomy: validation and
//! configuration failures are the caller's fault (400), everything else is
//! internal (500). Unknown paths get a JSON 404; known paths with the wrong
//! method get a JSON 405 naming the allowed methods.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use fapm_core::error::{Error, Result};
use fapm_core::metrics::{CrashReport, MetricsSample};
use fapm_engine::ApmIntegration;

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    integration: Arc<ApmIntegration>,
}

impl AppState {
    pub fn new(integration: Arc<ApmIntegration>) -> Self {
        Self { integration }
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339()
}

/// Map a pipeline failure to its HTTP response.
fn error_response(err: &Error) -> (StatusCode, Json<Value>) {
    let status = if err.is_caller_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(json!({ "error": err.to_string() })))
}

async fn handle_health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn handle_metrics_list(State(state): State<AppState>) -> Json<Value> {
    let aggregator = state.integration.aggregator();
    let mut metrics: Vec<MetricsSample> = Vec::new();
    let mut platforms = aggregator.platforms();
    platforms.sort();
    for platform in platforms {
        metrics.extend(aggregator.history(&platform));
    }
    Json(json!({
        "success": true,
        "timestamp": timestamp(),
        "metrics": metrics,
    }))
}

async fn handle_metrics_submit(
    State(state): State<AppState>,
    payload: std::result::Result<Json<MetricsSample>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let sample = match payload {
        Ok(Json(sample)) => sample,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": rejection.body_text() })),
            );
        }
    };

    match state.integration.handle_metrics(Some(sample)).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Metrics received",
                "timestamp": timestamp(),
            })),
        ),
        Err(e) => error_response(&e),
    }
}

async fn handle_crash_submit(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CrashReport>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let report = match payload {
        Ok(Json(report)) => report,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": rejection.body_text() })),
            );
        }
    };

    match state.integration.handle_crash(Some(report)).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Crash report received",
                "timestamp": timestamp(),
            })),
        ),
        Err(e) => error_response(&e),
    }
}

async fn handle_not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not Found" })))
}

fn method_not_allowed(allowed: &[&str]) -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": "Method Not Allowed",
            "allowedMethods": allowed,
        })),
    )
}

async fn health_method_not_allowed() -> (StatusCode, Json<Value>) {
    method_not_allowed(&["GET"])
}

async fn metrics_method_not_allowed() -> (StatusCode, Json<Value>) {
    method_not_allowed(&["GET", "POST"])
}

async fn crash_method_not_allowed() -> (StatusCode, Json<Value>) {
    method_not_allowed(&["POST"])
}

/// Build the axum router.
pub fn build_router(integration: Arc<ApmIntegration>) -> Router {
    let state = AppState::new(integration);
    Router::new()
        .route(
            "/health",
            get(handle_health).fallback(health_method_not_allowed),
        )
        .route(
            "/metrics",
            get(handle_metrics_list)
                .post(handle_metrics_submit)
                .fallback(metrics_method_not_allowed),
        )
        .route(
            "/crash-report",
            post(handle_crash_submit).fallback(crash_method_not_allowed),
        )
        .fallback(handle_not_found)
        .with_state(state)
}

/// Bind and serve the HTTP boundary until the process exits.
pub async fn serve(addr: &str, integration: Arc<ApmIntegration>) -> Result<()> {
    let app = build_router(integration);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr, "HTTP boundary listening");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fapm_core::metrics::{DeviceInfo, MetricValues};

    fn state() -> AppState {
        AppState::new(Arc::new(ApmIntegration::new()))
    }

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

    #[tokio::test]
    async fn test_health_reports_status_and_version() {
        let Json(body) = handle_health().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_submit_then_list_round_trip() {
        let state = state();
        let (status, Json(body)) =
            handle_metrics_submit(State(state.clone()), Ok(Json(sample(42)))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Metrics received");

        let Json(listed) = handle_metrics_list(State(state)).await;
        assert_eq!(listed["success"], true);
        assert_eq!(listed["metrics"].as_array().unwrap().len(), 1);
        assert_eq!(listed["metrics"][0]["timestamp"], 42);
    }

    #[tokio::test]
    async fn test_invalid_sample_maps_to_400() {
        let mut bad = sample(42);
        bad.metrics.cpu = 250.0;
        let (status, Json(body)) = handle_metrics_submit(State(state()), Ok(Json(bad))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("CPU must be a number between 0 and 100"));
    }

    #[tokio::test]
    async fn test_crash_report_accepted() {
        let state = state();
        let report = CrashReport {
            platform: "flutter".into(),
            timestamp: 7,
            error: "boom".into(),
            stack_trace: None,
            device_info: DeviceInfo {
                os: "Android".into(),
                version: "14".into(),
                device: "Pixel 8".into(),
            },
        };
        let (status, Json(body)) =
            handle_crash_submit(State(state.clone()), Ok(Json(report))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Crash report received");

        // The crash shows up in the metrics list as the zeroed marker.
        let Json(listed) = handle_metrics_list(State(state)).await;
        assert_eq!(listed["metrics"][0]["metrics"]["fps"], 0.0);
    }

    #[tokio::test]
    async fn test_unknown_path_is_json_404() {
        let (status, Json(body)) = handle_not_found().await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not Found");
    }

    #[tokio::test]
    async fn test_wrong_method_names_allowed_methods() {
        let (status, Json(body)) = metrics_method_not_allowed().await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method Not Allowed");
        assert_eq!(body["allowedMethods"], json!(["GET", "POST"]));
    }
}
