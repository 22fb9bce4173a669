//! Flutter APM shim - binary entry point.
//!
//! Wires the pieces together: logging, the shared aggregator, mock Flutter
//! collection on a timer, optional outbound forwarding to Telex, and the
//! HTTP boundary.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use fapm_engine::{ApmIntegration, FlutterMonitor, MetricsAggregator, MetricsCollector};
use fapm_gateway::TelexClient;

/// APM integration shim for Flutter performance metrics and crash reports
#[derive(Parser, Debug)]
#[command(name = "fapm")]
#[command(about = "APM integration shim for Flutter performance metrics", long_about = None)]
struct Args {
    /// Address for the HTTP boundary
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Metrics collection interval in seconds
    #[arg(long, default_value_t = 300)]
    interval: u64,

    /// Telex organisation id (enables outbound forwarding)
    #[arg(long)]
    org_id: Option<String>,

    /// Telex auth token
    #[arg(long)]
    auth_token: Option<String>,

    /// Channel receiving forwarded metrics messages
    #[arg(long, default_value = "default-metrics")]
    metrics_channel: String,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    fapm_core::logging::init()?;

    let aggregator = Arc::new(MetricsAggregator::new());
    let integration = Arc::new(ApmIntegration::with_aggregator(aggregator.clone()));

    let collector = MetricsCollector::new(aggregator.clone());
    collector.start_collection(
        FlutterMonitor::PLATFORM,
        FlutterMonitor::new(),
        Duration::from_secs(args.interval),
    );

    match (&args.org_id, &args.auth_token) {
        (Some(org_id), Some(auth_token)) => {
            let client = TelexClient::new(org_id.clone(), auth_token.clone());
            spawn_forwarder(
                aggregator.clone(),
                client,
                args.metrics_channel.clone(),
                Duration::from_secs(args.interval),
            );
        }
        (None, None) => {
            info!("No Telex credentials configured; outbound forwarding disabled");
        }
        _ => {
            warn!("Both --org-id and --auth-token are required for forwarding; forwarding disabled");
        }
    }

    fapm_gateway::serve(&args.listen, integration).await?;
    collector.stop_all_collections();
    Ok(())
}

/// Periodically forward each platform's latest sample to the metrics channel.
/// Send failures are logged and absorbed; the schedule stays alive.
fn spawn_forwarder(
    aggregator: Arc<MetricsAggregator>,
    client: TelexClient,
    channel: String,
    interval: Duration,
) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(interval);
        tick.tick().await;
        loop {
            tick.tick().await;
            for platform in aggregator.platforms() {
                let history = aggregator.history(&platform);
                let Some(latest) = history.last() else {
                    continue;
                };
                if let Err(e) = client.send_metrics_message(&channel, latest).await {
                    warn!(platform = %platform, "Failed to forward metrics: {e}");
                }
            }
        }
    });
}
