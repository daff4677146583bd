//! Brandsmith boundary: reads one JSON feature request (argument or stdin),
//! prints one JSON response on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use brandsmith::{FeatureOrchestrator, FeatureRequest, FeatureResponse, GatewayConfig, GatewayContext};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brandsmith=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = std::env::var_os("BRANDSMITH_CONFIG").map(PathBuf::from);
    let config = GatewayConfig::load(config_path.as_deref()).context("loading configuration")?;
    let context = GatewayContext::initialize(config)
        .await
        .context("initializing gateway context")?;
    let orchestrator = FeatureOrchestrator::new(Arc::new(context));
    info!("Brandsmith ready");

    let raw = match std::env::args().nth(1) {
        Some(arg) => arg,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading request from stdin")?;
            buf
        }
    };

    let response = match serde_json::from_str::<FeatureRequest>(&raw) {
        Ok(request) => {
            let task = tokio::spawn(async move { orchestrator.handle(request).await });
            match task.await {
                Ok(result) => FeatureResponse::from_result(&result),
                Err(e) => {
                    error!("request task failed: {}", e);
                    FeatureResponse::service_failure(e.to_string())
                }
            }
        }
        Err(e) => {
            error!("malformed request: {}", e);
            FeatureResponse::service_failure(format!("invalid request: {}", e))
        }
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
