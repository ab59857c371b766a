mod app;

use std::sync::Arc;

use anyhow::{Context, Result};
use readout_core::telemetry::init_tracing;
use readout_core::{FrontendConfig, LambdaInvoker};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::app::{router, AppState};

/// Long-running web front end, meant for EC2/ECS style hosts.
///
/// Serves `GET /` by invoking the configured function and relaying its payload.
#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("readout_frontend=info,readout_core=info");

    let config = FrontendConfig::from_env().context("Invalid front end configuration")?;
    let invoker = LambdaInvoker::from_env().await;
    let app = router(AppState::new(
        Arc::new(invoker),
        config.function_name.as_str(),
    ));

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!(
        "Listening on {}, relaying to {}",
        config.bind_addr, config.function_name
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Front end stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C, running until killed: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
