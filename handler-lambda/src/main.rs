use std::env;
use std::sync::Arc;

use anyhow::Context;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use readout_core::config::load_handler_config;
use readout_core::telemetry::init_tracing;
use readout_core::{MySqlMessageDatabase, PageRenderer, PageResponse, S3ObjectStore};
use serde_json::Value;
use tracing::info;

/// The incoming event is ignored; every invocation renders the same page.
async fn lambda_handler(
    renderer: &PageRenderer,
    event: LambdaEvent<Value>,
) -> Result<PageResponse, Error> {
    info!(
        "Invocation {} reading {}",
        event.context.request_id,
        renderer.location().uri()
    );
    Ok(renderer.render().await?)
}

/// Clients and configuration are resolved once, before the first invocation.
async fn build_renderer() -> anyhow::Result<PageRenderer> {
    let config_path = env::var("READOUT_CONFIG").ok();
    let config = load_handler_config(config_path.as_deref())
        .await
        .context("Failed to load configuration")?;
    info!("Loaded configuration: {:?}", config);

    let store = S3ObjectStore::from_env().await;
    let database = MySqlMessageDatabase::new(&config.database);

    Ok(PageRenderer::new(
        Arc::new(store),
        Arc::new(database),
        config.object,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing("bootstrap=info,readout_core=info");

    let renderer = build_renderer().await?;

    if env::var("AWS_LAMBDA_RUNTIME_API").is_ok() {
        info!("Running in AWS Lambda environment");
        let renderer = &renderer;
        lambda_runtime::run(service_fn(move |event| lambda_handler(renderer, event))).await
    } else {
        info!("Running in local development mode");
        let response = renderer.render().await?;
        println!("{}", serde_json::to_string_pretty(&response)?);
        Ok(())
    }
}
