//! Campaign Agent - HTTP Server Entry Point
//!
//! Starts the HTTP server that exposes the campaign API.

use campaign_agent::{api, config::Config};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    campaign_agent::init_tracing();

    // Missing credential is fatal here
    let config = Config::from_env()?;
    info!(
        "Loaded configuration: model={}, temperature={}",
        config.llm.model, config.llm.temperature
    );

    info!("Starting server on {}:{}", config.host, config.port);
    api::serve(config).await?;

    Ok(())
}
