//! Campaign Tools - tool server entry point.
//!
//! Serves the simulated publishing tools over JSON-RPC at `/mcp`.

use std::sync::Arc;

use campaign_agent::{config::ToolServerConfig, mcp, tools::ToolRegistry};
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    campaign_agent::init_tracing();

    let config = ToolServerConfig::from_env()?;
    let registry = Arc::new(ToolRegistry::campaign());
    for tool in registry.list_tools() {
        info!("Registered tool: {}", tool.name);
    }

    let app = mcp::router(registry).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Tool server listening on http://{}/mcp", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
