//! # Campaign Agent
//!
//! Generates a social media campaign (tweet thread, LinkedIn post, Instagram
//! caption) with an LLM and "publishes" each piece through remote tools.
//!
//! This library provides:
//! - An HTTP API for campaign submission and history
//! - A tool-calling agent loop driving an OpenAI-compatible LLM
//! - A JSON-RPC tool server exposing the simulated publishing tools
//! - A JSON file campaign store
//!
//! ## Architecture
//!
//! The agent follows the "tools in a loop" pattern:
//! 1. Receive a campaign request via the API
//! 2. Discover the publishing tools from the tool server
//! 3. Call the LLM, execute the tool calls it requests, feed results back
//! 4. Stop when the LLM answers without tool calls; persist the outcome
//!
//! ## Example
//!
//! ```rust,ignore
//! use campaign_agent::{agent::CampaignAgent, config::Config};
//!
//! let config = Config::from_env()?;
//! let agent = CampaignAgent::from_config(&config);
//! let result = agent.generate_campaign("Zapatillas EcoRun", "corredores urbanos").await?;
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod llm;
pub mod mcp;
pub mod tools;

pub use config::Config;

/// Install the `tracing` subscriber used by all binaries.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campaign_agent=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
