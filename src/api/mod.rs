//! HTTP API for campaign submission and history.
//!
//! ## Endpoints
//!
//! - `POST /campaigns` - Generate a campaign (runs the agent inline)
//! - `GET /campaigns?limit=N` - Recent campaigns, newest first
//! - `GET /campaigns/latest?status=` - Most recent campaign
//! - `GET /health` - Health check

pub mod campaign_store;
mod campaigns;
pub mod error;
mod routes;
pub mod types;

pub use error::ApiError;
pub use routes::{router, serve, AppState};
