//! Router assembly and server bootstrap.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::campaign_store::{CampaignStore, JsonFileCampaignStore};
use super::campaigns;
use crate::agent::CampaignAgent;
use crate::config::Config;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CampaignStore>,
    pub agent: Arc<CampaignAgent>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/campaigns",
            post(campaigns::create_campaign).get(campaigns::list_campaigns),
        )
        .route("/campaigns/latest", get(campaigns::latest_campaign))
        .route("/health", get(campaigns::health))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = JsonFileCampaignStore::open(config.campaigns_path.clone()).await;
    let agent = CampaignAgent::from_config(&config);

    tracing::info!(
        store = %store.path().display(),
        tools = %config.mcp_server_url,
        max_iterations = config.max_iterations,
        "Campaign API ready"
    );

    let state = AppState {
        store: Arc::new(store),
        agent: Arc::new(agent),
    };

    let app = router(state)
        .layer(cors_layer(&config.cors_allow_origins))
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
