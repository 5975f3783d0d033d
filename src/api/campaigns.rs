//! Campaign endpoints.

use axum::extract::{FromRequest, FromRequestParts, Query, State};
use axum::Json;

use super::campaign_store::CampaignRecord;
use super::error::{ApiError, GENERATION_FAILED};
use super::routes::AppState;
use super::types::{
    CreateCampaignRequest, HealthResponse, LatestCampaignQuery, ListCampaignsQuery,
};

/// `Json` whose rejections are reported as [`ApiError::Validation`].
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Query` whose rejections are reported as [`ApiError::Validation`].
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// POST /campaigns - Generate a campaign synchronously and return its final record.
pub async fn create_campaign(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateCampaignRequest>,
) -> Result<Json<CampaignRecord>, ApiError> {
    let request = payload.validate()?;

    let record = state
        .store
        .create_pending(&request.producto, &request.publico_objetivo)
        .await?;
    tracing::info!(campaign = %record.id, "Campaign requested for {}", record.producto);

    let outcome = match state
        .agent
        .generate_campaign(&record.producto, &record.publico_objetivo)
        .await
    {
        Ok(result) => state
            .store
            .mark_completed(record.id, result)
            .await
            .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    match outcome {
        Ok(completed) => {
            tracing::info!(campaign = %completed.id, "Campaign completed");
            Ok(Json(completed))
        }
        Err(message) => {
            tracing::error!(campaign = %record.id, "Campaign generation failed: {}", message);
            if let Err(e) = state.store.mark_failed(record.id, &message).await {
                tracing::error!(campaign = %record.id, "Failed to record campaign failure: {}", e);
            }
            Err(ApiError::Internal(GENERATION_FAILED.to_string()))
        }
    }
}

/// GET /campaigns?limit=N - Most recent campaigns, newest first.
pub async fn list_campaigns(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListCampaignsQuery>,
) -> Result<Json<Vec<CampaignRecord>>, ApiError> {
    let limit = query.limit()?;
    Ok(Json(state.store.list(limit).await?))
}

/// GET /campaigns/latest?status= - Most recent campaign, optionally by status.
pub async fn latest_campaign(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LatestCampaignQuery>,
) -> Result<Json<CampaignRecord>, ApiError> {
    state
        .store
        .latest(query.status)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No hay campañas disponibles.".to_string()))
}

/// GET /health - Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
