//! API request and response types.

use serde::{Deserialize, Serialize};

use super::campaign_store::CampaignStatus;
use super::error::ApiError;

pub const MIN_FIELD_CHARS: usize = 3;
pub const MAX_FIELD_CHARS: usize = 280;
pub const DEFAULT_LIST_LIMIT: usize = 20;
pub const MAX_LIST_LIMIT: usize = 100;

/// Request to generate a new campaign.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaignRequest {
    /// Product name
    pub producto: String,

    /// Target audience
    pub publico_objetivo: String,
}

/// A validated, trimmed campaign request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignRequest {
    pub producto: String,
    pub publico_objetivo: String,
}

impl CreateCampaignRequest {
    pub fn validate(&self) -> Result<CampaignRequest, ApiError> {
        Ok(CampaignRequest {
            producto: validate_field("producto", &self.producto)?,
            publico_objetivo: validate_field("publico_objetivo", &self.publico_objetivo)?,
        })
    }
}

fn validate_field(name: &str, value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    let chars = trimmed.chars().count();
    if !(MIN_FIELD_CHARS..=MAX_FIELD_CHARS).contains(&chars) {
        return Err(ApiError::Validation(format!(
            "{} must be between {} and {} characters (got {})",
            name, MIN_FIELD_CHARS, MAX_FIELD_CHARS, chars
        )));
    }
    Ok(trimmed.to_string())
}

/// Query for `GET /campaigns`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListCampaignsQuery {
    pub limit: Option<usize>,
}

impl ListCampaignsQuery {
    pub fn limit(&self) -> Result<usize, ApiError> {
        let limit = self.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        if !(1..=MAX_LIST_LIMIT).contains(&limit) {
            return Err(ApiError::Validation(format!(
                "limit must be between 1 and {} (got {})",
                MAX_LIST_LIMIT, limit
            )));
        }
        Ok(limit)
    }
}

/// Query for `GET /campaigns/latest`.
#[derive(Debug, Clone, Deserialize)]
pub struct LatestCampaignQuery {
    pub status: Option<CampaignStatus>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}
