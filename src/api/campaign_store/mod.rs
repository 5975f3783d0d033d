//! Campaign record storage.
//!
//! Records are created `pending` when a request arrives and transition to
//! `completed` or `failed` once the agent run ends. Backends implement
//! [`CampaignStore`]; callers always receive owned copies.

mod json_file;
mod memory;

pub use json_file::JsonFileCampaignStore;
pub use memory::InMemoryCampaignStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::agent::CampaignResult;

/// Lifecycle status of a campaign.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Pending,
    Completed,
    Failed,
}

/// Persisted campaign lifecycle and outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignRecord {
    pub id: Uuid,
    pub producto: String,
    pub publico_objetivo: String,
    pub status: CampaignStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Present iff completed
    #[serde(default)]
    pub result: Option<CampaignResult>,
    /// Present iff failed
    #[serde(default)]
    pub error: Option<String>,
}

impl CampaignRecord {
    pub fn pending(producto: &str, publico_objetivo: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            producto: producto.to_string(),
            publico_objetivo: publico_objetivo.to_string(),
            status: CampaignStatus::Pending,
            created_at: now,
            updated_at: now,
            result: None,
            error: None,
        }
    }

    /// Re-marking an already finished record is allowed and overwrites it,
    /// including the outcome of the previous mark.
    fn complete(&mut self, result: CampaignResult) {
        self.status = CampaignStatus::Completed;
        self.result = Some(result);
        self.error = None;
        self.updated_at = Utc::now();
    }

    fn fail(&mut self, error: &str) {
        self.status = CampaignStatus::Failed;
        self.result = None;
        self.error = Some(error.to_string());
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Campaign {0} not found")]
    NotFound(Uuid),

    #[error("Campaign store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Campaign store serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn create_pending(
        &self,
        producto: &str,
        publico_objetivo: &str,
    ) -> Result<CampaignRecord, StoreError>;

    async fn mark_completed(
        &self,
        id: Uuid,
        result: CampaignResult,
    ) -> Result<CampaignRecord, StoreError>;

    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<CampaignRecord, StoreError>;

    /// Newest first, at most `limit` records.
    async fn list(&self, limit: usize) -> Result<Vec<CampaignRecord>, StoreError>;

    /// Most recently created record, optionally restricted to one status.
    async fn latest(
        &self,
        status: Option<CampaignStatus>,
    ) -> Result<Option<CampaignRecord>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<CampaignRecord, StoreError>;
}

/// Sort by `created_at` descending. The sort is stable, so ties keep insertion order.
fn newest_first(records: &[CampaignRecord], limit: usize) -> Vec<CampaignRecord> {
    let mut ordered: Vec<&CampaignRecord> = records.iter().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    ordered.into_iter().take(limit).cloned().collect()
}

/// On ties the later-inserted record wins.
fn latest_of(records: &[CampaignRecord], status: Option<CampaignStatus>) -> Option<CampaignRecord> {
    records
        .iter()
        .filter(|r| status.map_or(true, |s| r.status == s))
        .max_by_key(|r| r.created_at)
        .cloned()
}

fn find_mut(records: &mut [CampaignRecord], id: Uuid) -> Result<&mut CampaignRecord, StoreError> {
    records
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or(StoreError::NotFound(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record_at(minutes: i64, status: CampaignStatus) -> CampaignRecord {
        let mut record = CampaignRecord::pending("p", "q");
        record.created_at = Utc::now() + Duration::minutes(minutes);
        record.status = status;
        record
    }

    #[test]
    fn newest_first_orders_and_truncates() {
        let records = vec![
            record_at(0, CampaignStatus::Pending),
            record_at(2, CampaignStatus::Pending),
            record_at(1, CampaignStatus::Pending),
        ];
        let listed = newest_first(&records, 2);
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, records[1].id);
        assert_eq!(listed[1].id, records[2].id);
    }

    #[test]
    fn latest_of_breaks_ties_by_insertion() {
        let first = record_at(0, CampaignStatus::Failed);
        let mut second = record_at(0, CampaignStatus::Failed);
        second.created_at = first.created_at;
        let records = vec![first, second.clone()];

        assert_eq!(latest_of(&records, None).map(|r| r.id), Some(second.id));
        assert!(latest_of(&records, Some(CampaignStatus::Completed)).is_none());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&CampaignStatus::Completed).unwrap(),
            "\"completed\""
        );
    }
}
