//! In-memory campaign store (non-persistent).

use super::{
    find_mut, latest_of, newest_first, CampaignRecord, CampaignStatus, CampaignStore, StoreError,
};
use crate::agent::CampaignResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct InMemoryCampaignStore {
    records: Arc<RwLock<Vec<CampaignRecord>>>,
}

impl InMemoryCampaignStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CampaignStore for InMemoryCampaignStore {
    async fn create_pending(
        &self,
        producto: &str,
        publico_objetivo: &str,
    ) -> Result<CampaignRecord, StoreError> {
        let record = CampaignRecord::pending(producto, publico_objetivo);
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        result: CampaignResult,
    ) -> Result<CampaignRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = find_mut(&mut records, id)?;
        record.complete(result);
        Ok(record.clone())
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<CampaignRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = find_mut(&mut records, id)?;
        record.fail(error);
        Ok(record.clone())
    }

    async fn list(&self, limit: usize) -> Result<Vec<CampaignRecord>, StoreError> {
        Ok(newest_first(&self.records.read().await, limit))
    }

    async fn latest(
        &self,
        status: Option<CampaignStatus>,
    ) -> Result<Option<CampaignRecord>, StoreError> {
        Ok(latest_of(&self.records.read().await, status))
    }

    async fn get(&self, id: Uuid) -> Result<CampaignRecord, StoreError> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_record_keeps_error_and_no_result() {
        let store = InMemoryCampaignStore::new();
        let record = store.create_pending("Zapatillas", "corredores").await.unwrap();

        store.mark_failed(record.id, "boom").await.unwrap();

        let stored = store.get(record.id).await.unwrap();
        assert_eq!(stored.status, CampaignStatus::Failed);
        assert_eq!(stored.error.as_deref(), Some("boom"));
        assert!(stored.result.is_none());
        assert!(stored.updated_at >= stored.created_at);
    }

    #[tokio::test]
    async fn failing_a_completed_record_drops_its_result() {
        let store = InMemoryCampaignStore::new();
        let record = store.create_pending("Zapatillas", "corredores").await.unwrap();

        let mut result = CampaignResult::new("Zapatillas", "corredores");
        result.tweets.push("Corre más lejos".to_string());
        store.mark_completed(record.id, result).await.unwrap();
        store.mark_failed(record.id, "boom").await.unwrap();

        let stored = store.get(record.id).await.unwrap();
        assert_eq!(stored.status, CampaignStatus::Failed);
        assert!(stored.result.is_none());
        assert_eq!(stored.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let store = InMemoryCampaignStore::new();
        let id = Uuid::new_v4();
        assert!(matches!(store.get(id).await, Err(StoreError::NotFound(missing)) if missing == id));
        assert!(matches!(
            store.mark_failed(id, "x").await,
            Err(StoreError::NotFound(_))
        ));
    }
}
