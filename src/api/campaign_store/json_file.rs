//! Campaign store persisted as a single JSON document.
//!
//! The whole collection is rewritten on every mutation while the store's
//! mutex is held, so concurrent requests never interleave file writes.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    find_mut, latest_of, newest_first, CampaignRecord, CampaignStatus, CampaignStore, StoreError,
};
use crate::agent::CampaignResult;

#[derive(Debug)]
pub struct JsonFileCampaignStore {
    path: PathBuf,
    records: Mutex<Vec<CampaignRecord>>,
}

impl JsonFileCampaignStore {
    /// Open the store at `path`.
    ///
    /// A missing file starts an empty store. An unreadable or unparsable file
    /// is left untouched and also yields an empty store; the next mutation
    /// overwrites it.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = Self::load(&path).await;
        Self {
            path,
            records: Mutex::new(records),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(path: &Path) -> Vec<CampaignRecord> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    "No campaign store found at {}, starting empty",
                    path.display()
                );
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to read campaign store {}: {}, starting empty",
                    path.display(),
                    e
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<CampaignRecord>>(&contents) {
            Ok(records) => {
                tracing::info!(
                    "Loaded {} campaigns from {}",
                    records.len(),
                    path.display()
                );
                records
            }
            Err(e) => {
                tracing::warn!(
                    "Campaign store {} is corrupt ({}), starting empty",
                    path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Rewrite the whole file. Callers hold the records lock.
    async fn persist(&self, records: &[CampaignRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_string_pretty(records)?;

        let mut tmp: OsString = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(
            "Saved {} campaigns to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[async_trait]
impl CampaignStore for JsonFileCampaignStore {
    async fn create_pending(
        &self,
        producto: &str,
        publico_objetivo: &str,
    ) -> Result<CampaignRecord, StoreError> {
        let record = CampaignRecord::pending(producto, publico_objetivo);

        let mut records = self.records.lock().await;
        records.push(record.clone());
        if let Err(e) = self.persist(&records).await {
            records.pop();
            return Err(e);
        }
        Ok(record)
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        result: CampaignResult,
    ) -> Result<CampaignRecord, StoreError> {
        let mut records = self.records.lock().await;
        let record = find_mut(&mut records, id)?;
        let previous = record.clone();
        record.complete(result);
        let updated = record.clone();

        if let Err(e) = self.persist(&records).await {
            *find_mut(&mut records, id)? = previous;
            return Err(e);
        }
        Ok(updated)
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<CampaignRecord, StoreError> {
        let mut records = self.records.lock().await;
        let record = find_mut(&mut records, id)?;
        let previous = record.clone();
        record.fail(error);
        let updated = record.clone();

        if let Err(e) = self.persist(&records).await {
            *find_mut(&mut records, id)? = previous;
            return Err(e);
        }
        Ok(updated)
    }

    async fn list(&self, limit: usize) -> Result<Vec<CampaignRecord>, StoreError> {
        Ok(newest_first(&self.records.lock().await, limit))
    }

    async fn latest(
        &self,
        status: Option<CampaignStatus>,
    ) -> Result<Option<CampaignRecord>, StoreError> {
        Ok(latest_of(&self.records.lock().await, status))
    }

    async fn get(&self, id: Uuid) -> Result<CampaignRecord, StoreError> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }
}
