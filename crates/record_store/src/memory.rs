use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use shared::domain::{RecordId, RsvpRecord};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{RecordStore, RecordStoreError, Result};

#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<(RecordId, RsvpRecord)>>>,
    rejected_names: Arc<HashSet<String>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every record whose guest name is in `names`.
    pub fn rejecting(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            rejected_names: Arc::new(names.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub async fn records(&self) -> Vec<(RecordId, RsvpRecord)> {
        self.records.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create_record(&self, record: &RsvpRecord) -> Result<RecordId> {
        if self.unavailable {
            return Err(RecordStoreError::Unavailable("memory store offline".into()));
        }
        if self.rejected_names.contains(&record.name) {
            return Err(RecordStoreError::Rejected {
                status: 400,
                message: format!("record for '{}' was rejected", record.name),
            });
        }

        let id = RecordId(Uuid::new_v4().to_string());
        self.records.lock().await.push((id.clone(), record.clone()));
        Ok(id)
    }

    async fn check_access(&self) -> Result<()> {
        if self.unavailable {
            return Err(RecordStoreError::Unavailable("memory store offline".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/memory_tests.rs"]
mod tests;
