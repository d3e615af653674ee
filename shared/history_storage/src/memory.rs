//! Process-lifetime history storage

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{HistoryRecord, HistoryStorage, HistoryStorageResult};

/// In-memory history store
///
/// Nothing survives a restart. Reads scan every record.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStorage {
    records: RwLock<Vec<HistoryRecord>>,
}

impl InMemoryHistoryStorage {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all owners
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether no record has been appended yet
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl HistoryStorage for InMemoryHistoryStorage {
    async fn append(&self, record: HistoryRecord) -> HistoryStorageResult<()> {
        self.records.write().await.push(record);
        Ok(())
    }

    async fn query_by_owner(&self, user_email: &str) -> HistoryStorageResult<Vec<HistoryRecord>> {
        let records = self.records.read().await;

        // Newest appends first, so the stable sort keeps them ahead on timestamp ties
        let mut owned: Vec<HistoryRecord> = records
            .iter()
            .rev()
            .filter(|record| record.user_email == user_email)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(owned)
    }
}
