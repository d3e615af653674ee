//! History storage for DigitLens uploads
//!
//! Holds the metadata of every uploaded image, keyed by the uploader's email.
//! The in-memory store is the default; the Dynamo DB store persists records
//! across restarts.

mod dynamo;
mod error;
mod memory;

use async_trait::async_trait;
use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use dynamo::{DynamoHistoryStorage, HistoryAttribute};
pub use error::{HistoryStorageError, HistoryStorageResult};
pub use memory::InMemoryHistoryStorage;

/// A single stored upload: caller metadata plus a pointer to the stored image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// Unique record identifier
    pub id: String,
    /// Email the record was uploaded under, matched exactly on reads
    pub user_email: String,
    /// Creation time in milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Public URL of the uploaded image
    pub image_data: String,
    /// Caller-supplied digit, stored verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digit: Option<String>,
    /// Caller-supplied confidence, stored verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    /// Caller-supplied explanation, stored verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl HistoryRecord {
    /// Creates a record with a fresh id, stamped with the current time
    #[must_use]
    pub fn new(
        user_email: String,
        image_data: String,
        digit: Option<String>,
        confidence: Option<String>,
        explanation: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_email,
            timestamp: Utc::now().timestamp_millis(),
            image_data,
            digit,
            confidence,
            explanation,
        }
    }
}

/// Append-only store of history records
#[async_trait]
pub trait HistoryStorage: Send + Sync {
    /// Appends a record. Records are never updated or removed.
    ///
    /// # Errors
    ///
    /// Returns `HistoryStorageError` if the backing store rejects the write
    async fn append(&self, record: HistoryRecord) -> HistoryStorageResult<()>;

    /// Whether records can be stored under `user_email`
    ///
    /// Callers check this before doing work that `append` would strand.
    fn accepts_owner(&self, _user_email: &str) -> bool {
        true
    }

    /// Returns every record owned by `user_email`, most recent first
    ///
    /// Records sharing a timestamp come back with the later-appended one first.
    ///
    /// # Errors
    ///
    /// Returns `HistoryStorageError` if the backing store cannot be read
    async fn query_by_owner(&self, user_email: &str) -> HistoryStorageResult<Vec<HistoryRecord>>;
}
