//! History storage backed by Dynamo DB
//!
//! Table layout: `user_email` (partition key) + `sort_key` (sort key), where the
//! sort key is the zero-padded timestamp, a zero-padded append sequence and the
//! record id, so that lexicographic order is append order within a timestamp.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use async_trait::async_trait;
use aws_sdk_dynamodb::{types::AttributeValue, Client as DynamoDbClient};
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::debug;

use crate::{HistoryRecord, HistoryStorage, HistoryStorageError, HistoryStorageResult};

/// Attribute names for the history table
#[derive(Debug, Clone, Display)]
#[strum(serialize_all = "snake_case")]
pub enum HistoryAttribute {
    /// Owner email (Primary Key)
    UserEmail,
    /// `{timestamp:020}#{sequence:020}#{id}` (Sort Key)
    SortKey,
}

/// Row stored in the history table
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryItem {
    user_email: String,
    sort_key: String,
    id: String,
    timestamp: i64,
    image_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    digit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
}

fn sort_key(timestamp: i64, sequence: u64, id: &str) -> String {
    format!("{timestamp:020}#{sequence:020}#{id}")
}

impl HistoryItem {
    fn new(record: HistoryRecord, sequence: u64) -> Self {
        Self {
            sort_key: sort_key(record.timestamp, sequence, &record.id),
            user_email: record.user_email,
            id: record.id,
            timestamp: record.timestamp,
            image_data: record.image_data,
            digit: record.digit,
            confidence: record.confidence,
            explanation: record.explanation,
        }
    }
}

impl From<HistoryItem> for HistoryRecord {
    fn from(item: HistoryItem) -> Self {
        Self {
            id: item.id,
            user_email: item.user_email,
            timestamp: item.timestamp,
            image_data: item.image_data,
            digit: item.digit,
            confidence: item.confidence,
            explanation: item.explanation,
        }
    }
}

/// History storage client for Dynamo DB operations
pub struct DynamoHistoryStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
    sequence: AtomicU64,
}

impl DynamoHistoryStorage {
    /// Creates a new history storage client
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured Dynamo DB client
    /// * `table_name` - Dynamo DB table name for history records
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>, table_name: String) -> Self {
        Self {
            dynamodb_client,
            table_name,
            sequence: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl HistoryStorage for DynamoHistoryStorage {
    fn accepts_owner(&self, user_email: &str) -> bool {
        // Empty strings are not valid key values
        !user_email.is_empty()
    }

    async fn append(&self, record: HistoryRecord) -> HistoryStorageResult<()> {
        if !self.accepts_owner(&record.user_email) {
            return Err(HistoryStorageError::MissingOwner);
        }

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let item = serde_dynamo::to_item(HistoryItem::new(record, sequence))
            .map_err(|e| HistoryStorageError::SerializationError(e.to_string()))?;

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await?;

        Ok(())
    }

    async fn query_by_owner(&self, user_email: &str) -> HistoryStorageResult<Vec<HistoryRecord>> {
        // Empty strings are not valid key values; nothing can be stored under one
        if user_email.is_empty() {
            return Ok(Vec::new());
        }

        let items = self
            .dynamodb_client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("#user_email = :user_email")
            .expression_attribute_names("#user_email", HistoryAttribute::UserEmail.to_string())
            .expression_attribute_values(":user_email", AttributeValue::S(user_email.to_string()))
            .scan_index_forward(false)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await?;

        debug!("Fetched {} history items", items.len());

        items
            .into_iter()
            .map(|item| {
                let item: HistoryItem = serde_dynamo::from_item(item)
                    .map_err(|e| HistoryStorageError::ParseRecordError(e.to_string()))?;
                Ok(HistoryRecord::from(item))
            })
            .collect()
    }
}
