//! Error types for history storage operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{put_item::PutItemError, query::QueryError};
use thiserror::Error;

/// Result type for history storage operations
pub type HistoryStorageResult<T> = Result<T, HistoryStorageError>;

/// Errors that can occur during history storage operations
#[derive(Error, Debug)]
pub enum HistoryStorageError {
    /// Failed to insert record into Dynamo DB
    #[error("Failed to insert history record into DynamoDB: {0}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to query records from Dynamo DB
    #[error("Failed to query history records from DynamoDB: {0}")]
    DynamoDbQueryError(#[from] SdkError<QueryError>),

    /// Failed to parse record from Dynamo DB item
    #[error("Failed to parse history record: {0}")]
    ParseRecordError(String),

    /// Serialization error for serde_dynamo
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Dynamo DB keys cannot be empty strings
    #[error("History record has no owner email")]
    MissingOwner,
}
