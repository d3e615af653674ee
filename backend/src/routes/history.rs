use std::sync::Arc;

use axum::{extract::Query, Extension, Json};
use history_storage::{HistoryRecord, HistoryStorage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    types::{AppError, UploadForm},
    upload_recorder::UploadRecorder,
};

/// Maximum accepted request body, image included
pub const MAX_UPLOAD_SIZE_BYTES: usize = 15 * 1024 * 1024;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct HistoryQuery {
    /// Owner email, matched exactly
    pub email: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct UploadResponse {
    /// Human-readable acknowledgment
    pub message: String,
    /// The stored record
    pub record: HistoryRecord,
}

/// Stores an uploaded image and records it in the uploader's history
///
/// Expects `multipart/form-data` with an `image` file and the text fields
/// `email`, `digit`, `confidence` and `explanation`.
///
/// # Errors
///
/// - 400 if no image is supplied; storage is not contacted
/// - 413 if the body exceeds the upload limit
/// - 500 if the upload or the history append fails
#[instrument(skip(upload_recorder, upload))]
pub async fn upload_history(
    Extension(upload_recorder): Extension<Arc<UploadRecorder>>,
    UploadForm(upload): UploadForm,
) -> Result<Json<UploadResponse>, AppError> {
    let record = upload_recorder.record(upload).await?;

    Ok(Json(UploadResponse {
        message: "Saved to AWS S3".to_string(),
        record,
    }))
}

/// Lists an owner's uploads, most recent first
///
/// An absent `email` yields an empty list.
#[instrument(skip(history_storage))]
pub async fn get_history(
    Extension(history_storage): Extension<Arc<dyn HistoryStorage>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryRecord>>, AppError> {
    let Some(email) = query.email else {
        return Ok(Json(Vec::new()));
    };

    let records = history_storage.query_by_owner(&email).await?;
    tracing::debug!("Found {} history records", records.len());

    Ok(Json(records))
}
