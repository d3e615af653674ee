//! Stores uploaded images and records them in the upload history

mod error;

use std::sync::Arc;

use axum::body::Bytes;
use chrono::Utc;
use history_storage::{HistoryRecord, HistoryStorage};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::media_storage::{MediaStorage, ObjectStorage, DEFAULT_CONTENT_TYPE};

pub use error::{RecorderError, RecorderResult};

/// Image payload of an upload
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Raw image bytes
    pub bytes: Bytes,
    /// Content type declared by the client
    pub content_type: Option<String>,
}

/// An upload as received from the client; every part is optional on the wire
#[derive(Debug, Clone, Default)]
pub struct ImageUpload {
    /// The image itself
    pub image: Option<UploadedImage>,
    /// Uploader email, the history owner
    pub email: Option<String>,
    /// Recognised digit
    pub digit: Option<String>,
    /// Recognition confidence
    pub confidence: Option<String>,
    /// Free-form explanation
    pub explanation: Option<String>,
}

/// Uploads images to object storage and appends them to the history
pub struct UploadRecorder {
    object_storage: Arc<dyn ObjectStorage>,
    history_storage: Arc<dyn HistoryStorage>,
}

impl UploadRecorder {
    /// Creates a recorder over the given stores
    #[must_use]
    pub fn new(
        object_storage: Arc<dyn ObjectStorage>,
        history_storage: Arc<dyn HistoryStorage>,
    ) -> Self {
        Self {
            object_storage,
            history_storage,
        }
    }

    /// Uploads the image and appends a history record pointing at it
    ///
    /// # Errors
    ///
    /// - `RecorderError::MissingImage` if there is no image; storage is not contacted
    /// - `RecorderError::MissingOwner` if the history store cannot hold a record
    ///   for the given email; storage is not contacted
    /// - `RecorderError::Storage` if the upload fails; nothing is recorded
    /// - `RecorderError::History` if the record cannot be appended
    #[instrument(skip(self, upload), fields(email = ?upload.email))]
    pub async fn record(&self, upload: ImageUpload) -> RecorderResult<HistoryRecord> {
        let ImageUpload {
            image,
            email,
            digit,
            confidence,
            explanation,
        } = upload;

        let image = image.ok_or(RecorderError::MissingImage)?;
        let user_email = email.unwrap_or_default();
        if !self.history_storage.accepts_owner(&user_email) {
            return Err(RecorderError::MissingOwner);
        }

        let s3_key = MediaStorage::map_email_to_s3_key(
            &user_email,
            Utc::now().timestamp_millis(),
            Uuid::new_v4(),
        );
        let content_type = image
            .content_type
            .as_deref()
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        self.object_storage
            .put_object(&s3_key, image.bytes, content_type)
            .await?;

        let record = HistoryRecord::new(
            user_email,
            self.object_storage.object_url(&s3_key),
            digit,
            confidence,
            explanation,
        );
        self.history_storage.append(record.clone()).await?;

        info!("Recorded upload {} at {}", record.id, s3_key);
        Ok(record)
    }
}
