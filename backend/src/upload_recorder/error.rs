//! Error types for recording uploads

use history_storage::HistoryStorageError;
use thiserror::Error;

use crate::media_storage::BucketError;

/// Result type for upload recording
pub type RecorderResult<T> = Result<T, RecorderError>;

/// Errors that can occur while recording an upload
#[derive(Error, Debug)]
pub enum RecorderError {
    /// No image payload was supplied
    #[error("No image file provided")]
    MissingImage,

    /// The history store cannot hold a record without an owner email
    #[error("Email is required")]
    MissingOwner,

    /// Uploading the image failed
    #[error(transparent)]
    Storage(#[from] BucketError),

    /// Appending the history record failed
    #[error(transparent)]
    History(#[from] HistoryStorageError),
}
