//! Application state management

use std::sync::Arc;

use history_storage::HistoryStorage;

use crate::{mailer::MailNotifier, upload_recorder::UploadRecorder};

/// Components shared across handlers, built once at startup
#[derive(Clone)]
pub struct AppState {
    /// OTP email sender
    pub mail_notifier: Arc<MailNotifier>,
    /// Image upload + history append
    pub upload_recorder: Arc<UploadRecorder>,
    /// History reads
    pub history_storage: Arc<dyn HistoryStorage>,
}
