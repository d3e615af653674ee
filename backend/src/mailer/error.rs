//! Error types for mail operations

use thiserror::Error;

/// Result type for mail operations
pub type MailResult<T> = Result<T, MailError>;

/// Errors that can occur while sending mail
#[derive(Error, Debug)]
pub enum MailError {
    /// A required input was absent or blank
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Recipient could not be parsed as a mailbox
    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    /// Message could not be assembled
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// SMTP relay rejected or failed the transaction
    #[error("SMTP delivery failed: {0}")]
    DeliveryError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<lettre::transport::smtp::Error> for MailError {
    fn from(error: lettre::transport::smtp::Error) -> Self {
        Self::DeliveryError(error.to_string())
    }
}
