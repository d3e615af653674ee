//! Universal error handling for the API

use std::borrow::Cow;

use aide::OperationOutput;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use history_storage::HistoryStorageError;
use schemars::JsonSchema;
use serde::Serialize;

use crate::{mailer::MailError, media_storage::BucketError, upload_recorder::RecorderError};

/// API error response envelope
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Human-readable error message
    pub error: Cow<'static, str>,
    /// Machine-readable error code
    pub code: &'static str,
    /// Whether the client should retry the request
    pub allow_retry: bool,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(
        status: StatusCode,
        code: &'static str,
        msg: impl Into<Cow<'static, str>>,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                error: msg.into(),
                code,
                allow_retry: retry,
            },
        }
    }

    /// A 400 for missing or malformed input
    #[must_use]
    pub fn bad_request(code: &'static str, msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, msg, false)
    }

    /// HTTP status of the error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.code,
                self.inner.error
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.code,
                self.inner.error
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert mail errors to application errors
impl From<MailError> for AppError {
    fn from(err: MailError) -> Self {
        match &err {
            MailError::MissingField(field) => {
                tracing::warn!("Missing field: {field}");
                Self::bad_request("validation_error", "Email and OTP are required")
            }
            MailError::InvalidRecipient(msg) => {
                tracing::warn!("Invalid recipient: {msg}");
                Self::bad_request("invalid_email", "Invalid email address")
            }
            MailError::MessageBuild(_)
            | MailError::DeliveryError(_)
            | MailError::ConfigError(_) => {
                tracing::error!("Error sending email: {err}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "delivery_error",
                    "Failed to send email",
                    true,
                )
            }
        }
    }
}

/// Convert bucket errors to application errors
impl From<BucketError> for AppError {
    fn from(err: BucketError) -> Self {
        tracing::error!("S3 upload error: {err}");
        let retry = matches!(
            err,
            BucketError::UpstreamError(_) | BucketError::AwsError(_)
        );
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "storage_error",
            "Failed to upload to S3",
            retry,
        )
    }
}

/// Convert history storage errors to application errors
impl From<HistoryStorageError> for AppError {
    fn from(err: HistoryStorageError) -> Self {
        tracing::error!("History storage error: {err}");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "history_error",
            "Failed to access upload history",
            true,
        )
    }
}

/// Convert upload recording errors to application errors
impl From<RecorderError> for AppError {
    fn from(err: RecorderError) -> Self {
        match err {
            RecorderError::MissingImage => {
                Self::bad_request("validation_error", "No image file provided")
            }
            RecorderError::MissingOwner => {
                Self::bad_request("validation_error", "Email is required")
            }
            RecorderError::Storage(err) => err.into(),
            RecorderError::History(err) => err.into(),
        }
    }
}

/// Convert multipart body errors to application errors
impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        tracing::warn!("Multipart error: {}", err.body_text());
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                "Image exceeds the maximum upload size",
                false,
            )
        } else {
            Self::bad_request("invalid_multipart", "Malformed multipart body")
        }
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}
