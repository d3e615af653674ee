use std::sync::Arc;

use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::{
    mailer::MailNotifier,
    types::{AppError, ValidatedJson},
};

const REQUIRED_MESSAGE: &str = "Email and OTP are required";

#[derive(Debug, Deserialize, Validate, JsonSchema)]
pub struct SendOtpRequest {
    /// Recipient address
    #[validate(length(min = 1, message = "Email and OTP are required"))]
    #[serde(default)]
    pub email: Option<String>,
    /// Code to deliver, as a string or number
    #[validate(length(min = 1, message = "Email and OTP are required"))]
    #[serde(default, deserialize_with = "string_or_number")]
    #[schemars(with = "Option<String>")]
    pub otp: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MessageResponse {
    /// Human-readable acknowledgment
    pub message: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    }))
}

/// Emails a one-time password
///
/// Sends one message per call through the configured SMTP relay. There is no
/// rate limiting; every call results in a send.
///
/// # Errors
///
/// - 400 if `email` or `otp` is missing, or `email` is not a valid address
/// - 500 if the relay fails; the cause is only logged
#[instrument(skip(mail_notifier, payload))]
pub async fn send_otp(
    Extension(mail_notifier): Extension<Arc<MailNotifier>>,
    ValidatedJson(payload): ValidatedJson<SendOtpRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let (Some(email), Some(otp)) = (payload.email, payload.otp) else {
        return Err(AppError::bad_request("validation_error", REQUIRED_MESSAGE));
    };

    mail_notifier.send_otp(&email, &otp).await?;

    Ok(Json(MessageResponse {
        message: "OTP sent successfully".to_string(),
    }))
}
