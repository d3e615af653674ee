//! Custom extractors for request validation

use aide::operation::OperationInput;
use aide::OperationOutput;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Multipart, Request},
    Json,
};
use schemars::JsonSchema;
use validator::Validate;

use crate::{
    types::error::AppError,
    upload_recorder::{ImageUpload, UploadedImage},
};

/// Custom JSON extractor that validates the payload
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate + JsonSchema,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // First extract JSON
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| match err {
                JsonRejection::MissingJsonContentType(_) => AppError::bad_request(
                    "invalid_content_type",
                    "Missing Content-Type: application/json header",
                ),
                _ => AppError::bad_request("invalid_json", "Invalid JSON payload"),
            })?;

        // Then validate
        payload.validate().map_err(|errors| {
            // Surface the first field's custom message
            errors
                .field_errors()
                .values()
                .find_map(|field_errors| field_errors.first()?.message.clone())
                .map_or_else(
                    || AppError::bad_request("validation_error", "Request validation failed"),
                    |message| AppError::bad_request("validation_error", message),
                )
        })?;

        Ok(Self(payload))
    }
}

impl<T> OperationInput for ValidatedJson<T>
where
    T: JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        // Delegate to Json<T>'s implementation since ValidatedJson has the same structure
        Json::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AppError::inferred_responses(ctx, operation)
    }
}

/// Multipart extractor that collects an image upload form
///
/// Reads the `image` file part and the `email`, `digit`, `confidence` and
/// `explanation` text parts; other parts are ignored. An `image` part with no
/// bytes counts as absent.
pub struct UploadForm(pub ImageUpload);

impl<S> FromRequest<S> for UploadForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state).await.map_err(|err| {
            tracing::warn!("Multipart rejection: {err}");
            AppError::bad_request("invalid_content_type", "Expected a multipart/form-data body")
        })?;

        let mut upload = ImageUpload::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(ToString::to_string) else {
                continue;
            };

            match name.as_str() {
                "image" => {
                    let content_type = field.content_type().map(ToString::to_string);
                    let bytes = field.bytes().await?;
                    if !bytes.is_empty() {
                        upload.image = Some(UploadedImage {
                            bytes,
                            content_type,
                        });
                    }
                }
                "email" => upload.email = Some(field.text().await?),
                "digit" => upload.digit = Some(field.text().await?),
                "confidence" => upload.confidence = Some(field.text().await?),
                "explanation" => upload.explanation = Some(field.text().await?),
                other => tracing::debug!("Ignoring multipart field {other}"),
            }
        }

        Ok(Self(upload))
    }
}

impl OperationInput for UploadForm {
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        Multipart::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AppError::inferred_responses(ctx, operation)
    }
}
