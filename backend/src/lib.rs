//! DigitLens Backend service
//!
//! Emails one-time passwords and stores digit-recognition uploads in S3 with a
//! per-user history.

#![deny(clippy::all, missing_docs)]

/// OTP email delivery
pub mod mailer;

/// S3 image storage
pub mod media_storage;

/// HTTP routes
#[allow(missing_docs)]
pub mod routes;

/// HTTP server
pub mod server;

/// Application state
pub mod state;

/// Configuration, errors and extractors
pub mod types;

/// Upload recording
pub mod upload_recorder;
