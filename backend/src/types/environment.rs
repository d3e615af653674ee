//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, Region};

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development {
        /// Optional override for the `LocalStack` endpoint
        aws_endpoint_override: Option<String>,
    },
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development {
                aws_endpoint_override: env::var("AWS_ENDPOINT_URL")
                    .ok()
                    .filter(|url| !url.trim().is_empty()),
            },
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the S3 bucket name for the environment
    ///
    /// `AWS_BUCKET_NAME` is accepted as a fallback for `S3_BUCKET_NAME`.
    ///
    /// # Panics
    ///
    /// Panics in production/staging if neither variable is set
    #[must_use]
    pub fn s3_bucket(&self) -> String {
        let bucket = env::var("S3_BUCKET_NAME").or_else(|_| env::var("AWS_BUCKET_NAME"));
        match self {
            Self::Production | Self::Staging => {
                bucket.expect("S3_BUCKET_NAME environment variable is not set")
            }
            Self::Development { .. } => bucket.unwrap_or_else(|_| "digitlens-history".to_string()),
        }
    }

    /// Returns the AWS region for the environment
    ///
    /// # Panics
    ///
    /// Panics in production/staging if `AWS_REGION` is not set
    #[must_use]
    pub fn aws_region(&self) -> String {
        let region = env::var("AWS_REGION");
        match self {
            Self::Production | Self::Staging => {
                region.expect("AWS_REGION environment variable is not set")
            }
            Self::Development { .. } => region.unwrap_or_else(|_| "us-east-1".to_string()),
        }
    }

    /// Dynamo DB table for upload history, in-memory history when unset
    #[must_use]
    pub fn history_table_name(&self) -> Option<String> {
        env::var("HISTORY_TABLE_NAME")
            .ok()
            .filter(|name| !name.trim().is_empty())
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development { .. } | Self::Staging)
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development {
                aws_endpoint_override,
            } => Some(
                aws_endpoint_override
                    .as_deref()
                    .unwrap_or(LOCALSTACK_ENDPOINT),
            ),
        }
    }

    /// Base URL that object keys are appended to when building public links
    #[must_use]
    pub fn public_object_base_url(&self) -> String {
        let bucket = self.s3_bucket();
        self.override_aws_endpoint_url().map_or_else(
            || format!("https://{bucket}.s3.{}.amazonaws.com", self.aws_region()),
            |endpoint| format!("{}/{bucket}", endpoint.trim_end_matches('/')),
        )
    }

    /// Upper bound on how long a single request may take
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        let secs = env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// AWS configuration with timeout settings
    ///
    /// SDK retries are disabled; a failed upload surfaces to the caller as-is.
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.aws_region()))
            .load()
            .await
            .to_builder()
            .retry_config(RetryConfig::disabled())
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // Override "force path style" to true for compatibility with LocalStack
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self, Self::Development { .. }) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }
}
