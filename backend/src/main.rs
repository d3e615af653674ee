use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;
use backend::{
    mailer::{MailNotifier, SmtpConfig, SmtpMailTransport},
    media_storage::MediaStorage,
    server,
    state::AppState,
    types::Environment,
    upload_recorder::UploadRecorder,
};
use history_storage::{DynamoHistoryStorage, HistoryStorage, InMemoryHistoryStorage};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env();

    // JSON logs for staging/production, human-readable for development
    if environment.json_logs() {
        fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        fmt().with_env_filter(EnvFilter::from_default_env()).init();
    }

    let smtp_config = SmtpConfig::from_env()?;
    let mail_transport = Arc::new(SmtpMailTransport::new(&smtp_config)?);
    let mail_notifier = Arc::new(MailNotifier::new(mail_transport, &smtp_config.from)?);

    match mail_notifier.verify().await {
        Ok(()) => tracing::info!("SMTP server ready"),
        Err(e) => tracing::error!("SMTP transporter verification failed: {e}"),
    }

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let media_storage = Arc::new(MediaStorage::new(
        s3_client,
        environment.s3_bucket(),
        environment.public_object_base_url(),
    ));

    let history_storage: Arc<dyn HistoryStorage> = match environment.history_table_name() {
        Some(table_name) => {
            tracing::info!("Persisting upload history to DynamoDB table {table_name}");
            let dynamodb_client = Arc::new(DynamoDbClient::new(&environment.aws_config().await));
            Arc::new(DynamoHistoryStorage::new(dynamodb_client, table_name))
        }
        None => {
            tracing::info!("Keeping upload history in memory");
            Arc::new(InMemoryHistoryStorage::new())
        }
    };

    let upload_recorder = Arc::new(UploadRecorder::new(media_storage, history_storage.clone()));

    server::start(
        environment,
        AppState {
            mail_notifier,
            upload_recorder,
            history_storage,
        },
    )
    .await
}
