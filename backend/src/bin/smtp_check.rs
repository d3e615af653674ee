//! Verifies the configured SMTP relay accepts a connection
//!
//! Exits 0 when the relay answers, 1 otherwise.

use std::process::ExitCode;

use backend::mailer::{MailTransport, SmtpConfig, SmtpMailTransport};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let config = SmtpConfig::from_env()?;
    tracing::info!("Using SMTP host: {}:{}", config.host, config.port);
    tracing::info!(
        "Using SMTP user: {}",
        config.masked_user().unwrap_or_else(|| "<none>".to_string())
    );

    let transport = SmtpMailTransport::new(&config)?;
    match transport.verify().await {
        Ok(()) => {
            tracing::info!("SMTP verified ok");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!("verify error: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
