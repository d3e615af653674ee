//! SMTP relay transport

use std::env;

use async_trait::async_trait;
use lettre::{
    transport::smtp::authentication::Credentials, AsyncSmtpTransport, AsyncTransport, Message,
    Tokio1Executor,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use super::{MailError, MailResult, MailTransport};

const DEFAULT_SMTP_HOST: &str = "smtp-relay.brevo.com";
const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP relay settings, read once at startup
#[derive(Debug)]
pub struct SmtpConfig {
    /// Relay host name
    pub host: String,
    /// Relay port
    pub port: u16,
    /// Implicit TLS when true, STARTTLS otherwise
    pub secure: bool,
    /// Login user, if the relay requires authentication
    pub user: Option<String>,
    /// Login password or API key
    pub password: Option<SecretString>,
    /// Sender address used in the `From` header
    pub from: String,
}

impl SmtpConfig {
    /// Reads SMTP settings from the environment
    ///
    /// The sender is taken from `EMAIL_FROM`, falling back to `EMAIL_USER`, then `SMTP_USER`.
    ///
    /// # Errors
    ///
    /// Returns `MailError::ConfigError` if `SMTP_PORT` is not a port number or no sender is set
    pub fn from_env() -> MailResult<Self> {
        let host = non_empty_var("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());

        let port = match non_empty_var("SMTP_PORT") {
            Some(port) => port
                .parse::<u16>()
                .map_err(|e| MailError::ConfigError(format!("Invalid SMTP_PORT {port}: {e}")))?,
            None => DEFAULT_SMTP_PORT,
        };

        let secure = non_empty_var("SMTP_SECURE")
            .is_some_and(|val| matches!(val.to_lowercase().as_str(), "true" | "1"));

        let user = non_empty_var("SMTP_USER").or_else(|| non_empty_var("EMAIL_USER"));
        let password = non_empty_var("SMTP_PASS")
            .or_else(|| non_empty_var("EMAIL_PASS"))
            .map(SecretString::from);

        let from = non_empty_var("EMAIL_FROM")
            .or_else(|| non_empty_var("EMAIL_USER"))
            .or_else(|| user.clone())
            .ok_or_else(|| {
                MailError::ConfigError("EMAIL_FROM environment variable is not set".to_string())
            })?;

        Ok(Self {
            host,
            port,
            secure,
            user,
            password,
            from,
        })
    }

    /// Login user with all but the last two characters masked, for logs
    #[must_use]
    pub fn masked_user(&self) -> Option<String> {
        self.user.as_ref().map(|user| {
            let visible = user.chars().count().saturating_sub(2);
            user.chars()
                .enumerate()
                .map(|(i, c)| if i < visible { '*' } else { c })
                .collect()
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|val| !val.trim().is_empty())
}

/// Mail transport that relays through an SMTP server
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpMailTransport {
    /// Creates a transport for the configured relay
    ///
    /// # Errors
    ///
    /// Returns `MailError::ConfigError` if the TLS parameters for the host cannot be built
    pub fn new(config: &SmtpConfig) -> MailResult<Self> {
        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| MailError::ConfigError(format!("Invalid SMTP relay {}: {e}", config.host)))?;

        let mut builder = builder.port(config.port);
        if let (Some(user), Some(password)) = (&config.user, &config.password) {
            builder = builder.credentials(Credentials::new(
                user.clone(),
                password.expose_secret().to_string(),
            ));
        }

        info!(
            "Initialized SMTP transport for {}:{} (implicit TLS: {})",
            config.host, config.port, config.secure
        );

        Ok(Self {
            transport: builder.build(),
            host: config.host.clone(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn deliver(&self, message: Message) -> MailResult<String> {
        let response = self.transport.send(message).await?;
        let reply = response.message().collect::<Vec<_>>().join(" ");

        debug!("SMTP relay {} replied {}: {}", self.host, response.code(), reply);

        Ok(reply)
    }

    async fn verify(&self) -> MailResult<()> {
        if self.transport.test_connection().await? {
            Ok(())
        } else {
            Err(MailError::DeliveryError(format!(
                "SMTP relay {} refused the connection check",
                self.host
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_vars() {
        for var in [
            "SMTP_HOST",
            "SMTP_PORT",
            "SMTP_SECURE",
            "SMTP_USER",
            "SMTP_PASS",
            "EMAIL_USER",
            "EMAIL_PASS",
            "EMAIL_FROM",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_smtp_config_defaults() {
        clear_vars();
        env::set_var("SMTP_USER", "relay-login");
        env::set_var("SMTP_PASS", "relay-key");

        let config = SmtpConfig::from_env().unwrap();

        assert_eq!(config.host, "smtp-relay.brevo.com");
        assert_eq!(config.port, 587);
        assert!(!config.secure);
        assert_eq!(config.user.as_deref(), Some("relay-login"));
        assert_eq!(config.password.as_ref().unwrap().expose_secret(), "relay-key");
        assert_eq!(config.from, "relay-login");

        clear_vars();
    }

    #[test]
    #[serial]
    fn test_smtp_config_overrides() {
        clear_vars();
        env::set_var("SMTP_HOST", "mail.example.com");
        env::set_var("SMTP_PORT", "465");
        env::set_var("SMTP_SECURE", "TRUE");
        env::set_var("EMAIL_USER", "sender@example.com");
        env::set_var("EMAIL_FROM", "DigitLens <no-reply@example.com>");

        let config = SmtpConfig::from_env().unwrap();

        assert_eq!(config.host, "mail.example.com");
        assert_eq!(config.port, 465);
        assert!(config.secure);
        assert_eq!(config.user.as_deref(), Some("sender@example.com"));
        assert!(config.password.is_none());
        assert_eq!(config.from, "DigitLens <no-reply@example.com>");

        clear_vars();
    }

    #[test]
    #[serial]
    fn test_smtp_config_rejects_bad_port_and_missing_sender() {
        clear_vars();
        env::set_var("EMAIL_FROM", "no-reply@example.com");
        env::set_var("SMTP_PORT", "not-a-port");
        assert!(matches!(
            SmtpConfig::from_env(),
            Err(MailError::ConfigError(_))
        ));

        clear_vars();
        assert!(matches!(
            SmtpConfig::from_env(),
            Err(MailError::ConfigError(_))
        ));
    }

    #[test]
    #[serial]
    fn test_masked_user_keeps_last_two_characters() {
        clear_vars();
        env::set_var("SMTP_USER", "login@x.io");

        let config = SmtpConfig::from_env().unwrap();
        assert_eq!(config.masked_user().as_deref(), Some("********io"));

        clear_vars();
    }
}
