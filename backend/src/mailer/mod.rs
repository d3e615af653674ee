//! One-time password delivery over email

mod error;
mod smtp;
mod templates;

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    Message,
};
use tracing::{info, instrument};

pub use error::{MailError, MailResult};
pub use smtp::{SmtpConfig, SmtpMailTransport};
pub use templates::OTP_SUBJECT;

/// Outbound mail transport
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Sends one message in a single transaction, returning the relay's reply
    ///
    /// # Errors
    ///
    /// Returns `MailError::DeliveryError` if the relay fails or rejects the message
    async fn deliver(&self, message: Message) -> MailResult<String>;

    /// Checks that the relay accepts connections
    ///
    /// # Errors
    ///
    /// Returns `MailError::DeliveryError` if the relay cannot be reached
    async fn verify(&self) -> MailResult<()>;
}

/// Sends OTP emails through a mail transport
pub struct MailNotifier {
    transport: Arc<dyn MailTransport>,
    from: Mailbox,
}

impl MailNotifier {
    /// Creates a notifier sending from `from`
    ///
    /// # Errors
    ///
    /// Returns `MailError::ConfigError` if `from` is not a valid mailbox
    pub fn new(transport: Arc<dyn MailTransport>, from: &str) -> MailResult<Self> {
        let from = from
            .parse::<Mailbox>()
            .map_err(|e| MailError::ConfigError(format!("Invalid sender address {from}: {e}")))?;

        Ok(Self { transport, from })
    }

    /// Checks the underlying transport, used once at startup
    ///
    /// # Errors
    ///
    /// Returns the transport's error if the relay is unreachable
    pub async fn verify(&self) -> MailResult<()> {
        self.transport.verify().await
    }

    /// Emails `otp` to `email`
    ///
    /// Nothing is sent unless both values are present and the recipient parses as a mailbox.
    ///
    /// # Errors
    ///
    /// - `MailError::MissingField` if either value is blank
    /// - `MailError::InvalidRecipient` if `email` is not a valid address
    /// - `MailError::DeliveryError` if the transport fails
    #[instrument(skip(self, otp))]
    pub async fn send_otp(&self, email: &str, otp: &str) -> MailResult<()> {
        if email.trim().is_empty() {
            return Err(MailError::MissingField("email"));
        }
        if otp.trim().is_empty() {
            return Err(MailError::MissingField("otp"));
        }

        let recipient = email
            .trim()
            .parse::<Mailbox>()
            .map_err(|e| MailError::InvalidRecipient(e.to_string()))?;

        let message = self.otp_message(recipient, otp)?;
        let message_id = message
            .headers()
            .get_raw("Message-ID")
            .map(ToString::to_string)
            .unwrap_or_default();

        let reply = self.transport.deliver(message).await?;

        info!("Email sent to {email}. id: {message_id} relay: {reply}");
        Ok(())
    }

    fn otp_message(&self, recipient: Mailbox, otp: &str) -> MailResult<Message> {
        Ok(Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(OTP_SUBJECT)
            .message_id(None)
            .multipart(MultiPart::alternative_plain_html(
                templates::otp_text(otp),
                templates::otp_html(otp),
            ))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<Message>>,
        fail: bool,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn deliver(&self, message: Message) -> MailResult<String> {
            self.sent.lock().await.push(message);
            if self.fail {
                return Err(MailError::DeliveryError("connection reset".to_string()));
            }
            Ok("2.0.0 Ok: queued".to_string())
        }

        async fn verify(&self) -> MailResult<()> {
            Ok(())
        }
    }

    fn notifier(transport: Arc<RecordingTransport>) -> MailNotifier {
        MailNotifier::new(transport, "DigitLens <no-reply@digitlens.app>").unwrap()
    }

    #[tokio::test]
    async fn test_send_otp_delivers_one_message() {
        let transport = Arc::new(RecordingTransport::default());
        let notifier = notifier(transport.clone());

        notifier.send_otp("a@x.com", "123456").await.unwrap();

        let sent = transport.sent.lock().await;
        assert_eq!(sent.len(), 1);

        let headers = sent[0].headers();
        assert!(headers.get_raw("To").is_some_and(|to| to.contains("a@x.com")));
        assert_eq!(headers.get_raw("Subject"), Some(OTP_SUBJECT));
        assert!(headers.get_raw("Message-ID").is_some());

        let raw = String::from_utf8(sent[0].formatted()).unwrap();
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("123456"));
    }

    #[tokio::test]
    async fn test_send_otp_missing_fields_sends_nothing() {
        let transport = Arc::new(RecordingTransport::default());
        let notifier = notifier(transport.clone());

        assert!(matches!(
            notifier.send_otp("", "123456").await,
            Err(MailError::MissingField("email"))
        ));
        assert!(matches!(
            notifier.send_otp("a@x.com", "  ").await,
            Err(MailError::MissingField("otp"))
        ));
        assert!(matches!(
            notifier.send_otp("not an address", "123456").await,
            Err(MailError::InvalidRecipient(_))
        ));

        assert!(transport.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_send_otp_surfaces_delivery_failure() {
        let transport = Arc::new(RecordingTransport {
            fail: true,
            ..Default::default()
        });
        let notifier = notifier(transport.clone());

        assert!(matches!(
            notifier.send_otp("a@x.com", "123456").await,
            Err(MailError::DeliveryError(_))
        ));
        assert_eq!(transport.sent.lock().await.len(), 1);
    }

    #[test]
    fn test_invalid_sender_is_config_error() {
        let transport = Arc::new(RecordingTransport::default());
        assert!(matches!(
            MailNotifier::new(transport, "not a sender"),
            Err(MailError::ConfigError(_))
        ));
    }
}
