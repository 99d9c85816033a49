//! Email channel — sends the report over SMTP with STARTTLS.
//!
//! Sending is opt-in (`email_enabled`) and needs sender, password, and
//! receiver. A failed send is logged and the report itself is written to
//! the operational log so it is never lost.

use async_trait::async_trait;
use audwatch_core::config::Config;
use audwatch_core::error::{AudWatchError, Result};
use audwatch_core::traits::Notifier;
use audwatch_core::types::RateRecord;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

pub const EMAIL_SUBJECT: &str = "AUD rate report";

/// Email channel configuration.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
    pub receiver_email: String,
}

impl From<&Config> for EmailConfig {
    fn from(config: &Config) -> Self {
        Self {
            enabled: config.email_enabled,
            smtp_server: config.smtp_server.clone(),
            smtp_port: config.smtp_port,
            sender_email: config.sender_email.clone(),
            sender_password: config.sender_password.clone(),
            receiver_email: config.receiver_email.clone(),
        }
    }
}

impl EmailConfig {
    /// Names of required fields that are still empty.
    fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("sender_email", &self.sender_email),
            ("sender_password", &self.sender_password),
            ("receiver_email", &self.receiver_email),
            ("smtp_server", &self.smtp_server),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Fails fast, without touching the network, when sending is disabled
    /// or the configuration is incomplete.
    pub fn check_ready(&self) -> Result<()> {
        if !self.config.enabled {
            return Err(AudWatchError::EmailDisabled);
        }
        let missing = self.config.missing_fields();
        if !missing.is_empty() {
            return Err(AudWatchError::EmailIncomplete(missing.join(", ")));
        }
        Ok(())
    }

    /// Build the plain-text message.
    pub fn build_message(&self, body: &str) -> Result<Message> {
        let from: Mailbox = self.config.sender_email.trim().parse()
            .map_err(|e| AudWatchError::email(format!("Invalid sender address: {e}")))?;
        let to: Mailbox = self.config.receiver_email.trim().parse()
            .map_err(|e| AudWatchError::email(format!("Invalid receiver address: {e}")))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(EMAIL_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AudWatchError::email(format!("Build email failed: {e}")))
    }

    async fn deliver(&self, body: &str) -> Result<()> {
        let email = self.build_message(body)?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_server)
            .map_err(|e| AudWatchError::email(format!("SMTP relay setup failed: {e}")))?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(
                self.config.sender_email.clone(),
                self.config.sender_password.clone(),
            ))
            .build();

        transport.send(email).await
            .map_err(|e| AudWatchError::email(format!("SMTP send failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str { "email" }

    async fn notify(&self, message: &str, _record: Option<&RateRecord>) -> Result<()> {
        if let Err(e) = self.check_ready() {
            match &e {
                AudWatchError::EmailDisabled => tracing::debug!("Email disabled, skipping"),
                _ => tracing::error!("{e}, cannot send email"),
            }
            return Err(e);
        }

        tracing::info!("Sending email...");
        match self.deliver(message).await {
            Ok(()) => {
                tracing::info!("📧 Email sent to {}", self.config.receiver_email);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to send email: {e}");
                tracing::info!("Rate report: {message}");
                Err(e)
            }
        }
    }
}
