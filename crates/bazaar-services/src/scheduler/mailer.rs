//! # Mail Delivery
//!
//! The dispatcher's outbound side. `Mailer` is the seam: production wires
//! in [`SmtpMailer`] (SMTP via lettre), tests wire in [`RecordingMailer`]
//! and assert on captured messages.

use std::future::Future;
use std::sync::{Arc, Mutex};

use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::{authentication::Credentials, Error as SmtpError},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;
use tracing::debug;

use crate::config::MailConfig;

/// One outgoing email.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum MailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Outbound mail seam for the dispatcher.
pub trait Mailer: Send + Sync + 'static {
    /// Delivers one message.
    fn send(&self, message: EmailMessage) -> impl Future<Output = Result<(), MailError>> + Send;
}

// =============================================================================
// SMTP Mailer
// =============================================================================

/// SMTP delivery via lettre.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Creates an SMTP mailer from configuration (STARTTLS relay).
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(SmtpMailer {
            transport,
            from_address: config.from_address.clone(),
        })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, message: EmailMessage) -> impl Future<Output = Result<(), MailError>> + Send {
        let transport = self.transport.clone();
        let from_address = self.from_address.clone();

        async move {
            let from: Mailbox = from_address
                .parse()
                .map_err(|_| MailError::InvalidAddress(from_address.clone()))?;
            let to: Mailbox = message
                .to
                .parse()
                .map_err(|_| MailError::InvalidAddress(message.to.clone()))?;

            let email = Message::builder()
                .from(from)
                .to(to)
                .subject(&message.subject)
                .multipart(MultiPart::alternative_plain_html(
                    message.text,
                    message.html,
                ))?;

            transport.send(email).await?;
            debug!(to = %message.to, subject = %message.subject, "Email sent");
            Ok(())
        }
    }
}

// =============================================================================
// Recording Mailer (tests and dry runs)
// =============================================================================

/// Captures messages instead of delivering them.
#[derive(Debug, Default, Clone)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        RecordingMailer::default()
    }

    /// Everything "sent" so far.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, message: EmailMessage) -> impl Future<Output = Result<(), MailError>> + Send {
        let sent = self.sent.clone();
        async move {
            sent.lock().expect("mailer mutex poisoned").push(message);
            Ok(())
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_mailer_captures_messages() {
        let mailer = RecordingMailer::new();

        mailer
            .send(EmailMessage {
                to: "a@example.com".to_string(),
                subject: "Scheduled sales Report".to_string(),
                text: "body".to_string(),
                html: "<pre>body</pre>".to_string(),
            })
            .await
            .unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@example.com");
    }
}
