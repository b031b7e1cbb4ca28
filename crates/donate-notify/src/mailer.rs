//! Mail Delivery
//!
//! The [`Mailer`] trait abstracts delivery so the watcher can be exercised
//! without a relay: [`SmtpMailer`] is the production STARTTLS transport,
//! [`RecordingMailer`] captures messages in memory for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::{NotifyError, Result};

/// Mail delivery trait
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one plain-text message
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// SMTP relay configuration
#[derive(Clone, Debug)]
pub struct SmtpConfig {
    /// Relay hostname, e.g. `smtp.gmail.com`
    pub host: String,

    /// Relay port (587 for STARTTLS submission)
    pub port: u16,

    /// Sender address, also the login username
    pub address: String,

    /// Login password
    pub password: String,

    /// Session timeout
    pub timeout: Duration,
}

/// Authenticated STARTTLS SMTP mailer
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let from = config
            .address
            .parse()
            .map_err(|e| NotifyError::Address(format!("{}: {e}", config.address)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| NotifyError::Config(format!("Bad SMTP relay {}: {e}", config.host)))?
            .port(config.port)
            .credentials(Credentials::new(
                config.address.clone(),
                config.password.clone(),
            ))
            .timeout(Some(config.timeout))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let to: Mailbox = to
            .parse()
            .map_err(|e| NotifyError::Address(format!("{to}: {e}")))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotifyError::Message(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        Ok(())
    }
}

/// A message captured by [`RecordingMailer`]
#[derive(Clone, Debug)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// In-memory mailer for tests and demos
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    fail_sends: AtomicBool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send fail until turned off again
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Everything delivered so far
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    /// Messages delivered to one recipient
    pub fn sent_to(&self, to: &str) -> Vec<SentMail> {
        self.sent()
            .into_iter()
            .filter(|mail| mail.to == to)
            .collect()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(NotifyError::Smtp("Simulated delivery failure".into()));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smtp_mailer_rejects_bad_sender() {
        let config = SmtpConfig {
            host: "smtp.example.com".into(),
            port: 587,
            address: "not an address".into(),
            password: "secret".into(),
            timeout: Duration::from_secs(10),
        };
        assert!(matches!(
            SmtpMailer::new(&config),
            Err(NotifyError::Address(_))
        ));
    }

    #[tokio::test]
    async fn test_recording_mailer_captures_and_fails_on_demand() {
        let mailer = RecordingMailer::new();
        mailer.send("a@example.com", "hi", "body").await.unwrap();
        assert_eq!(mailer.sent_to("a@example.com").len(), 1);

        mailer.set_fail_sends(true);
        assert!(mailer.send("a@example.com", "hi", "body").await.is_err());
        assert_eq!(mailer.sent().len(), 1);
    }
}
