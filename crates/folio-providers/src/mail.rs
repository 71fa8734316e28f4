//! Outbound mail.
//!
//! The gateway only sees the [`Mailer`] trait; [`SmtpMailer`] delivers
//! through an SMTP relay over implicit TLS.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use folio_core::config::MailConfig;

/// Mail errors.
#[derive(Error, Debug)]
pub enum MailError {
    /// An address could not be parsed.
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The message could not be assembled.
    #[error("Message build error: {0}")]
    Build(#[from] lettre::error::Error),

    /// SMTP transport or authentication failure.
    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The relay answered but refused the connection check.
    #[error("SMTP server unreachable: {0}")]
    Unreachable(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// A fully addressed HTML email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    /// Display name of the sender.
    pub from_name: String,
    /// Sender address.
    pub from_address: String,
    /// Recipient address.
    pub to: String,
    /// Reply-to address.
    pub reply_to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

impl OutboundEmail {
    /// Assemble the RFC 5322 message.
    ///
    /// # Errors
    ///
    /// Returns error if any address is malformed.
    pub fn to_message(&self) -> Result<Message, MailError> {
        let from = Mailbox::new(Some(self.from_name.clone()), self.from_address.parse::<Address>()?);
        let to = Mailbox::new(None, self.to.parse::<Address>()?);
        let reply_to = Mailbox::new(None, self.reply_to.trim().parse::<Address>()?);

        let message = Message::builder()
            .from(from)
            .to(to)
            .reply_to(reply_to)
            .subject(self.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(self.html.clone())?;

        Ok(message)
    }
}

/// Mail delivery collaborator.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one email.
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError>;

    /// Check that the relay is reachable and accepts our credentials.
    async fn verify(&self) -> Result<(), MailError> {
        Ok(())
    }
}

/// SMTP mailer backed by `lettre`.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpMailer {
    /// Create a mailer for `host:port` with the given credentials.
    ///
    /// # Errors
    ///
    /// Returns error if the relay host cannot be used for TLS.
    pub fn new(host: &str, port: u16, username: String, password: &str) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
            .port(port)
            .credentials(Credentials::new(username, password.to_string()))
            .build();

        Ok(Self {
            transport,
            host: host.to_string(),
        })
    }

    /// Create from the mail section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns `MailError::Config` if credentials are missing.
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let username = config
            .username
            .clone()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| MailError::Config("mail username is not set".to_string()))?;
        let password = config
            .password_secret()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| MailError::Config("mail password is not set".to_string()))?;

        Self::new(&config.smtp_host, config.smtp_port, username, password.expose())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        let message = email.to_message()?;
        let response = self.transport.send(message).await?;
        tracing::debug!(host = %self.host, code = %response.code(), "Mail accepted by relay");
        Ok(())
    }

    async fn verify(&self) -> Result<(), MailError> {
        if self.transport.test_connection().await? {
            Ok(())
        } else {
            Err(MailError::Unreachable(self.host.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> OutboundEmail {
        OutboundEmail {
            from_name: "Portfolio Contact".to_string(),
            from_address: "bot@example.com".to_string(),
            to: "owner@example.com".to_string(),
            reply_to: "ada@example.com".to_string(),
            subject: "[Portfolio] New site".to_string(),
            html: "<p>Hello</p>".to_string(),
        }
    }

    #[test]
    fn test_message_headers() {
        let message = email().to_message().unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("bot@example.com"));
        assert!(raw.contains("To: owner@example.com"));
        assert!(raw.contains("Reply-To: ada@example.com"));
        assert!(raw.contains("Subject: [Portfolio] New site"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn test_invalid_reply_to_rejected() {
        let mut bad = email();
        bad.reply_to = "not an address".to_string();
        assert!(matches!(bad.to_message(), Err(MailError::Address(_))));
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let config = MailConfig::default();
        assert!(matches!(SmtpMailer::from_config(&config), Err(MailError::Config(_))));

        let config = MailConfig {
            username: Some("bot@example.com".to_string()),
            ..Default::default()
        };
        assert!(matches!(SmtpMailer::from_config(&config), Err(MailError::Config(_))));
    }

    #[tokio::test]
    async fn test_from_config_builds_transport() {
        let config = MailConfig {
            username: Some("bot@example.com".to_string()),
            password: Some("app-password".to_string()),
            ..Default::default()
        };
        let mailer = SmtpMailer::from_config(&config).unwrap();
        assert_eq!(mailer.host, "smtp.gmail.com");
    }
}
