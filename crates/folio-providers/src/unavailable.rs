//! Collaborators standing in for unconfigured credentials.
//!
//! The server still starts without mail or chat credentials; the affected
//! endpoint then fails per request with a logged configuration error.

use async_trait::async_trait;

use crate::mail::{MailError, Mailer, OutboundEmail};
use crate::traits::{CompletionRequest, CompletionResponse, Provider, ProviderError};

/// Mailer used when no SMTP credentials are configured.
#[derive(Debug, Clone)]
pub struct UnavailableMailer {
    reason: String,
}

impl UnavailableMailer {
    /// Create with the reason reported on every call.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl Mailer for UnavailableMailer {
    async fn send(&self, _email: OutboundEmail) -> Result<(), MailError> {
        Err(MailError::Config(self.reason.clone()))
    }

    async fn verify(&self) -> Result<(), MailError> {
        Err(MailError::Config(self.reason.clone()))
    }
}

/// Provider used when no completion API key is configured.
#[derive(Debug, Clone)]
pub struct UnavailableProvider {
    reason: String,
}

impl UnavailableProvider {
    /// Create with the reason reported on every call.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl Provider for UnavailableProvider {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        Err(ProviderError::Config(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unavailable_mailer() {
        let mailer = UnavailableMailer::new("mail username is not set");
        let email = OutboundEmail {
            from_name: "Portfolio Contact".to_string(),
            from_address: "bot@example.com".to_string(),
            to: "owner@example.com".to_string(),
            reply_to: "ada@example.com".to_string(),
            subject: "[Portfolio] Hi".to_string(),
            html: "<p>Hi</p>".to_string(),
        };

        let err = mailer.send(email).await.unwrap_err();
        assert!(matches!(err, MailError::Config(ref reason) if reason == "mail username is not set"));
        assert!(mailer.verify().await.is_err());
    }

    #[tokio::test]
    async fn test_unavailable_provider() {
        let provider = UnavailableProvider::new("chat API key is not set");
        let request = CompletionRequest {
            model: "deepseek-chat".to_string(),
            messages: vec![],
            system: None,
            max_tokens: 150,
            temperature: 0.7,
        };

        let err = provider.complete(request).await.unwrap_err();
        assert!(!err.is_api_status());
        assert_eq!(provider.name(), "unavailable");
    }
}
