//! Core types used throughout Folio.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

use crate::validation::ValidationError;

/// Lookup key grouping requests from one network origin.
///
/// Carries no semantics beyond equality; it is only ever used to index the
/// chat limiter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientIdentity(pub String);

impl ClientIdentity {
    /// Create a new client identity.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identity used when no address can be determined.
    #[must_use]
    pub fn unknown() -> Self {
        Self("unknown".to_string())
    }

    /// Resolve an identity from a request's origin.
    ///
    /// The first entry of an `X-Forwarded-For` value wins, then the transport
    /// peer address, then [`ClientIdentity::unknown`].
    #[must_use]
    pub fn resolve(forwarded_for: Option<&str>, peer: Option<IpAddr>) -> Self {
        let forwarded = forwarded_for
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|first| !first.is_empty());

        match (forwarded, peer) {
            (Some(first), _) => Self::new(first),
            (None, Some(ip)) => Self(ip.to_string()),
            (None, None) => Self::unknown(),
        }
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ClientIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Site visitor.
    User,
    /// Previous assistant reply.
    Assistant,
}

impl ChatRole {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One turn of the visible chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Contact form payload as received; every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    /// Sender name.
    #[serde(default)]
    pub name: Option<String>,
    /// Sender email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Message subject.
    #[serde(default)]
    pub subject: Option<String>,
    /// Message body.
    #[serde(default)]
    pub message: Option<String>,
}

impl ContactForm {
    /// Check that every field is present and non-blank.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingFields` naming each absent field.
    pub fn into_submission(self) -> Result<ContactSubmission, ValidationError> {
        fn take(value: Option<String>, field: &'static str, missing: &mut Vec<&'static str>) -> String {
            match value {
                Some(v) if !v.trim().is_empty() => v,
                _ => {
                    missing.push(field);
                    String::new()
                }
            }
        }

        let mut missing = Vec::new();
        let name = take(self.name, "name", &mut missing);
        let email = take(self.email, "email", &mut missing);
        let subject = take(self.subject, "subject", &mut missing);
        let message = take(self.message, "message", &mut missing);

        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        Ok(ContactSubmission {
            name,
            email,
            subject,
            message,
        })
    }
}

/// A validated contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    /// Sender name.
    pub name: String,
    /// Sender email address, used as reply-to.
    pub email: String,
    /// Message subject.
    pub subject: String,
    /// Message body.
    pub message: String,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens.
    pub input_tokens: u64,
    /// Output tokens.
    pub output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_identity_prefers_forwarded_for() {
        let peer = Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)));
        let id = ClientIdentity::resolve(Some(" 203.0.113.7 , 10.0.0.2"), peer);
        assert_eq!(id, ClientIdentity::new("203.0.113.7"));
    }

    #[test]
    fn test_identity_falls_back_to_peer() {
        let peer = Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)));
        assert_eq!(ClientIdentity::resolve(None, peer).as_ref(), "192.168.1.20");
        assert_eq!(ClientIdentity::resolve(Some("  "), peer).as_ref(), "192.168.1.20");
        assert_eq!(ClientIdentity::resolve(None, None), ClientIdentity::unknown());
    }

    #[test]
    fn test_chat_message_roles() {
        let msg: ChatMessage =
            serde_json::from_str(r#"{"role":"assistant","content":"Hi"}"#).unwrap();
        assert_eq!(msg, ChatMessage::assistant("Hi"));

        let bad = serde_json::from_str::<ChatMessage>(r#"{"role":"system","content":"x"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_contact_form_missing_fields() {
        let form = ContactForm {
            name: Some("Ada".to_string()),
            email: Some("   ".to_string()),
            subject: None,
            message: Some("Hello".to_string()),
        };

        match form.into_submission() {
            Err(ValidationError::MissingFields(fields)) => {
                assert_eq!(fields, vec!["email", "subject"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_contact_form_complete() {
        let form: ContactForm = serde_json::from_str(
            r#"{"name":"Ada","email":"ada@example.com","subject":"Site","message":"Hi there"}"#,
        )
        .unwrap();

        let submission = form.into_submission().unwrap();
        assert_eq!(submission.email, "ada@example.com");
        assert_eq!(submission.message, "Hi there");
    }
}
