//! Secrets handling.
//!
//! - `ApiKey`: wrapper that prevents accidental logging
//! - `redact`: masked rendering for config dumps

use secrecy::{ExposeSecret, SecretBox};

/// API key or password wrapper that prevents accidental logging.
///
/// The inner value is wrapped with `secrecy::SecretBox` so it never shows up
/// in `Debug` or `Display` output.
#[derive(Clone)]
pub struct ApiKey(SecretBox<str>);

impl ApiKey {
    /// Create a new API key.
    #[must_use]
    pub fn new(key: String) -> Self {
        Self(SecretBox::new(key.into_boxed_str()))
    }

    /// Expose the secret for actual API calls.
    ///
    /// Use sparingly - only when actually sending to a collaborator.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Whether the secret is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey([REDACTED])")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

/// Render an optional secret for display: `<unset>`, or a masked value that
/// keeps only the last four characters of long secrets.
#[must_use]
pub fn redact(secret: Option<&str>) -> String {
    match secret {
        None | Some("") => "<unset>".to_string(),
        Some(s) if s.chars().count() > 8 => {
            let tail: String = s.chars().skip(s.chars().count() - 4).collect();
            format!("****{tail}")
        }
        Some(_) => "****".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_redacted() {
        let key = ApiKey::new("sk-secret-123".to_string());
        assert_eq!(format!("{key:?}"), "ApiKey([REDACTED])");
        assert_eq!(format!("{key}"), "[REDACTED]");
        assert_eq!(key.expose(), "sk-secret-123");
        assert!(!key.is_empty());
    }

    #[test]
    fn test_redact() {
        assert_eq!(redact(None), "<unset>");
        assert_eq!(redact(Some("")), "<unset>");
        assert_eq!(redact(Some("short")), "****");
        assert_eq!(redact(Some("sk-0123456789abcd")), "****abcd");
    }
}
