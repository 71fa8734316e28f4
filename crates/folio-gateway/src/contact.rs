//! Contact form relay.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use folio_core::config::MailConfig;
use folio_core::types::{ContactForm, ContactSubmission};
use folio_providers::OutboundEmail;
use html_escape::{encode_double_quoted_attribute, encode_text};
use lettre::Address;

use crate::middleware::ClientAddr;
use crate::response::{ApiError, ContactAck};
use crate::server::GatewayState;

/// Addressing and branding of relayed contact emails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSettings {
    /// Display name of the sender.
    pub from_name: String,
    /// Sender address (the authenticated mail account).
    pub from_address: String,
    /// Where contact messages are delivered.
    pub recipient: String,
    /// Prefix prepended to the submitted subject.
    pub subject_tag: String,
    /// Footer line of the email.
    pub footer: String,
}

impl ContactSettings {
    /// Derive from the mail section of the configuration.
    #[must_use]
    pub fn from_config(mail: &MailConfig) -> Self {
        Self {
            from_name: mail.from_name.clone(),
            from_address: mail.username.clone().unwrap_or_default(),
            recipient: mail.recipient().unwrap_or_default().to_string(),
            subject_tag: mail.subject_tag.clone(),
            footer: mail.footer.clone(),
        }
    }
}

impl Default for ContactSettings {
    fn default() -> Self {
        Self::from_config(&MailConfig::default())
    }
}

/// Build the email relayed for a contact submission.
///
/// Every submitted value is HTML-escaped before it reaches the template.
#[must_use]
pub fn render_contact_email(submission: &ContactSubmission, settings: &ContactSettings) -> OutboundEmail {
    let name = encode_text(&submission.name);
    let email = encode_text(&submission.email);
    let href = encode_double_quoted_attribute(submission.email.trim());
    let subject = encode_text(&submission.subject);
    let message = encode_text(&submission.message);
    let footer = encode_text(&settings.footer);

    let html = format!(
        r#"<div style="font-family: 'Segoe UI', Arial, sans-serif; max-width: 600px; margin: 0 auto; background: #0f172a; color: #f1f5f9; border-radius: 12px; overflow: hidden;">
  <div style="background: linear-gradient(135deg, #7c3aed, #06b6d4); padding: 28px 24px; text-align: center;">
    <h1 style="margin: 0; font-size: 22px; color: white;">New Portfolio Message</h1>
  </div>
  <div style="padding: 28px 24px;">
    {from}
    {email_field}
    {subject_field}
    {message_field}
  </div>
  <div style="padding: 14px 24px; background: #1e293b; text-align: center; font-size: 11px; color: #64748b;">{footer}</div>
</div>"#,
        from = field("From", &format!(r#"<span style="font-weight: 600;">{name}</span>"#), "#7c3aed"),
        email_field = field(
            "Email",
            &format!(r#"<a href="mailto:{href}" style="color: #a78bfa; text-decoration: none;">{email}</a>"#),
            "#06b6d4",
        ),
        subject_field = field("Subject", &format!(r#"<span style="font-weight: 600;">{subject}</span>"#), "#7c3aed"),
        message_field = field(
            "Message",
            &format!(r#"<span style="line-height: 1.6; white-space: pre-wrap;">{message}</span>"#),
            "#06b6d4",
        ),
    );

    OutboundEmail {
        from_name: settings.from_name.clone(),
        from_address: settings.from_address.clone(),
        to: settings.recipient.clone(),
        reply_to: submission.email.trim().to_string(),
        subject: format!("{} {}", settings.subject_tag, submission.subject),
        html,
    }
}

fn field(label: &str, value_html: &str, accent: &str) -> String {
    format!(
        r#"<div style="margin-bottom: 16px; padding: 14px; background: #1e293b; border-radius: 8px; border-left: 3px solid {accent};">
      <p style="margin: 0 0 2px; font-size: 11px; color: #94a3b8; text-transform: uppercase; letter-spacing: 1px;">{label}</p>
      <p style="margin: 0; font-size: 15px;">{value_html}</p>
    </div>"#
    )
}

/// `POST /api/contact`
pub(crate) async fn contact_handler(
    State(state): State<Arc<GatewayState>>,
    ClientAddr(identity): ClientAddr,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Result<Json<ContactAck>, ApiError> {
    let form = match payload {
        Ok(Json(form)) => form,
        Err(rejection) => {
            tracing::debug!(client = %identity, error = %rejection.body_text(), "Unreadable contact body");
            ContactForm::default()
        }
    };

    let submission = form.into_submission().map_err(|e| {
        tracing::debug!(client = %identity, error = %e, "Rejected contact submission");
        ApiError::MissingContactFields
    })?;

    if let Err(e) = submission.email.trim().parse::<Address>() {
        tracing::debug!(client = %identity, error = %e, "Rejected contact email address");
        return Err(ApiError::InvalidEmail);
    }

    let email = render_contact_email(&submission, &state.config.contact);

    match state.mailer.send(email).await {
        Ok(()) => {
            tracing::info!(client = %identity, "Contact message relayed");
            Ok(Json(ContactAck::sent()))
        }
        Err(e) => {
            tracing::error!(client = %identity, error = %e, "Email error");
            Err(ApiError::MailFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubMailer, StubProvider, gateway_with, post_json};
    use axum::http::StatusCode;
    use std::sync::atomic::Ordering;

    fn submission() -> ContactSubmission {
        ContactSubmission {
            name: "Ada <Lovelace>".to_string(),
            email: "ada@example.com".to_string(),
            subject: "New site".to_string(),
            message: "Line one\nLine <b>two</b>".to_string(),
        }
    }

    fn settings() -> ContactSettings {
        ContactSettings {
            from_name: "Portfolio Contact".to_string(),
            from_address: "bot@example.com".to_string(),
            recipient: "owner@example.com".to_string(),
            subject_tag: "[Portfolio]".to_string(),
            footer: "Oussama's Portfolio".to_string(),
        }
    }

    #[test]
    fn test_render_contact_email() {
        let email = render_contact_email(&submission(), &settings());

        assert_eq!(email.to, "owner@example.com");
        assert_eq!(email.reply_to, "ada@example.com");
        assert_eq!(email.subject, "[Portfolio] New site");
        assert!(email.html.contains("Ada &lt;Lovelace&gt;"));
        assert!(!email.html.contains("Line <b>two</b>"));
        assert!(email.html.contains("Line &lt;b&gt;two&lt;/b&gt;"));
        assert!(email.html.contains(r#"href="mailto:ada@example.com""#));
        assert!(email.html.contains("Oussama's Portfolio"));
    }

    #[test]
    fn test_render_escapes_mailto_attribute() {
        let mut hostile = submission();
        hostile.email = r#"x@example.com" onclick="steal()"#.to_string();
        let email = render_contact_email(&hostile, &settings());

        assert!(!email.html.contains(r#"href="mailto:x@example.com" onclick"#));
        assert!(email.html.contains(r#"href="mailto:x@example.com&quot; onclick=&quot;steal()""#));
    }

    #[test]
    fn test_settings_from_config() {
        let mail = MailConfig {
            username: Some("bot@example.com".to_string()),
            ..Default::default()
        };
        let settings = ContactSettings::from_config(&mail);
        assert_eq!(settings.from_address, "bot@example.com");
        assert_eq!(settings.recipient, "bot@example.com");
        assert_eq!(settings.subject_tag, "[Portfolio]");
    }

    #[tokio::test]
    async fn test_contact_success() {
        let mailer = StubMailer::succeeding();
        let gateway = gateway_with(mailer.clone(), StubProvider::replying("unused"));

        let (status, body) = post_json(
            gateway.router(),
            "/api/contact",
            "203.0.113.1",
            serde_json::json!({
                "name": "Ada",
                "email": "ada@example.com",
                "subject": "Hello",
                "message": "I'd like a website."
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(mailer.calls.load(Ordering::SeqCst), 1);

        let sent = mailer.last_sent().unwrap();
        assert_eq!(sent.reply_to, "ada@example.com");
        assert_eq!(sent.subject, "[Portfolio] Hello");
    }

    #[tokio::test]
    async fn test_contact_missing_each_field() {
        for missing in ["name", "email", "subject", "message"] {
            let mailer = StubMailer::succeeding();
            let gateway = gateway_with(mailer.clone(), StubProvider::replying("unused"));

            let mut body = serde_json::json!({
                "name": "Ada",
                "email": "ada@example.com",
                "subject": "Hello",
                "message": "Hi"
            });
            body.as_object_mut().unwrap().remove(missing);

            let (status, response) = post_json(gateway.router(), "/api/contact", "203.0.113.1", body).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "missing {missing}");
            assert_eq!(response["error"], "All fields are required.");
            assert_eq!(mailer.calls.load(Ordering::SeqCst), 0, "missing {missing}");
        }
    }

    #[tokio::test]
    async fn test_contact_blank_field_rejected() {
        let mailer = StubMailer::succeeding();
        let gateway = gateway_with(mailer.clone(), StubProvider::replying("unused"));

        let (status, _) = post_json(
            gateway.router(),
            "/api/contact",
            "203.0.113.1",
            serde_json::json!({ "name": "Ada", "email": "", "subject": "Hi", "message": "Hi" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(mailer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_contact_invalid_email_rejected() {
        let mailer = StubMailer::succeeding();
        let gateway = gateway_with(mailer.clone(), StubProvider::replying("unused"));

        let (status, body) = post_json(
            gateway.router(),
            "/api/contact",
            "203.0.113.1",
            serde_json::json!({
                "name": "Ada",
                "email": "not an address",
                "subject": "Hello",
                "message": "Hi"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Please provide a valid email address.");
        assert_eq!(mailer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_contact_mail_failure() {
        let mailer = StubMailer::failing();
        let gateway = gateway_with(mailer.clone(), StubProvider::replying("unused"));

        let (status, body) = post_json(
            gateway.router(),
            "/api/contact",
            "203.0.113.1",
            serde_json::json!({
                "name": "Ada",
                "email": "ada@example.com",
                "subject": "Hello",
                "message": "Hi"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to send email. Please try again later.");
        assert_eq!(mailer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_contact_bypasses_chat_limiter() {
        let mailer = StubMailer::succeeding();
        let gateway = gateway_with(mailer.clone(), StubProvider::replying("unused"));
        let body = serde_json::json!({
            "name": "Ada",
            "email": "ada@example.com",
            "subject": "Hello",
            "message": "Hi"
        });

        for _ in 0..5 {
            let (status, _) = post_json(gateway.router(), "/api/contact", "203.0.113.1", body.clone()).await;
            assert_eq!(status, StatusCode::OK);
        }

        let id = folio_core::ClientIdentity::new("203.0.113.1");
        assert_eq!(gateway.state().limiter.admitted(&id).await, 0);
    }
}
