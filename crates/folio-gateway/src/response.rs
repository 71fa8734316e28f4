//! Response bodies and error mapping for the HTTP API.
//!
//! Client mistakes map to 4xx with a message the front end can show as-is;
//! collaborator failures map to 5xx with a generic message, the specific
//! cause having been logged by the handler. A chat limit is not an error and
//! is expressed by [`ChatReply::limited`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Errors returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// A contact field was absent or blank.
    #[error("All fields are required.")]
    MissingContactFields,

    /// The submitter's email address does not parse.
    #[error("Please provide a valid email address.")]
    InvalidEmail,

    /// The chat body had no usable `messages` array.
    #[error("Messages array is required.")]
    MissingMessages,

    /// The input was well-formed but exceeded a limit.
    #[error("{0}")]
    InvalidInput(String),

    /// The mail collaborator failed.
    #[error("Failed to send email. Please try again later.")]
    MailFailed,

    /// The completion API answered with a failure status.
    #[error("AI service unavailable. Please try again.")]
    AiUnavailable,

    /// The completion call failed in transport or decoding.
    #[error("Failed to get AI response. Please try again.")]
    AiFailed,

    /// The caller exceeded the request throttle.
    #[error("Too many requests. Please slow down.")]
    Throttled,
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingContactFields
            | Self::InvalidEmail
            | Self::MissingMessages
            | Self::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::MailFailed | Self::AiUnavailable | Self::AiFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Throttled => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

/// Error body: `{"error": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// User-facing message.
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Contact relay success body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ContactAck {
    /// Always `true`.
    pub success: bool,
    /// Confirmation text.
    pub message: String,
}

impl ContactAck {
    /// Acknowledge a relayed message.
    #[must_use]
    pub fn sent() -> Self {
        Self {
            success: true,
            message: "Email sent successfully!".to_string(),
        }
    }
}

/// Chat relay body: either `{"reply": "..."}` or `{"limited": true, "reply": null}`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    /// Present and `true` only when the caller is over its allowance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limited: Option<bool>,
    /// Assistant reply, `null` when limited.
    pub reply: Option<String>,
}

impl ChatReply {
    /// A relayed assistant reply.
    #[must_use]
    pub fn text(reply: impl Into<String>) -> Self {
        Self {
            limited: None,
            reply: Some(reply.into()),
        }
    }

    /// The caller has used up its chat allowance.
    #[must_use]
    pub const fn limited() -> Self {
        Self {
            limited: Some(true),
            reply: None,
        }
    }
}

/// Health body.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Always `ok`.
    pub status: String,
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
}
