//! Input validation and sanitization.
//!
//! Chat transcripts pass through here before they are relayed: they are
//! bounded and stripped of control characters, otherwise forwarded as sent.

use thiserror::Error;

use crate::types::ChatMessage;

/// Validation error types.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more required fields were absent or blank.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Input exceeds maximum allowed length.
    #[error("Input exceeds maximum length ({max} bytes, got {actual})")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual input length.
        actual: usize,
    },

    /// Transcript has more turns than allowed.
    #[error("Conversation too long ({max} messages max, got {actual})")]
    TooManyMessages {
        /// Maximum allowed message count.
        max: usize,
        /// Actual message count.
        actual: usize,
    },
}

/// Size limits per input type.
pub mod limits {
    /// Maximum chat message content length (4KB).
    pub const MAX_CHAT_MESSAGE_LENGTH: usize = 4 * 1024;

    /// Maximum number of turns in a relayed transcript.
    pub const MAX_TRANSCRIPT_MESSAGES: usize = 50;
}

/// Validate and sanitize message content.
///
/// Performs:
/// 1. Length check
/// 2. Strip null bytes and control chars (except newlines/tabs)
///
/// # Errors
///
/// Returns `ValidationError::TooLong` if input exceeds `max_len`.
pub fn validate_message_content(input: &str, max_len: usize) -> Result<String, ValidationError> {
    if input.len() > max_len {
        return Err(ValidationError::TooLong {
            max: max_len,
            actual: input.len(),
        });
    }

    Ok(input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
        .collect())
}

/// Validate a chat transcript before it is forwarded.
///
/// Returns the sanitized transcript in the original order.
///
/// # Errors
///
/// Returns an error if the transcript or any message exceeds its limit.
pub fn validate_transcript(messages: Vec<ChatMessage>) -> Result<Vec<ChatMessage>, ValidationError> {
    if messages.len() > limits::MAX_TRANSCRIPT_MESSAGES {
        return Err(ValidationError::TooManyMessages {
            max: limits::MAX_TRANSCRIPT_MESSAGES,
            actual: messages.len(),
        });
    }

    messages
        .into_iter()
        .map(|msg| {
            let content = validate_message_content(&msg.content, limits::MAX_CHAT_MESSAGE_LENGTH)?;
            Ok(ChatMessage { content, ..msg })
        })
        .collect()
}
