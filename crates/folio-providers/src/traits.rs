//! Completion provider traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use folio_core::types::{ChatMessage, TokenUsage};

/// Provider errors.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error body returned by the API.
        message: String,
    },

    /// Network error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ProviderError {
    /// Whether the API itself answered with a failure status, as opposed to
    /// the call failing in transport or decoding.
    #[must_use]
    pub const fn is_api_status(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}

/// Completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model to use.
    pub model: String,

    /// Conversation so far, oldest first.
    pub messages: Vec<ChatMessage>,

    /// System prompt sent ahead of the conversation.
    pub system: Option<String>,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Temperature for sampling.
    pub temperature: f32,
}

/// Completion response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Response ID, when the API reports one.
    pub id: Option<String>,

    /// Model used, when the API reports one.
    pub model: Option<String>,

    /// Text of the first returned choice, if any.
    pub reply: Option<String>,

    /// Token usage, when the API reports it.
    pub usage: Option<TokenUsage>,
}

/// Chat completion provider.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name.
    fn name(&self) -> &str;

    /// Create a completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;
}
