//! Chat relay.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;

use folio_core::config::ChatConfig;
use folio_core::types::ChatMessage;
use folio_core::validation::validate_transcript;
use folio_providers::CompletionRequest;

use crate::middleware::ClientAddr;
use crate::response::{ApiError, ChatReply};
use crate::server::GatewayState;

/// Built-in system prompt sent ahead of every transcript.
pub const SYSTEM_PROMPT: &str = "You are a professional assistant integrated inside a developer's portfolio website.

IDENTITY:
Act as a freelance web developer's assistant. Speak professionally, clearly and concisely.

MAIN PURPOSE:
Help visitors understand the developer's services, skills and projects, and guide them toward collaboration or hiring.

SPECIALIZATION:
- Web development
- Business websites and landing pages
- E-commerce stores
- Admin panels and dashboards
- UI/UX improvement
- Mobile-first responsive design
- API integrations and AI tools
- Performance optimization

RULES:
- Keep answers short and focused.
- At most 4-6 lines per reply unless the visitor asks for details.
- If a question is unrelated to web development, politely redirect to development topics.
- Do not invent skills or experience.
- Prefer bullet points.
- Encourage project discussion without aggressive marketing.";

/// Reply used when the completion carries no text.
pub const FALLBACK_REPLY: &str = "Sorry, I could not generate a response.";

/// Parameters of the completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens in a reply.
    pub max_tokens: u32,
    /// Requests admitted per client.
    pub message_limit: u32,
    /// System prompt.
    pub system_prompt: String,
}

impl ChatSettings {
    /// Derive from the chat section of the configuration.
    #[must_use]
    pub fn from_config(chat: &ChatConfig) -> Self {
        Self {
            model: chat.model.clone(),
            temperature: chat.temperature,
            max_tokens: chat.max_tokens,
            message_limit: chat.message_limit,
            system_prompt: chat
                .system_prompt
                .clone()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| SYSTEM_PROMPT.to_string()),
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatRequest {
    #[serde(default)]
    messages: Option<Vec<ChatMessage>>,
}

/// `POST /api/chat`
pub(crate) async fn chat_handler(
    State(state): State<Arc<GatewayState>>,
    ClientAddr(identity): ClientAddr,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let messages = match payload {
        Ok(Json(ChatRequest {
            messages: Some(messages),
        })) => messages,
        Ok(_) => return Err(ApiError::MissingMessages),
        Err(rejection) => {
            tracing::debug!(client = %identity, error = %rejection.body_text(), "Unreadable chat body");
            return Err(ApiError::MissingMessages);
        }
    };

    let messages = validate_transcript(messages).map_err(|e| {
        tracing::debug!(client = %identity, error = %e, "Rejected chat transcript");
        ApiError::InvalidInput(e.to_string())
    })?;

    if !state.limiter.try_admit(&identity).await {
        tracing::info!(client = %identity, "Chat limit reached");
        return Ok(Json(ChatReply::limited()));
    }

    let settings = &state.config.chat;
    let request = CompletionRequest {
        model: settings.model.clone(),
        messages,
        system: Some(settings.system_prompt.clone()),
        max_tokens: settings.max_tokens,
        temperature: settings.temperature,
    };

    match state.provider.complete(request).await {
        Ok(response) => {
            if let Some(usage) = &response.usage {
                tracing::debug!(
                    client = %identity,
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "Chat completion"
                );
            }
            let reply = response
                .reply
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| FALLBACK_REPLY.to_string());
            Ok(Json(ChatReply::text(reply)))
        }
        Err(e) if e.is_api_status() => {
            tracing::error!(client = %identity, provider = state.provider.name(), error = %e, "Completion API error");
            Err(ApiError::AiUnavailable)
        }
        Err(e) => {
            tracing::error!(client = %identity, provider = state.provider.name(), error = %e, "Chat error");
            Err(ApiError::AiFailed)
        }
    }
}
