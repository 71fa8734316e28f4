//! DeepSeek chat completions provider.
//!
//! Speaks the OpenAI-compatible `/chat/completions` protocol, so any
//! compatible endpoint can be targeted with [`DeepSeekProvider::with_base_url`].

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::traits::{CompletionRequest, CompletionResponse, Provider, ProviderError};
use folio_core::config::ChatConfig;
use folio_core::secrets::ApiKey;
use folio_core::types::TokenUsage;

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";

/// DeepSeek API provider.
pub struct DeepSeekProvider {
    client: Client,
    api_key: ApiKey,
    base_url: String,
}

impl DeepSeekProvider {
    /// Create a new DeepSeek provider.
    #[must_use]
    pub fn new(api_key: ApiKey) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create with custom base URL (for compatible APIs).
    #[must_use]
    pub fn with_base_url(api_key: ApiKey, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create from the chat section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Config` if no API key is configured.
    pub fn from_config(config: &ChatConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key_secret()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ProviderError::Config("chat API key is not set".to_string()))?;
        Ok(Self::with_base_url(api_key, config.base_url.clone()))
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Convert our request format to the wire format.
    fn to_wire_request(request: &CompletionRequest) -> WireRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(system) = &request.system {
            messages.push(WireMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }

        messages.extend(request.messages.iter().map(|msg| WireMessage {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        }));

        WireRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        }
    }
}

#[async_trait]
impl Provider for DeepSeekProvider {
    fn name(&self) -> &str {
        "deepseek"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let wire_request = Self::to_wire_request(&request);

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .header("Content-Type", "application/json")
            .json(&wire_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, message });
        }

        let body = response.bytes().await?;
        let value: Value = serde_json::from_slice(&body)?;
        Ok(parse_response(&value))
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

/// Read the fields we use out of a completion body.
///
/// Missing, null or mistyped fields read as absent, so any well-formed JSON
/// body yields a response (with no reply when the shape is unexpected).
fn parse_response(body: &Value) -> CompletionResponse {
    let reply = body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string);

    let usage = body["usage"].as_object().map(|usage| TokenUsage {
        input_tokens: usage.get("prompt_tokens").and_then(Value::as_u64).unwrap_or(0),
        output_tokens: usage.get("completion_tokens").and_then(Value::as_u64).unwrap_or(0),
    });

    CompletionResponse {
        id: body["id"].as_str().map(str::to_string),
        model: body["model"].as_str().map(str::to_string),
        reply,
        usage,
    }
}
