//! Stub collaborators and request helpers for handler tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

use folio_core::types::TokenUsage;
use folio_providers::{
    CompletionRequest, CompletionResponse, MailError, Mailer, OutboundEmail, Provider, ProviderError,
};

use crate::server::{Gateway, GatewayBuilder, GatewayConfig};

/// How the stub provider answers.
#[derive(Debug, Clone)]
pub enum StubOutcome {
    Reply(String),
    Empty,
    ApiError(u16),
    Broken,
}

/// Completion provider that records calls and answers from a script.
#[derive(Debug)]
pub struct StubProvider {
    pub calls: AtomicUsize,
    outcome: StubOutcome,
    last: Mutex<Option<CompletionRequest>>,
}

impl StubProvider {
    pub fn with_outcome(outcome: StubOutcome) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            outcome,
            last: Mutex::new(None),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::with_outcome(StubOutcome::Reply(text.to_string()))
    }

    pub fn empty() -> Arc<Self> {
        Self::with_outcome(StubOutcome::Empty)
    }

    pub fn api_error(status: u16) -> Arc<Self> {
        Self::with_outcome(StubOutcome::ApiError(status))
    }

    pub fn broken() -> Arc<Self> {
        Self::with_outcome(StubOutcome::Broken)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(request);

        match &self.outcome {
            StubOutcome::Reply(text) => Ok(CompletionResponse {
                id: Some("stub-1".to_string()),
                model: Some("stub".to_string()),
                reply: Some(text.clone()),
                usage: Some(TokenUsage {
                    input_tokens: 12,
                    output_tokens: 3,
                }),
            }),
            StubOutcome::Empty => Ok(CompletionResponse::default()),
            StubOutcome::ApiError(status) => Err(ProviderError::Api {
                status: *status,
                message: "upstream failure".to_string(),
            }),
            StubOutcome::Broken => Err(ProviderError::Serialization(
                serde_json::from_str::<serde_json::Value>("not json").unwrap_err(),
            )),
        }
    }
}

/// Mailer that records what it was asked to send.
#[derive(Debug)]
pub struct StubMailer {
    pub calls: AtomicUsize,
    fail: bool,
    last: Mutex<Option<OutboundEmail>>,
}

impl StubMailer {
    fn build(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail,
            last: Mutex::new(None),
        })
    }

    pub fn succeeding() -> Arc<Self> {
        Self::build(false)
    }

    pub fn failing() -> Arc<Self> {
        Self::build(true)
    }

    pub fn last_sent(&self) -> Option<OutboundEmail> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for StubMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(email);
        if self.fail {
            return Err(MailError::Unreachable("stub relay down".to_string()));
        }
        Ok(())
    }
}

pub fn gateway_with(mailer: Arc<StubMailer>, provider: Arc<StubProvider>) -> Gateway {
    gateway_with_config(GatewayConfig::default(), mailer, provider)
}

pub fn gateway_with_config(
    config: GatewayConfig,
    mailer: Arc<StubMailer>,
    provider: Arc<StubProvider>,
) -> Gateway {
    GatewayBuilder::new()
        .with_config(config)
        .with_mailer(mailer)
        .with_provider(provider)
        .build()
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// POST a JSON body as if it came from `client`.
pub async fn post_json(
    router: Router,
    path: &str,
    client: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::post(path)
        .header("content-type", "application/json")
        .header("x-forwarded-for", client)
        .body(Body::from(body.to_string()))
        .unwrap();
    read_json(router.oneshot(request).await.unwrap()).await
}

/// GET `path` and decode the JSON body.
pub async fn get_json(router: Router, path: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::get(path).body(Body::empty()).unwrap();
    read_json(router.oneshot(request).await.unwrap()).await
}

/// GET `path` and return the body as text.
pub async fn get_text(router: Router, path: &str) -> (StatusCode, String) {
    let request = Request::get(path).body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}
