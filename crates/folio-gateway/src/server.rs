//! Gateway server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use chrono::{SecondsFormat, Utc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use folio_core::config::Deployment;
use folio_providers::{Mailer, Provider};

use crate::GatewayError;
use crate::chat::{ChatSettings, chat_handler};
use crate::contact::{ContactSettings, contact_handler};
use crate::limiter::{ChatLimiter, InMemoryChatLimiter};
use crate::middleware::{RequestThrottle, throttle_requests};
use crate::response::HealthStatus;
use crate::static_files;

const THROTTLE_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Port to listen on.
    pub port: u16,
    /// Bind address.
    pub bind_address: String,
    /// Enable CORS.
    pub cors: bool,
    /// Development or production serving.
    pub deployment: Deployment,
    /// Directory of the built front end.
    pub public_dir: PathBuf,
    /// Per-client quota on `/api` routes; 0 disables throttling.
    pub requests_per_minute: u32,
    /// Contact relay settings.
    pub contact: ContactSettings,
    /// Chat relay settings.
    pub chat: ChatSettings,
}

impl GatewayConfig {
    /// Derive from the loaded configuration.
    #[must_use]
    pub fn from_core(config: &folio_core::Config) -> Self {
        Self {
            port: config.gateway.port,
            bind_address: config.gateway.bind_address(),
            cors: config.gateway.cors,
            deployment: config.gateway.deployment,
            public_dir: config.gateway.public_dir.clone(),
            requests_per_minute: config.gateway.requests_per_minute,
            contact: ContactSettings::from_config(&config.mail),
            chat: ChatSettings::from_config(&config.chat),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::from_core(&folio_core::Config::default())
    }
}

/// Gateway server state shared across handlers.
pub struct GatewayState {
    /// Chat message cap.
    pub limiter: Arc<dyn ChatLimiter>,
    /// Contact relay collaborator.
    pub mailer: Arc<dyn Mailer>,
    /// Chat relay collaborator.
    pub provider: Arc<dyn Provider>,
    /// Request throttle for `/api` routes, if enabled.
    pub throttle: Option<RequestThrottle>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

/// Gateway server.
pub struct Gateway {
    config: GatewayConfig,
    state: Arc<GatewayState>,
}

/// Builder for constructing a Gateway with its collaborators.
#[derive(Default)]
pub struct GatewayBuilder {
    config: GatewayConfig,
    mailer: Option<Arc<dyn Mailer>>,
    provider: Option<Arc<dyn Provider>>,
    limiter: Option<Arc<dyn ChatLimiter>>,
}

impl GatewayBuilder {
    /// Create a new builder with default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set gateway configuration.
    #[must_use]
    pub fn with_config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the mail collaborator.
    #[must_use]
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Set the completion collaborator.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Replace the in-memory chat limiter.
    #[must_use]
    pub fn with_limiter(mut self, limiter: Arc<dyn ChatLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Build the gateway.
    ///
    /// # Errors
    ///
    /// Returns error if the mailer or provider is not configured.
    pub fn build(self) -> Result<Gateway, GatewayError> {
        let mailer = self
            .mailer
            .ok_or_else(|| GatewayError::Config("Mailer is required".to_string()))?;
        let provider = self
            .provider
            .ok_or_else(|| GatewayError::Config("Completion provider is required".to_string()))?;

        let limit = self.config.chat.message_limit;
        let limiter = self
            .limiter
            .unwrap_or_else(|| Arc::new(InMemoryChatLimiter::new(limit)));

        let state = GatewayState {
            limiter,
            mailer,
            provider,
            throttle: RequestThrottle::from_quota(self.config.requests_per_minute),
            config: self.config.clone(),
        };

        Ok(Gateway {
            config: self.config,
            state: Arc::new(state),
        })
    }
}

impl Gateway {
    /// Shared handler state.
    #[must_use]
    pub const fn state(&self) -> &Arc<GatewayState> {
        &self.state
    }

    /// Gateway configuration.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Build the HTTP router.
    #[must_use]
    pub fn router(&self) -> Router {
        let state = self.state.clone();

        let api = Router::new()
            .route("/api/contact", post(contact_handler))
            .route("/api/chat", post(chat_handler))
            .route_layer(from_fn_with_state(state.clone(), throttle_requests))
            .route("/api/health", get(health_handler));

        let app = match self.config.deployment {
            Deployment::Development => api.route("/", get(index_handler)),
            Deployment::Production => {
                api.fallback_service(static_files::spa_service(&self.config.public_dir))
            }
        };

        let app = app.with_state(state).layer(TraceLayer::new_for_http());

        if self.config.cors {
            app.layer(CorsLayer::permissive())
        } else {
            app
        }
    }

    /// Run the gateway server until Ctrl+C.
    ///
    /// # Errors
    ///
    /// Returns error if the address is invalid, binding fails, or the server stops.
    pub async fn run(&self) -> Result<(), GatewayError> {
        let mailer = self.state.mailer.clone();
        tokio::spawn(async move {
            match mailer.verify().await {
                Ok(()) => tracing::info!("SMTP server is ready to send emails"),
                Err(e) => tracing::error!(error = %e, "SMTP connection error"),
            }
        });

        if self.state.throttle.is_some() {
            let state = self.state.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(THROTTLE_PRUNE_INTERVAL);
                loop {
                    interval.tick().await;
                    if let Some(throttle) = &state.throttle {
                        throttle.retain_recent();
                        tracing::trace!(clients = throttle.tracked(), "Pruned request throttle");
                    }
                }
            });
        }

        if self.config.deployment == Deployment::Production
            && !static_files::has_index(&self.config.public_dir)
        {
            tracing::warn!(
                dir = %self.config.public_dir.display(),
                "No index.html in public directory; front-end routes will return 404"
            );
        }

        let app = self.router();

        let addr: SocketAddr = format!("{}:{}", self.config.bind_address, self.config.port)
            .parse()
            .map_err(|e| GatewayError::Config(format!("Invalid address: {e}")))?;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(
            mode = self.config.deployment.as_str(),
            "Server running on http://{}",
            addr
        );

        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| GatewayError::Server(e.to_string()))?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

async fn index_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "Folio Portfolio API",
        "status": "running",
        "endpoints": {
            "health": "GET /api/health",
            "contact": "POST /api/contact",
            "chat": "POST /api/chat",
        },
    }))
}
