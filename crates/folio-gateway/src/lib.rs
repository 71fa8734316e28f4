//! # Folio Gateway
//!
//! HTTP gateway for the portfolio site: relays contact-form submissions to
//! the mail collaborator, relays chat transcripts to the completion
//! collaborator behind a per-client message cap, reports health, and serves
//! the built front end in production.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chat;
mod contact;
/// Per-client chat message cap.
pub mod limiter;
mod middleware;
/// HTTP response bodies and error mapping.
pub mod response;
mod server;
mod static_files;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use folio_providers::{Mailer, Provider};

pub use chat::{ChatSettings, FALLBACK_REPLY, SYSTEM_PROMPT};
pub use contact::{ContactSettings, render_contact_email};
pub use limiter::{ChatLimiter, InMemoryChatLimiter};
pub use middleware::{ClientAddr, RequestThrottle};
pub use response::ApiError;
pub use server::{Gateway, GatewayBuilder, GatewayConfig, GatewayState};

/// Start the gateway server with the given collaborators.
///
/// # Errors
///
/// Returns error if server fails to start.
pub async fn start(
    config: GatewayConfig,
    mailer: Arc<dyn Mailer>,
    provider: Arc<dyn Provider>,
) -> Result<(), GatewayError> {
    let gateway = GatewayBuilder::new()
        .with_config(config)
        .with_mailer(mailer)
        .with_provider(provider)
        .build()?;
    gateway.run().await
}

/// Gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Server error.
    #[error("Server error: {0}")]
    Server(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
