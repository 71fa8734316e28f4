//! Serve command - run the portfolio backend.

use std::sync::Arc;

use anyhow::{Context, Result};

use folio_core::config::Deployment;
use folio_core::{Config, ConfigError};
use folio_gateway::GatewayConfig;
use folio_providers::{
    DeepSeekProvider, Mailer, Provider, SmtpMailer, UnavailableMailer, UnavailableProvider,
};

use crate::ui;

/// Serve command arguments.
#[derive(Debug, Clone, Default)]
pub struct ServeArgs {
    /// Port override.
    pub port: Option<u16>,
    /// Bind address override.
    pub bind: Option<String>,
    /// Serve the built front end.
    pub production: bool,
}

/// Start the server and block until shutdown.
pub async fn run_serve(config: Result<Config, ConfigError>, args: ServeArgs) -> Result<()> {
    let config = config.context("Failed to load configuration")?;

    let mut gateway_config = GatewayConfig::from_core(&config);
    if let Some(port) = args.port {
        gateway_config.port = port;
    }
    if let Some(bind) = args.bind {
        gateway_config.bind_address = bind;
    }
    if args.production {
        gateway_config.deployment = Deployment::Production;
    }

    let mailer = build_mailer(&config);
    let provider = build_provider(&config);

    ui::header("Starting Folio");
    ui::kv(
        "Address",
        &format!("{}:{}", gateway_config.bind_address, gateway_config.port),
    );
    ui::kv("Mode", gateway_config.deployment.as_str());
    ui::kv("Model", &gateway_config.chat.model);
    ui::kv("Chat limit", &gateway_config.chat.message_limit.to_string());
    if gateway_config.deployment == Deployment::Production {
        ui::kv("Public dir", &gateway_config.public_dir.display().to_string());
    }
    println!();

    folio_gateway::start(gateway_config, mailer, provider).await?;
    Ok(())
}

fn build_mailer(config: &Config) -> Arc<dyn Mailer> {
    match SmtpMailer::from_config(&config.mail) {
        Ok(mailer) => Arc::new(mailer),
        Err(e) => {
            tracing::warn!(error = %e, "Contact relay disabled");
            ui::warning(&format!("Contact relay disabled: {e}"));
            Arc::new(UnavailableMailer::new(e.to_string()))
        }
    }
}

fn build_provider(config: &Config) -> Arc<dyn Provider> {
    match DeepSeekProvider::from_config(&config.chat) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            tracing::warn!(error = %e, "Chat relay disabled");
            ui::warning(&format!("Chat relay disabled: {e}"));
            Arc::new(UnavailableProvider::new(e.to_string()))
        }
    }
}
