//! Status command - query a running server.

use std::time::Duration;

use anyhow::Result;

use folio_core::{Config, ConfigError};
use folio_gateway::response::HealthStatus;

use crate::ui::{self, CheckStatus};

/// Status command arguments.
#[derive(Debug, Clone, Default)]
pub struct StatusArgs {
    /// Port to query instead of the configured one.
    pub port: Option<u16>,
}

/// Run the status command.
pub async fn run_status(config: Result<Config, ConfigError>, args: StatusArgs) -> Result<()> {
    ui::header("Folio Status");

    let config = config.unwrap_or_else(|e| {
        ui::warning(&format!("Configuration not loaded ({e}), using defaults"));
        Config::default()
    });
    let port = args.port.unwrap_or(config.gateway.port);

    ui::kv("Port", &port.to_string());
    match fetch_health(port).await {
        Ok(health) => {
            ui::health_check("Server", CheckStatus::Ok, Some("running"));
            ui::kv("Reported at", &health.timestamp);
        }
        Err(e) => {
            ui::health_check("Server", CheckStatus::Error, Some(&e));
            ui::info("Start with: folio serve");
        }
    }

    Ok(())
}

/// Fetch `/api/health` from a local instance.
async fn fetch_health(port: u16) -> Result<HealthStatus, String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .map_err(|e| e.to_string())?;

    let resp = client
        .get(format!("http://127.0.0.1:{port}/api/health"))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !resp.status().is_success() {
        return Err(format!("HTTP {}", resp.status()));
    }

    let health: HealthStatus = resp.json().await.map_err(|e| e.to_string())?;
    if health.status == "ok" {
        Ok(health)
    } else {
        Err(format!("status {}", health.status))
    }
}
