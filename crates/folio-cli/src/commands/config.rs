//! Config command - show or validate the effective configuration.

use anyhow::Result;

use folio_core::secrets::redact;
use folio_core::{Config, ConfigError};

use crate::ui;

/// Config actions.
#[derive(Debug, Clone, Copy, Default)]
pub enum ConfigAction {
    /// Print the effective configuration.
    #[default]
    Show,
    /// Validate only.
    Validate,
}

/// Run the config command.
pub fn run_config(config: Result<Config, ConfigError>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = config?;
            println!("{}", serde_json::to_string_pretty(&redacted(&config)?)?);
            Ok(())
        }
        ConfigAction::Validate => match config {
            Ok(_) => {
                ui::success("Configuration is valid");
                Ok(())
            }
            Err(e) => {
                ui::error(&format!("Configuration is invalid: {e}"));
                Err(e.into())
            }
        },
    }
}

/// Effective configuration as JSON with credentials masked.
fn redacted(config: &Config) -> Result<serde_json::Value> {
    let mut value = serde_json::to_value(config)?;
    value["mail"]["password"] = redact(config.mail.password.as_deref()).into();
    value["chat"]["apiKey"] = redact(config.chat.api_key.as_deref()).into();
    Ok(value)
}
