//! Doctor command - check configuration completeness.

use anyhow::Result;

use folio_core::config::Deployment;
use folio_core::{Config, ConfigError};
use folio_providers::{Mailer, SmtpMailer};

use crate::ui::{self, CheckStatus};

/// Doctor command arguments.
#[derive(Debug, Clone, Default)]
pub struct DoctorArgs {
    /// Connect to the SMTP server with the configured credentials.
    pub smtp: bool,
}

/// Outcome of one check.
enum CheckResult {
    Ok(Option<String>),
    Warning(String),
    Error(String),
}

/// Run checks over the effective configuration.
pub async fn run_doctor(config: Result<Config, ConfigError>, args: DoctorArgs) -> Result<()> {
    ui::header("Folio Doctor");
    println!();

    let config = match config {
        Ok(config) => {
            ui::health_check("Configuration", CheckStatus::Ok, None);
            config
        }
        Err(e) => {
            ui::health_check("Configuration", CheckStatus::Error, Some(&e.to_string()));
            anyhow::bail!("configuration is invalid");
        }
    };

    let mut issues = 0;
    let checks = [
        ("Mail credentials", check_mail_credentials(&config)),
        ("Mail receiver", check_receiver(&config)),
        ("Chat API key", check_chat_key(&config)),
        ("Front end", check_public_dir(&config)),
    ];

    for (name, result) in checks {
        if report(name, result) {
            issues += 1;
        }
    }

    if args.smtp {
        ui::info("Probing SMTP server...");
        if report("SMTP", check_smtp(&config).await) {
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        ui::success("All checks passed");
    } else {
        ui::warning(&format!("{issues} issue(s) found"));
    }

    Ok(())
}

/// Print a check and return whether it counts as an issue.
fn report(name: &str, result: CheckResult) -> bool {
    match result {
        CheckResult::Ok(detail) => {
            ui::health_check(name, CheckStatus::Ok, detail.as_deref());
            false
        }
        CheckResult::Warning(msg) => {
            ui::health_check(name, CheckStatus::Warning, Some(&msg));
            true
        }
        CheckResult::Error(msg) => {
            ui::health_check(name, CheckStatus::Error, Some(&msg));
            true
        }
    }
}

fn is_set(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

fn check_mail_credentials(config: &Config) -> CheckResult {
    match (
        is_set(config.mail.username.as_deref()),
        is_set(config.mail.password.as_deref()),
    ) {
        (true, true) => CheckResult::Ok(Some(format!(
            "{}:{}",
            config.mail.smtp_host, config.mail.smtp_port
        ))),
        (false, _) => CheckResult::Error("GMAIL_USER is not set".to_string()),
        (true, false) => CheckResult::Error("GMAIL_APP_PASSWORD is not set".to_string()),
    }
}

fn check_receiver(config: &Config) -> CheckResult {
    if is_set(config.mail.receiver.as_deref()) {
        CheckResult::Ok(config.mail.receiver.clone())
    } else if let Some(fallback) = config.mail.recipient() {
        CheckResult::Warning(format!("CONTACT_RECEIVER not set, using {fallback}"))
    } else {
        CheckResult::Error("no receiver or mail username configured".to_string())
    }
}

fn check_chat_key(config: &Config) -> CheckResult {
    if is_set(config.chat.api_key.as_deref()) {
        CheckResult::Ok(Some(folio_core::secrets::redact(
            config.chat.api_key.as_deref(),
        )))
    } else {
        CheckResult::Error("DEEPSEEK_API_KEY is not set".to_string())
    }
}

fn check_public_dir(config: &Config) -> CheckResult {
    let index = config.gateway.public_dir.join("index.html");
    match (config.gateway.deployment, index.is_file()) {
        (_, true) => CheckResult::Ok(Some(index.display().to_string())),
        (Deployment::Production, false) => {
            CheckResult::Error(format!("{} not found", index.display()))
        }
        (Deployment::Development, false) => {
            CheckResult::Ok(Some("not built (development mode)".to_string()))
        }
    }
}

async fn check_smtp(config: &Config) -> CheckResult {
    let mailer = match SmtpMailer::from_config(&config.mail) {
        Ok(mailer) => mailer,
        Err(e) => return CheckResult::Error(e.to_string()),
    };

    match mailer.verify().await {
        Ok(()) => CheckResult::Ok(Some("ready to send".to_string())),
        Err(e) => CheckResult::Error(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mail_credentials_check() {
        let mut config = Config::default();
        assert!(matches!(check_mail_credentials(&config), CheckResult::Error(_)));

        config.mail.username = Some("bot@example.com".to_string());
        config.mail.password = Some("app-password".to_string());
        assert!(matches!(check_mail_credentials(&config), CheckResult::Ok(_)));
    }

    #[test]
    fn test_receiver_falls_back() {
        let mut config = Config::default();
        assert!(matches!(check_receiver(&config), CheckResult::Error(_)));

        config.mail.username = Some("bot@example.com".to_string());
        assert!(matches!(check_receiver(&config), CheckResult::Warning(_)));

        config.mail.receiver = Some("owner@example.com".to_string());
        assert!(matches!(check_receiver(&config), CheckResult::Ok(_)));
    }

    #[test]
    fn test_public_dir_required_in_production() {
        let mut config = Config::default();
        config.gateway.public_dir = std::path::PathBuf::from("/nonexistent/folio-public");
        assert!(matches!(check_public_dir(&config), CheckResult::Ok(_)));

        config.gateway.deployment = Deployment::Production;
        assert!(matches!(check_public_dir(&config), CheckResult::Error(_)));
    }
}
