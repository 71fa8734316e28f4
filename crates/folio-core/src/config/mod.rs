//! Configuration loading and validation.
//!
//! Configuration is a JSON5 file (`folio.json5` by default) layered under
//! environment overrides. Every field has a default, so a bare environment
//! is a valid deployment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::secrets::ApiKey;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "FOLIO_CONFIG";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON5 parsing error.
    #[error("Parse error: {0}")]
    Parse(#[from] json5::Error),

    /// Config validation error.
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Contact relay mail configuration.
    #[serde(default)]
    pub mail: MailConfig,

    /// Chat relay configuration.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Global settings.
    #[serde(default)]
    pub settings: GlobalSettings,
}

impl Config {
    /// Load configuration from the default location, then apply the process
    /// environment.
    ///
    /// The file is `$FOLIO_CONFIG` if set, otherwise `./folio.json5` if it
    /// exists; with neither, defaults are used.
    ///
    /// # Errors
    ///
    /// Returns error if an existing config cannot be loaded or the result is
    /// invalid.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Load configuration from `path` (or the default location when `None`)
    /// and apply the process environment.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed, or if the merged
    /// configuration is invalid.
    pub fn load_with(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);
        let mut config = match path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading configuration");
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path without env overrides.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = json5::from_str(&content)?;
        Ok(config)
    }

    /// Get the default config file path, if one applies.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        let local = PathBuf::from("folio.json5");
        local.exists().then_some(local)
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// Recognised variables: `PORT`, `FOLIO_ENV`, `GMAIL_USER`,
    /// `GMAIL_APP_PASSWORD`, `CONTACT_RECEIVER`, `DEEPSEEK_API_KEY`,
    /// `FOLIO_LOG_FORMAT`. Unparseable values are ignored with a warning.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(port) => self.gateway.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid PORT"),
            }
        }

        if let Some(env) = lookup("FOLIO_ENV") {
            match env.to_ascii_lowercase().as_str() {
                "production" | "prod" => self.gateway.deployment = Deployment::Production,
                "development" | "dev" => self.gateway.deployment = Deployment::Development,
                other => tracing::warn!(value = %other, "Ignoring invalid FOLIO_ENV"),
            }
        }

        if let Some(user) = lookup("GMAIL_USER") {
            self.mail.username = Some(user);
        }
        if let Some(password) = lookup("GMAIL_APP_PASSWORD") {
            self.mail.password = Some(password);
        }
        if let Some(receiver) = lookup("CONTACT_RECEIVER") {
            self.mail.receiver = Some(receiver);
        }
        if let Some(key) = lookup("DEEPSEEK_API_KEY") {
            self.chat.api_key = Some(key);
        }

        if let Some(format) = lookup("FOLIO_LOG_FORMAT") {
            match format.to_ascii_lowercase().as_str() {
                "json" => self.settings.log_format = LogFormat::Json,
                "pretty" => self.settings.log_format = LogFormat::Pretty,
                other => tracing::warn!(value = %other, "Ignoring invalid FOLIO_LOG_FORMAT"),
            }
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` describing the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.port == 0 {
            return Err(ConfigError::Validation(
                "Gateway port cannot be 0".to_string(),
            ));
        }

        if self.chat.model.trim().is_empty() {
            return Err(ConfigError::Validation("Chat model cannot be empty".to_string()));
        }

        if !(0.0..=2.0).contains(&self.chat.temperature) {
            return Err(ConfigError::Validation(format!(
                "Chat temperature must be within 0.0..=2.0, got {}",
                self.chat.temperature
            )));
        }

        if self.chat.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "Chat maxTokens must be positive".to_string(),
            ));
        }

        if self.chat.message_limit == 0 {
            return Err(ConfigError::Validation(
                "Chat messageLimit must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address mode.
    #[serde(default)]
    pub mode: BindMode,

    /// Enable CORS.
    #[serde(default = "default_true")]
    pub cors: bool,

    /// Development or production serving.
    #[serde(default)]
    pub deployment: Deployment,

    /// Directory holding the built front end (production only).
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Per-client request quota for `/api` routes; 0 disables throttling.
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
}

impl GatewayConfig {
    /// Resolve the bind address for the configured mode.
    #[must_use]
    pub fn bind_address(&self) -> String {
        match &self.mode {
            BindMode::Local => "127.0.0.1".to_string(),
            BindMode::Public => "0.0.0.0".to_string(),
            BindMode::Custom(addr) => addr.clone(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            mode: BindMode::default(),
            cors: true,
            deployment: Deployment::default(),
            public_dir: default_public_dir(),
            requests_per_minute: default_requests_per_minute(),
        }
    }
}

const fn default_port() -> u16 {
    5000
}

const fn default_true() -> bool {
    true
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

const fn default_requests_per_minute() -> u32 {
    100
}

/// Gateway bind mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    /// Bind to localhost only.
    Local,
    /// Bind to all interfaces.
    #[default]
    Public,
    /// Custom bind address.
    Custom(String),
}

/// Deployment mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Deployment {
    /// API only; `/` describes the endpoints.
    #[default]
    Development,
    /// API plus the built front end with SPA fallback.
    Production,
}

impl Deployment {
    /// Display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// Contact relay mail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailConfig {
    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP port (implicit TLS).
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username; also the sender address.
    #[serde(default)]
    pub username: Option<String>,

    /// SMTP password (prefer `GMAIL_APP_PASSWORD`).
    #[serde(default)]
    pub password: Option<String>,

    /// Recipient of contact messages; defaults to the username.
    #[serde(default)]
    pub receiver: Option<String>,

    /// Display name on the sender address.
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Prefix prepended to every relayed subject.
    #[serde(default = "default_subject_tag")]
    pub subject_tag: String,

    /// Footer line of the rendered email.
    #[serde(default = "default_footer")]
    pub footer: String,
}

impl MailConfig {
    /// SMTP password as a secret, if configured.
    #[must_use]
    pub fn password_secret(&self) -> Option<ApiKey> {
        self.password.clone().map(ApiKey::new)
    }

    /// Address contact messages are delivered to.
    #[must_use]
    pub fn recipient(&self) -> Option<&str> {
        self.receiver.as_deref().or(self.username.as_deref())
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            receiver: None,
            from_name: default_from_name(),
            subject_tag: default_subject_tag(),
            footer: default_footer(),
        }
    }
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

const fn default_smtp_port() -> u16 {
    465
}

fn default_from_name() -> String {
    "Portfolio Contact".to_string()
}

fn default_subject_tag() -> String {
    "[Portfolio]".to_string()
}

fn default_footer() -> String {
    "Portfolio".to_string()
}

/// Chat relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatConfig {
    /// Base URL of the OpenAI-compatible completion API.
    #[serde(default = "default_chat_base_url")]
    pub base_url: String,

    /// API key (prefer `DEEPSEEK_API_KEY`).
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Temperature for sampling.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens in a reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Chat requests admitted per client before it is limited.
    #[serde(default = "default_message_limit")]
    pub message_limit: u32,

    /// System prompt override; the built-in prompt is used when unset.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl ChatConfig {
    /// API key as a secret, if configured.
    #[must_use]
    pub fn api_key_secret(&self) -> Option<ApiKey> {
        self.api_key.clone().map(ApiKey::new)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_chat_base_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            message_limit: default_message_limit(),
            system_prompt: None,
        }
    }
}

fn default_chat_base_url() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

const fn default_temperature() -> f32 {
    0.7
}

const fn default_max_tokens() -> u32 {
    150
}

const fn default_message_limit() -> u32 {
    3
}

/// Global settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    /// Enable debug logging.
    #[serde(default)]
    pub debug: bool,

    /// Log format.
    #[serde(default)]
    pub log_format: LogFormat,
}

/// Log format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format.
    #[default]
    Pretty,
    /// JSON format.
    Json,
}
