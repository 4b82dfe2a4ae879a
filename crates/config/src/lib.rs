//! Configuration loading, validation, and management for Cowork.
//!
//! Loads configuration from `~/.cowork/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.cowork/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Language model settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Agent loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// HTTP gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Google Workspace endpoints
    #[serde(default)]
    pub services: ServicesConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("agent", &self.agent)
            .field("gateway", &self.gateway)
            .field("services", &self.services)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_name")]
    pub name: String,

    #[serde(default = "default_model_base_url")]
    pub base_url: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_model_name() -> String {
    "gemini-2.0-flash".into()
}
fn default_model_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            base_url: default_model_base_url(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum tool rounds per chat request
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Per tool call timeout
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,

    /// Replaces the built-in system prompt when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,
}

fn default_max_iterations() -> u32 {
    5
}
fn default_tool_timeout_secs() -> u64 {
    30
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tool_timeout_secs: default_tool_timeout_secs(),
            system_prompt_override: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origin allowed by CORS (the web client)
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    5000
}
fn default_frontend_url() -> String {
    "http://localhost:5173".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            frontend_url: default_frontend_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    #[serde(default = "default_gmail_base_url")]
    pub gmail_base_url: String,

    #[serde(default = "default_calendar_base_url")]
    pub calendar_base_url: String,

    #[serde(default = "default_drive_base_url")]
    pub drive_base_url: String,

    #[serde(default = "default_docs_base_url")]
    pub docs_base_url: String,
}

fn default_gmail_base_url() -> String {
    "https://gmail.googleapis.com/gmail/v1".into()
}
fn default_calendar_base_url() -> String {
    "https://www.googleapis.com/calendar/v3".into()
}
fn default_drive_base_url() -> String {
    "https://www.googleapis.com/drive/v3".into()
}
fn default_docs_base_url() -> String {
    "https://docs.googleapis.com/v1".into()
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            gmail_base_url: default_gmail_base_url(),
            calendar_base_url: default_calendar_base_url(),
            drive_base_url: default_drive_base_url(),
            docs_base_url: default_docs_base_url(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.cowork/config.toml).
    ///
    /// Environment variables override the file:
    /// - `COWORK_GEMINI_API_KEY`, then `GEMINI_API_KEY`
    /// - `COWORK_MODEL`
    /// - `PORT`
    /// - `FRONTEND_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("COWORK_GEMINI_API_KEY").or_else(|| lookup("GEMINI_API_KEY")) {
            self.api_key = Some(key);
        }

        if let Some(model) = lookup("COWORK_MODEL") {
            self.model.name = model;
        }

        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(port) => self.gateway.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring unparseable PORT"),
            }
        }

        if let Some(url) = lookup("FRONTEND_URL") {
            self.gateway.frontend_url = url;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".cowork")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::ValidationError(
                "model.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be at least 1".into(),
            ));
        }

        if self.agent.tool_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "agent.tool_timeout_secs must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if a model API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Render the configuration as TOML with the API key removed.
    pub fn redacted_toml(&self) -> String {
        let mut shown = self.clone();
        if shown.api_key.is_some() {
            shown.api_key = Some("[REDACTED]".into());
        }
        toml::to_string_pretty(&shown).unwrap_or_default()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: ModelConfig::default(),
            agent: AgentConfig::default(),
            gateway: GatewayConfig::default(),
            services: ServicesConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
