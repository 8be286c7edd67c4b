//! Configuration loading, validation, and management for WebScout.
//!
//! Loads configuration from `~/.webscout/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Smallest page excerpt the fetch tool will return.
pub const MIN_FETCH_CHARS: usize = 200;
/// Largest page excerpt the fetch tool will return.
pub const MAX_FETCH_CHARS: usize = 8000;

/// The root configuration structure.
///
/// Maps directly to `~/.webscout/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model used by the agent
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature for agent steps
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per agent step
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Hard ceiling on reasoning steps per run
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,

    /// Stream model output (SSE) instead of waiting for whole responses
    #[serde(default = "default_true")]
    pub stream: bool,

    /// Replace the built-in research system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Web tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Answer grading settings
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_max_steps() -> u32 {
    6
}
fn default_true() -> bool {
    true
}

/// Redact a secret string for Debug output.
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
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_steps", &self.max_steps)
            .field("top_p", &self.top_p)
            .field("top_k", &self.top_k)
            .field("stream", &self.stream)
            .field("system_prompt", &self.system_prompt.as_ref().map(|_| "[custom]"))
            .field("tools", &self.tools)
            .field("evaluator", &self.evaluator)
            .finish()
    }
}

/// Settings shared by the web tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// HTML search endpoint queried by `web_search`
    #[serde(default = "default_search_url")]
    pub search_url: String,

    /// Cap on results returned by `web_search`
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,

    /// Excerpt length `fetch_page` uses when the model gives none
    #[serde(default = "default_fetch_chars")]
    pub default_fetch_chars: usize,

    /// Per-request HTTP timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_search_url() -> String {
    "https://html.duckduckgo.com/html/".into()
}
fn default_max_search_results() -> usize {
    5
}
fn default_fetch_chars() -> usize {
    2000
}
fn default_timeout_secs() -> u64 {
    20
}
fn default_user_agent() -> String {
    concat!("webscout/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            max_search_results: default_max_search_results(),
            default_fetch_chars: default_fetch_chars(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Grading model; falls back to the agent model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default = "default_eval_max_tokens")]
    pub max_tokens: u32,
}

fn default_eval_max_tokens() -> u32 {
    512
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: default_eval_max_tokens(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.webscout/config.toml).
    ///
    /// Environment variables override the file:
    /// - `WEBSCOUT_API_KEY`, then `OPENAI_API_KEY`, then `OPENROUTER_API_KEY`
    /// - `WEBSCOUT_API_URL`, `WEBSCOUT_MODEL`, `WEBSCOUT_MAX_STEPS`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
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
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api_key.is_none() {
            self.api_key = lookup("WEBSCOUT_API_KEY")
                .or_else(|| lookup("OPENAI_API_KEY"))
                .or_else(|| lookup("OPENROUTER_API_KEY"));
        }

        if let Some(url) = lookup("WEBSCOUT_API_URL") {
            self.api_url = url;
        }

        if let Some(model) = lookup("WEBSCOUT_MODEL") {
            self.model = model;
        }

        if let Some(steps) = lookup("WEBSCOUT_MAX_STEPS") {
            self.max_steps = steps.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "WEBSCOUT_MAX_STEPS must be a positive integer, got '{steps}'"
                ))
            })?;
        }

        self.validate()
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".webscout")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.max_steps == 0 {
            return Err(ConfigError::ValidationError(
                "max_steps must be at least 1".into(),
            ));
        }

        if let Some(top_p) = self.top_p
            && !(top_p > 0.0 && top_p <= 1.0)
        {
            return Err(ConfigError::ValidationError(
                "top_p must be in (0.0, 1.0]".into(),
            ));
        }

        if !(MIN_FETCH_CHARS..=MAX_FETCH_CHARS).contains(&self.tools.default_fetch_chars) {
            return Err(ConfigError::ValidationError(format!(
                "tools.default_fetch_chars must be between {MIN_FETCH_CHARS} and {MAX_FETCH_CHARS}"
            )));
        }

        if self.tools.max_search_results == 0 {
            return Err(ConfigError::ValidationError(
                "tools.max_search_results must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The model used by the evaluator.
    pub fn evaluator_model(&self) -> &str {
        self.evaluator.model.as_deref().unwrap_or(&self.model)
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
            api_url: default_api_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_steps: default_max_steps(),
            top_p: None,
            top_k: None,
            stream: true,
            system_prompt: None,
            tools: ToolsConfig::default(),
            evaluator: EvaluatorConfig::default(),
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
