//! Configuration loading, validation, and management for Huddle.
//!
//! Loads configuration from `./huddle.toml` (or the file named by
//! `HUDDLE_CONFIG`) with environment variable overrides. Validates all
//! settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default config file name, resolved against the working directory.
pub const CONFIG_FILE: &str = "huddle.toml";

/// The root configuration structure.
///
/// Maps directly to `huddle.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Activity corpus settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Prompt fragment settings
    #[serde(default)]
    pub prompts: PromptsConfig,

    /// Completion provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Generation parameters sent with every completion
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path of the JSON search index
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,

    /// Base URL under which activity pages are published
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Extra or replacement type → URL segment mappings
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub categories: HashMap<String, String>,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("activities-search-index.json")
}
fn default_site_url() -> String {
    "https://activities.example.com".into()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            site_url: default_site_url(),
            categories: HashMap::new(),
        }
    }
}

/// How prompt fragments are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    /// Cache-first: each fragment is read from disk at most once.
    Production,
    /// Re-read on every request so prompt edits show up immediately.
    #[default]
    Development,
}

impl std::fmt::Display for PromptMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Development => write!(f, "development"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsConfig {
    /// Directory holding one file per fragment
    #[serde(default = "default_prompts_dir")]
    pub dir: PathBuf,

    /// Fragment file extension, without the dot
    #[serde(default = "default_prompts_extension")]
    pub extension: String,

    #[serde(default)]
    pub mode: PromptMode,
}

fn default_prompts_dir() -> PathBuf {
    PathBuf::from("prompts")
}
fn default_prompts_extension() -> String {
    "md".into()
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            dir: default_prompts_dir(),
            extension: default_prompts_extension(),
            mode: PromptMode::default(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider name (used in logs and for well-known base URLs)
    #[serde(default = "default_provider")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider(),
            api_key: None,
            api_url: None,
            model: default_model(),
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_max_tokens() -> u32 {
    4000
}
fn default_temperature() -> f32 {
    0.7
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Allow cross-origin requests from any origin (local UI development)
    #[serde(default = "default_true")]
    pub permissive_cors: bool,
}

fn default_port() -> u16 {
    3000
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            permissive_cors: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from `HUDDLE_CONFIG` or `./huddle.toml`.
    ///
    /// Environment overrides, applied after the file:
    /// - `HUDDLE_API_KEY`, then `OPENAI_API_KEY` (only when no key is configured)
    /// - `HUDDLE_MODEL`
    /// - `HUDDLE_ENV=production` switches prompts to production mode
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Like [`AppConfig::load`], but an explicit path wins over `HUDDLE_CONFIG`.
    pub fn load_with(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = Self::resolve_path(path, |key| std::env::var(key).ok());
        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// The file to read: `explicit`, then `HUDDLE_CONFIG`, then `./huddle.toml`.
    pub fn resolve_path<F>(explicit: Option<&Path>, lookup: F) -> PathBuf
    where
        F: Fn(&str) -> Option<String>,
    {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| lookup("HUDDLE_CONFIG").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
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

    /// Apply environment overrides using the given lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.provider.api_key.is_none() {
            self.provider.api_key = lookup("HUDDLE_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        }

        if let Some(model) = lookup("HUDDLE_MODEL") {
            self.provider.model = model;
        }

        if let Some(env) = lookup("HUDDLE_ENV") {
            self.prompts.mode = if env.eq_ignore_ascii_case("production") {
                PromptMode::Production
            } else {
                PromptMode::Development
            };
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::ValidationError(
                "generation.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.generation.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "generation.max_tokens must be > 0".into(),
            ));
        }

        if self.prompts.extension.trim().is_empty() || self.prompts.extension.contains('/') {
            return Err(ConfigError::ValidationError(
                "prompts.extension must be a bare file extension".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.provider.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
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
