//! Configuration management for SousChef
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//!
//! The freemium gating knobs (session length, frequency, ad duration)
//! are deliberately not here: they are admin-adjustable and live in the
//! settings store. This file covers the local, per-installation values:
//! which chat provider to talk to, where the database lives, and the
//! development-mode switches.

use crate::error::{Result, SousChefError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for SousChef
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Chat-completion provider configuration (OpenAI, Ollama)
    pub provider: ProviderConfig,

    /// Session-gating switches (development overrides)
    #[serde(default)]
    pub session: SessionConfig,

    /// Chat behavior configuration
    #[serde(default)]
    pub chat: ChatConfig,

    /// Local storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Provider configuration
///
/// Specifies which chat-completion provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type")]
    pub provider_type: String,

    /// OpenAI configuration
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

/// OpenAI provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Model to use for chat completions
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// API key; falls back to the `OPENAI_API_KEY` environment variable
    #[serde(default)]
    pub api_key: Option<String>,

    /// Optional API base URL (useful for tests and local mocks)
    ///
    /// When set, this base is used to build the chat-completions endpoint,
    /// which allows tests to point the provider at a mock server.
    #[serde(default)]
    pub api_base: Option<String>,

    /// Cheaper model used by the credential verification check
    #[serde(default = "default_verify_model")]
    pub verify_model: String,
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_verify_model() -> String {
    "gpt-3.5-turbo".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: default_openai_model(),
            api_key: None,
            api_base: None,
            verify_model: default_verify_model(),
        }
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model to use for Ollama
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:latest".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
        }
    }
}

/// Session-gating switches
///
/// Both flags exist for development and default to off. Production
/// behavior is the enforcing path: eligibility is evaluated and provider
/// credentials are verified before a session opens.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Skip the free-tier eligibility check entirely
    #[serde(default)]
    pub bypass_eligibility: bool,

    /// Skip the provider credential verification call at session start
    #[serde(default)]
    pub skip_verification: bool,
}

/// Chat behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Timeout for a single completion request (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Featured-recipe fallback size when no dietary tags match
    #[serde(default = "default_featured_count")]
    pub featured_count: usize,
}

fn default_request_timeout() -> u64 {
    120
}

fn default_featured_count() -> usize {
    3
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: default_request_timeout(),
            featured_count: default_featured_count(),
        }
    }
}

/// Local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Database file path; when unset the platform data directory is used
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            provider: ProviderConfig {
                provider_type: "openai".to_string(),
                openai: OpenAiConfig::default(),
                ollama: OllamaConfig::default(),
            },
            session: SessionConfig::default(),
            chat: ChatConfig::default(),
            storage: StorageConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SousChefError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| SousChefError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        // Provider overrides
        if let Ok(provider_type) = std::env::var("SOUSCHEF_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(model) = std::env::var("SOUSCHEF_OPENAI_MODEL") {
            self.provider.openai.model = model;
        }

        if let Ok(api_base) = std::env::var("SOUSCHEF_OPENAI_API_BASE") {
            self.provider.openai.api_base = Some(api_base);
        }

        if let Ok(ollama_host) = std::env::var("SOUSCHEF_OLLAMA_HOST") {
            self.provider.ollama.host = ollama_host;
        }

        if let Ok(ollama_model) = std::env::var("SOUSCHEF_OLLAMA_MODEL") {
            self.provider.ollama.model = ollama_model;
        }

        // Session gating overrides
        if let Ok(bypass) = std::env::var("SOUSCHEF_BYPASS_ELIGIBILITY") {
            match bypass.parse::<bool>() {
                Ok(v) => self.session.bypass_eligibility = v,
                Err(_) => {
                    tracing::warn!("Invalid SOUSCHEF_BYPASS_ELIGIBILITY: {}", bypass);
                }
            }
        }

        if let Ok(skip) = std::env::var("SOUSCHEF_SKIP_VERIFICATION") {
            match skip.parse::<bool>() {
                Ok(v) => self.session.skip_verification = v,
                Err(_) => {
                    tracing::warn!("Invalid SOUSCHEF_SKIP_VERIFICATION: {}", skip);
                }
            }
        }

        // Chat overrides
        if let Ok(timeout) = std::env::var("SOUSCHEF_REQUEST_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.chat.request_timeout_seconds = value;
            } else {
                tracing::warn!("Invalid SOUSCHEF_REQUEST_TIMEOUT_SECONDS: {}", timeout);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(ref provider) = cli.provider {
            self.provider.provider_type = provider.clone();
        }

        if let Some(ref db) = cli.db {
            self.storage.path = Some(db.clone());
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Returns
    ///
    /// Returns Ok if configuration is valid
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(SousChefError::Config("Provider type cannot be empty".to_string()).into());
        }

        let valid_providers = ["openai", "ollama"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(SousChefError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        if let Some(ref api_base) = self.provider.openai.api_base {
            url::Url::parse(api_base).map_err(|e| {
                SousChefError::Config(format!("Invalid openai.api_base URL: {}", e))
            })?;
        }

        url::Url::parse(&self.provider.ollama.host)
            .map_err(|e| SousChefError::Config(format!("Invalid ollama.host URL: {}", e)))?;

        if self.chat.request_timeout_seconds == 0 {
            return Err(SousChefError::Config(
                "chat.request_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.chat.featured_count == 0 {
            return Err(SousChefError::Config(
                "chat.featured_count must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
