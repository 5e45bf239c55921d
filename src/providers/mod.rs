//! Provider module for SousChef
//!
//! This module contains the chat provider abstraction and the OpenAI
//! and Ollama implementations behind it.

pub mod base;
pub mod ollama;
pub mod openai;

pub use base::{collect_reply, ChatProvider, ChatTurn, ReplyStream};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use crate::config::Config;
use crate::error::{Result, SousChefError};
use std::time::Duration;

/// Create a provider instance based on configuration
///
/// # Arguments
///
/// * `config` - Application configuration naming the provider type
///
/// # Returns
///
/// Returns a boxed provider instance
///
/// # Errors
///
/// Returns error if the provider type is unknown or initialization fails
pub fn create_provider(config: &Config) -> Result<Box<dyn ChatProvider>> {
    create_provider_with_model(config, None)
}

/// Create a provider, optionally overriding the configured model
///
/// The override applies to whichever provider is selected, leaving the
/// configuration itself untouched.
pub fn create_provider_with_model(
    config: &Config,
    model_override: Option<&str>,
) -> Result<Box<dyn ChatProvider>> {
    let timeout = Duration::from_secs(config.chat.request_timeout_seconds);

    match config.provider.provider_type.as_str() {
        "openai" => {
            let mut provider_config = config.provider.openai.clone();
            if let Some(model) = model_override {
                provider_config.model = model.to_string();
            }
            Ok(Box::new(OpenAiProvider::new(provider_config, timeout)?))
        }
        "ollama" => {
            let mut provider_config = config.provider.ollama.clone();
            if let Some(model) = model_override {
                provider_config.model = model.to_string();
            }
            Ok(Box::new(OllamaProvider::new(provider_config, timeout)?))
        }
        other => {
            Err(SousChefError::Provider(format!("Unknown provider type: {}", other)).into())
        }
    }
}
