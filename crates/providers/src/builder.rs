//! Provider construction from configuration.

use std::sync::Arc;

use huddle_config::AppConfig;
use huddle_core::provider::Provider;
use tracing::{info, warn};

use crate::openai_compat::OpenAiCompatProvider;

/// Build the completion provider described by `config.provider`.
///
/// Every supported backend speaks the OpenAI chat-completions protocol, so
/// the name only selects a default base URL when `api_url` is unset.
pub fn build_from_config(config: &AppConfig) -> Arc<dyn Provider> {
    let provider = configured(config);

    if provider.requires_key() && !provider.has_api_key() {
        warn!(provider = %config.provider.name, "No API key configured, generation requests will fail");
    }

    info!(
        provider = %config.provider.name,
        base_url = %provider.base_url(),
        model = %config.provider.model,
        "Provider configured"
    );
    Arc::new(provider)
}

fn configured(config: &AppConfig) -> OpenAiCompatProvider {
    let provider_config = &config.provider;
    let base_url = provider_config
        .api_url
        .clone()
        .unwrap_or_else(|| default_base_url(&provider_config.name));

    OpenAiCompatProvider::new(&provider_config.name, base_url, provider_config.api_key.clone())
}

/// Get the default base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "deepseek" => "https://api.deepseek.com/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => "https://api.openai.com/v1".into(),
    }
}
