//! Provider registry for managing LLM provider instances.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::anthropic::AnthropicProvider;
use super::openai::OpenAICompatibleProvider;
use super::provider::{LLMProvider, Provider};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";

/// Registry of LLM providers, keyed by provider type.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<Provider, Arc<dyn LLMProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize providers from environment variables.
    ///
    /// Each recognized API key yields one provider; Gemini and DeepSeek are
    /// served through their OpenAI-compatible endpoints.
    pub fn from_env() -> Self {
        let mut registry = Self::new();

        if let Ok(api_key) = std::env::var(Provider::OpenAi.env_var()) {
            let provider =
                OpenAICompatibleProvider::new(OPENAI_BASE_URL.to_string(), Some(api_key));
            registry.register(Provider::OpenAi, Arc::new(provider));
            info!("Registered OpenAI provider");
        }

        if let Ok(api_key) = std::env::var(Provider::Anthropic.env_var()) {
            let provider =
                AnthropicProvider::new(api_key, AnthropicProvider::DEFAULT_BASE_URL.to_string());
            registry.register(Provider::Anthropic, Arc::new(provider));
            info!("Registered Anthropic provider");
        }

        if let Ok(api_key) = std::env::var(Provider::Gemini.env_var()) {
            let provider =
                OpenAICompatibleProvider::new(GEMINI_BASE_URL.to_string(), Some(api_key));
            registry.register(Provider::Gemini, Arc::new(provider));
            info!("Registered Gemini provider");
        }

        if let Ok(api_key) = std::env::var(Provider::DeepSeek.env_var()) {
            let provider =
                OpenAICompatibleProvider::new(DEEPSEEK_BASE_URL.to_string(), Some(api_key));
            registry.register(Provider::DeepSeek, Arc::new(provider));
            info!("Registered DeepSeek provider");
        }

        if registry.providers.is_empty() {
            warn!(
                "No LLM providers configured. \
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, GEMINI_API_KEY, or DEEPSEEK_API_KEY."
            );
        }

        registry
    }

    /// Register a provider implementation.
    pub fn register(&mut self, provider: Provider, implementation: Arc<dyn LLMProvider>) {
        self.providers.insert(provider, implementation);
    }

    /// Get a provider by type.
    pub fn get(&self, provider: &Provider) -> Option<Arc<dyn LLMProvider>> {
        self.providers.get(provider).cloned()
    }
}
