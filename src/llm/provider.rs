//! LLM provider trait and model-id routing.

use std::fmt;

use async_trait::async_trait;

use super::error::LLMError;
use super::types::{ChatRequest, ChatStream};

/// Trait for LLM providers with different API formats.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Start a streaming chat completion request.
    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream, LLMError>;
}

/// A known completion provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Gemini,
    DeepSeek,
}

impl Provider {
    /// The environment variable holding this provider's API key.
    pub fn env_var(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }

    /// Split a `provider/model` identifier into the provider and the
    /// provider-native model name.
    ///
    /// Identifiers without a recognized prefix route to OpenAI unchanged;
    /// whether they name a real model is for the API to decide.
    pub fn route(model: &str) -> (Provider, &str) {
        match model.split_once('/') {
            Some(("openai", rest)) => (Provider::OpenAi, rest),
            Some(("anthropic", rest)) => (Provider::Anthropic, rest),
            Some(("gemini", rest)) => (Provider::Gemini, rest),
            Some(("deepseek", rest)) => (Provider::DeepSeek, rest),
            _ => (Provider::OpenAi, model),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
            Provider::DeepSeek => "deepseek",
        };
        f.write_str(name)
    }
}
