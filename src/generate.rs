//! Streaming text generation with notebook-friendly defaults.

use std::io::Write;

use futures::StreamExt;

use crate::llm::{
    ChatRequest, LLMError, Message, Provider, ProviderRegistry, Role, StreamEvent,
};

/// Model used when the caller does not name one.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o";

/// Options for a single generation call.
///
/// `Default` gives the notebook defaults: `openai/gpt-4o`, no system prompt,
/// token-by-token echo on, 200 output tokens.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// `provider/model` identifier.
    pub model: String,
    /// System prompt; empty means no system message.
    pub system_prompt: String,
    /// Echo each fragment to stdout as it arrives.
    pub verbose: bool,
    /// Sampling temperature (0 = deterministic, 1 = very random).
    pub temperature: Option<f32>,
    /// Output token budget.
    pub max_tokens: u32,
    /// Provider-specific pass-through options, sent as-is in the request
    /// body. `stream` is owned by the transport and ignored here.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: String::new(),
            verbose: true,
            temperature: None,
            max_tokens: 200,
            extra: serde_json::Map::new(),
        }
    }
}

/// Text generator bound to a set of configured providers.
pub struct Generator {
    providers: ProviderRegistry,
}

impl Generator {
    pub fn new(providers: ProviderRegistry) -> Self {
        Self { providers }
    }

    /// Build a generator from API keys in the process environment.
    pub fn from_env() -> Self {
        Self::new(ProviderRegistry::from_env())
    }

    /// Generate the full completion text for `user_prompt`.
    ///
    /// The request always streams internally; fragments are aggregated in
    /// arrival order and, when `verbose` is set, echoed to stdout and flushed
    /// as they arrive. Provider failures propagate unhandled.
    pub async fn generate_text(
        &self,
        user_prompt: &str,
        opts: &GenerateOptions,
    ) -> Result<String, LLMError> {
        let (provider_id, model) = Provider::route(&opts.model);
        let provider = self
            .providers
            .get(&provider_id)
            .ok_or(LLMError::NotConfigured(provider_id))?;

        let request = ChatRequest {
            model: model.to_string(),
            messages: build_messages(&opts.system_prompt, user_prompt),
            temperature: opts.temperature,
            max_tokens: Some(opts.max_tokens),
            extra: opts.extra.clone(),
        };

        let mut stream = provider.chat_stream(request).await?;
        let mut text = String::new();

        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::Token(token) => {
                    if opts.verbose {
                        print!("{token}");
                        let _ = std::io::stdout().flush();
                    }
                    text.push_str(&token);
                }
                StreamEvent::Done { .. } => break,
            }
        }

        Ok(text)
    }
}

/// System message first only if the system prompt is non-empty, then the
/// user message.
fn build_messages(system_prompt: &str, user_prompt: &str) -> Vec<Message> {
    let mut messages = Vec::new();

    if !system_prompt.is_empty() {
        messages.push(Message {
            role: Role::System,
            content: system_prompt.to_string(),
        });
    }

    messages.push(Message {
        role: Role::User,
        content: user_prompt.to_string(),
    });

    messages
}
