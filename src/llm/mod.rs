//! LLM provider client for streaming chat completions.

mod anthropic;
mod error;
mod openai;
mod provider;
mod registry;
mod types;

pub use anthropic::AnthropicProvider;
pub use error::LLMError;
pub use openai::OpenAICompatibleProvider;
pub use provider::{LLMProvider, Provider};
pub use registry::ProviderRegistry;
pub use types::{ChatRequest, ChatStream, Message, Role, StreamEvent, Usage};
