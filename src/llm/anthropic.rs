//! Anthropic LLM provider with native API format.

use async_trait::async_trait;
use reqwest::Client;

use super::error::LLMError;
use super::provider::LLMProvider;
use super::types::{ChatRequest, ChatStream, Role, StreamEvent, Usage};

/// Anthropic provider with native API format.
pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    api_key: String,
    api_version: String,
}

impl AnthropicProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com";
    pub const DEFAULT_API_VERSION: &'static str = "2023-06-01";

    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            api_version: Self::DEFAULT_API_VERSION.to_string(),
        }
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream, LLMError> {
        let url = format!("{}/v1/messages", self.base_url);
        let anthropic_request = to_stream_request(&request);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&anthropic_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(LLMError::Api { status, message });
        }

        let byte_stream = response.bytes_stream();
        let event_stream = StreamParser::new(byte_stream);

        Ok(Box::pin(event_stream))
    }
}

// --- Request types ---

#[derive(serde::Serialize)]
struct StreamRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<RequestMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(serde::Serialize)]
struct RequestMessage {
    role: String,
    content: String,
}

fn to_stream_request(request: &ChatRequest) -> StreamRequest {
    let mut system = None;
    let mut messages = Vec::new();

    for msg in &request.messages {
        match msg.role {
            Role::System => {
                // Anthropic wants system as a separate field
                system = Some(msg.content.clone());
            }
            Role::User => {
                messages.push(RequestMessage {
                    role: "user".to_string(),
                    content: msg.content.clone(),
                });
            }
            Role::Assistant => {
                messages.push(RequestMessage {
                    role: "assistant".to_string(),
                    content: msg.content.clone(),
                });
            }
        }
    }

    // The transport owns `stream`; a caller-supplied value is discarded.
    let mut extra = request.extra.clone();
    extra.remove("stream");

    StreamRequest {
        model: request.model.clone(),
        max_tokens: request.max_tokens.unwrap_or(4096),
        system,
        messages,
        temperature: request.temperature,
        stream: true,
        extra,
    }
}

// --- Streaming ---

struct StreamParser<S> {
    inner: S,
    buffer: String,
    done: bool,
    usage: Option<Usage>,
}

impl<S> StreamParser<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            buffer: String::new(),
            done: false,
            usage: None,
        }
    }
}

impl<S> futures::Stream for StreamParser<S>
where
    S: futures::Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Unpin,
{
    type Item = Result<StreamEvent, LLMError>;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        use std::task::Poll;

        if self.done {
            return Poll::Ready(None);
        }

        loop {
            if let Some(line_end) = self.buffer.find('\n') {
                let line = self.buffer[..line_end].trim().to_string();
                self.buffer = self.buffer[line_end + 1..].to_string();

                if line.is_empty() || line.starts_with("event:") {
                    continue;
                }

                if let Some(data) = line.strip_prefix("data: ")
                    && let Ok(event) = serde_json::from_str::<StreamEvent_>(data)
                {
                    match event {
                        StreamEvent_::ContentBlockDelta { delta } => {
                            if let Some(text) = delta.text
                                && !text.is_empty()
                            {
                                return Poll::Ready(Some(Ok(StreamEvent::Token(text))));
                            }
                        }
                        StreamEvent_::MessageDelta { usage: Some(u), .. } => {
                            self.usage = Some(Usage {
                                prompt_tokens: 0,
                                completion_tokens: u.output_tokens,
                                total_tokens: u.output_tokens,
                            });
                        }
                        StreamEvent_::MessageStop => {
                            self.done = true;
                            return Poll::Ready(Some(Ok(StreamEvent::Done {
                                usage: self.usage.take(),
                            })));
                        }
                        _ => {}
                    }
                }
                continue;
            }

            match std::pin::Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    if let Ok(text) = std::str::from_utf8(&bytes) {
                        self.buffer.push_str(text);
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(LLMError::Request(e))));
                }
                Poll::Ready(None) => {
                    self.done = true;
                    return Poll::Ready(Some(Ok(StreamEvent::Done {
                        usage: self.usage.take(),
                    })));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[allow(dead_code)] // Fields needed for serde deserialization
enum StreamEvent_ {
    MessageStart {
        message: Option<serde_json::Value>,
    },
    ContentBlockStart {
        index: Option<u32>,
        content_block: Option<serde_json::Value>,
    },
    ContentBlockDelta {
        delta: Delta,
    },
    ContentBlockStop {
        index: Option<u32>,
    },
    MessageDelta {
        delta: Option<serde_json::Value>,
        usage: Option<StreamUsage>,
    },
    MessageStop,
    Ping,
    #[serde(other)]
    Unknown,
}

#[derive(serde::Deserialize)]
struct Delta {
    text: Option<String>,
}

#[derive(serde::Deserialize)]
struct StreamUsage {
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;
    use crate::llm::types::Message;

    fn request_with(messages: Vec<Message>) -> ChatRequest {
        ChatRequest {
            model: "claude-sonnet-4-20250514".to_string(),
            messages,
            temperature: None,
            max_tokens: Some(200),
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_system_message_becomes_system_field() {
        let request = request_with(vec![
            Message {
                role: Role::System,
                content: "You are a pirate".to_string(),
            },
            Message {
                role: Role::User,
                content: "Who are you?".to_string(),
            },
        ]);

        let stream_request = to_stream_request(&request);
        assert_eq!(stream_request.system.as_deref(), Some("You are a pirate"));
        assert_eq!(stream_request.messages.len(), 1);
        assert_eq!(stream_request.messages[0].role, "user");
        assert!(stream_request.stream);
    }

    #[test]
    fn test_caller_supplied_stream_option_is_discarded() {
        let mut request = request_with(vec![Message {
            role: Role::User,
            content: "Hi".to_string(),
        }]);
        request
            .extra
            .insert("stream".to_string(), serde_json::json!(false));

        let value = serde_json::to_value(to_stream_request(&request)).unwrap();
        assert_eq!(value["stream"], serde_json::json!(true));
    }

    #[tokio::test]
    async fn test_parser_handles_event_stream() {
        let sse = concat!(
            "event: message_start\n",
            "data: {\"type\":\"message_start\",\"message\":{}}\n",
            "\n",
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"Ahoy\"}}\n",
            "\n",
            "event: message_delta\n",
            "data: {\"type\":\"message_delta\",\"delta\":{},\"usage\":{\"output_tokens\":4}}\n",
            "\n",
            "event: message_stop\n",
            "data: {\"type\":\"message_stop\"}\n",
            "\n",
        );

        let parser = StreamParser::new(futures::stream::iter(vec![Ok::<_, reqwest::Error>(
            bytes::Bytes::from(sse),
        )]));
        let events: Vec<StreamEvent> = parser.map(|e| e.unwrap()).collect().await;

        assert!(matches!(&events[0], StreamEvent::Token(t) if t == "Ahoy"));
        match &events[1] {
            StreamEvent::Done { usage: Some(usage) } => {
                assert_eq!(usage.completion_tokens, 4);
            }
            other => panic!("expected Done with usage, got {other:?}"),
        }
        assert_eq!(events.len(), 2);
    }
}
