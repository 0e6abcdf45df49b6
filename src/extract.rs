//! Best-effort extraction of JSON from model output.

use thiserror::Error;

use crate::generate::{GenerateOptions, Generator};
use crate::llm::LLMError;

/// Errors from [`Generator::generate_json`].
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The completion call itself failed
    #[error(transparent)]
    Llm(#[from] LLMError),

    /// The response did not contain a decodable JSON block
    #[error("failed to parse JSON from model output: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Generator {
    /// Generate a completion and parse a JSON value out of it.
    ///
    /// Prompt, model and options behave exactly as in
    /// [`Generator::generate_text`]; the response is then run through
    /// [`extract_json`]. A parse failure comes back as
    /// [`ExtractError::Parse`] — it never means "valid empty JSON".
    pub async fn generate_json(
        &self,
        user_prompt: &str,
        opts: &GenerateOptions,
    ) -> Result<serde_json::Value, ExtractError> {
        let response = self.generate_text(user_prompt, opts).await?;

        match extract_json(&response) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::warn!(error = %e, "model output did not contain valid JSON");
                Err(e.into())
            }
        }
    }
}

/// Locate and decode a JSON value inside optionally fenced text.
///
/// Heuristic, not a grammar: prose before a ```` ```json ```` marker is
/// discarded, unfenced text is parsed whole, and only the first fenced
/// block is considered.
pub fn extract_json(text: &str) -> Result<serde_json::Value, serde_json::Error> {
    // Everything after the first ```json marker, or the whole text.
    let candidate = match text.split_once("```json") {
        Some((_, rest)) => rest,
        None => text,
    };

    // Between the fences when a closing fence exists, otherwise the lot.
    let parts: Vec<&str> = candidate.split("```").collect();
    let block = match parts.get(1) {
        Some(part) if !part.is_empty() => part,
        _ => parts[0],
    };

    serde_json::from_str(block.trim())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::generate::tests::{FakeProvider, generator_with};
    use crate::llm::Provider;

    #[test]
    fn test_extracts_json_fenced_block() {
        let value = extract_json("```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_extracts_plain_fenced_block() {
        let value = extract_json("```\n{\"a\": 1}\n```").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_discards_prose_before_fence() {
        let value = extract_json("Here you go:\n```json\n[1, 2, 3]\n```").unwrap();
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn test_parses_unfenced_text_whole() {
        let value = extract_json("{\"a\": 1}").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_tolerates_missing_closing_fence() {
        let value = extract_json("```json\n{\"a\": 1}").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_invalid_text_is_a_parse_error() {
        assert!(extract_json("no fences here").is_err());
    }

    #[test]
    fn test_only_first_fenced_block_is_considered() {
        let text = "```\n{\"a\": 1}\n```\nand also\n```\n{\"b\": 2}\n```";
        let value = extract_json(text).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let text = "```json\n{\"a\": [1, 2], \"b\": \"x\"}\n```";
        let first = extract_json(text).unwrap();
        let second = extract_json(text).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_generate_json_parses_fenced_response() {
        let provider = Arc::new(FakeProvider::tokens(&["```json\n", "{\"a\": 1}", "\n```"]));
        let generator = generator_with(Provider::OpenAi, provider);

        let opts = GenerateOptions {
            verbose: false,
            ..Default::default()
        };
        let value = generator.generate_json("give me json", &opts).await.unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_generate_json_reports_unparseable_response() {
        let provider = Arc::new(FakeProvider::tokens(&["sorry, no json today"]));
        let generator = generator_with(Provider::OpenAi, provider);

        let opts = GenerateOptions {
            verbose: false,
            ..Default::default()
        };
        let err = generator
            .generate_json("give me json", &opts)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Parse(_)));
    }
}
