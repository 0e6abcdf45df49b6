//! Lectern - minimal helpers for calling LLM completion APIs from teaching
//! notebooks and small scripts.
//!
//! Bootstrap credentials from a remote secrets file, generate text with a
//! streaming completion call and sensible defaults, pull JSON out of fenced
//! model output, and bound text by non-blank line count.

pub mod extract;
pub mod generate;
pub mod keys;
pub mod llm;
pub mod text;

pub use extract::{ExtractError, extract_json};
pub use generate::{DEFAULT_MODEL, GenerateOptions, Generator};
pub use keys::{KeyError, KeyReport, load_api_keys, load_api_keys_to};
pub use text::truncate_lines;
