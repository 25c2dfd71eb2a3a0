//! The text-generation capability.
//!
//! Everything model-backed goes through [`TextGenerator`]. Replies are free
//! text; callers that expect structure run them through [`parse_json_reply`]
//! and match on the [`ParsedReply`] instead of trusting the model.

mod gemini;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use gemini::GeminiClient;

/// Errors from a generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Generation backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Generation backend returned no text")]
    EmptyReply,
}

/// Produce text for a prompt.
///
/// A call is a single blocking round-trip with no timeout or retry; a failure
/// is final for that call.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Outcome of decoding a model reply that should contain a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedReply<T> {
    Parsed(T),
    /// The reply as received, for use in degraded output.
    Unparsable(String),
}

/// Decode the span from the first `{` to the last `}` of `raw`.
///
/// Tolerates prose and code fences around the object.
pub fn parse_json_reply<T: DeserializeOwned>(raw: &str) -> ParsedReply<T> {
    let span = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => return ParsedReply::Unparsable(raw.to_string()),
    };

    match serde_json::from_str(span) {
        Ok(value) => ParsedReply::Parsed(value),
        Err(e) => {
            tracing::debug!("Model reply is not valid JSON: {}", e);
            ParsedReply::Unparsable(raw.to_string())
        }
    }
}
