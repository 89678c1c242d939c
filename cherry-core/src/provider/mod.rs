//! Provider-specific chunk shapes.
//!
//! Upstream model streams deliver chunks whose shape depends on the API that
//! produced them. [`ProviderChunk`] closes that set: every known shape gets
//! its own variant and anything else is kept as raw JSON.

pub mod gemini;
pub mod openai;
pub mod responses;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::chunk::StreamChunk;
use crate::errors::Result;
use crate::usage::TokenUsage;

pub use gemini::GenerateContentResponse;
pub use openai::{ChatCompletionChunk, CompletionUsage};
pub use responses::{ResponseStreamEvent, ResponseUsage};

/// A chunk from any supported provider API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProviderChunk {
    /// OpenAI-compatible chat completion chunk.
    ChatCompletion(ChatCompletionChunk),
    /// OpenAI Responses API event.
    Response(ResponseStreamEvent),
    /// Gemini `generateContent` response.
    Gemini(GenerateContentResponse),
    /// A chunk of unrecognized shape.
    Unknown(JsonValue),
}

impl ProviderChunk {
    /// Decode a JSON chunk, picking the variant from its top-level keys.
    pub fn from_json(value: JsonValue) -> Result<Self> {
        let chunk = if value.get("choices").is_some() {
            Self::ChatCompletion(serde_json::from_value(value)?)
        } else if value.get("candidates").is_some() || value.get("usageMetadata").is_some() {
            Self::Gemini(serde_json::from_value(value)?)
        } else if value
            .get("type")
            .and_then(JsonValue::as_str)
            .is_some_and(|t| t.starts_with("response."))
        {
            Self::Response(serde_json::from_value(value)?)
        } else {
            Self::Unknown(value)
        };
        Ok(chunk)
    }

    /// Decode a JSON chunk from text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_json(serde_json::from_str(json)?)
    }

    /// Usage carried by this chunk, if any.
    #[must_use]
    pub fn usage(&self) -> Option<TokenUsage> {
        match self {
            Self::ChatCompletion(chunk) => chunk.usage.map(TokenUsage::from),
            Self::Response(event) => event.usage(),
            Self::Gemini(response) => response.usage_metadata.map(TokenUsage::from),
            Self::Unknown(_) => None,
        }
    }

    /// Normalize into provider-neutral chunks.
    #[must_use]
    pub fn to_stream_chunks(&self) -> Vec<StreamChunk> {
        match self {
            Self::ChatCompletion(chunk) => chunk.to_stream_chunks(),
            Self::Response(event) => event.to_stream_chunks(),
            Self::Gemini(response) => response.to_stream_chunks(),
            Self::Unknown(_) => Vec::new(),
        }
    }
}

impl From<ChatCompletionChunk> for ProviderChunk {
    fn from(chunk: ChatCompletionChunk) -> Self {
        Self::ChatCompletion(chunk)
    }
}

impl From<ResponseStreamEvent> for ProviderChunk {
    fn from(event: ResponseStreamEvent) -> Self {
        Self::Response(event)
    }
}

impl From<GenerateContentResponse> for ProviderChunk {
    fn from(response: GenerateContentResponse) -> Self {
        Self::Gemini(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_chat_completion() {
        let chunk = ProviderChunk::from_json_str(
            r#"{"choices":[{"index":0,"delta":{"content":"x"}}],"usage":{"prompt_tokens":1,"completion_tokens":2,"total_tokens":3}}"#,
        )
        .unwrap();
        assert!(matches!(chunk, ProviderChunk::ChatCompletion(_)));
        assert_eq!(chunk.usage(), Some(TokenUsage::with_tokens(1, 2)));
    }

    #[test]
    fn test_from_json_gemini() {
        let chunk =
            ProviderChunk::from_json_str(r#"{"candidates":[{"content":{"parts":[{"text":"x"}]}}]}"#)
                .unwrap();
        assert!(matches!(chunk, ProviderChunk::Gemini(_)));
        assert_eq!(chunk.to_stream_chunks(), vec![StreamChunk::text("x")]);
    }

    #[test]
    fn test_from_json_response_event() {
        let chunk =
            ProviderChunk::from_json_str(r#"{"type":"response.output_text.delta","delta":"x"}"#)
                .unwrap();
        assert!(matches!(chunk, ProviderChunk::Response(_)));
    }

    #[test]
    fn test_from_json_unknown() {
        let chunk = ProviderChunk::from_json_str(r#"{"type":"ping"}"#).unwrap();
        assert!(matches!(chunk, ProviderChunk::Unknown(_)));
        assert!(chunk.to_stream_chunks().is_empty());
        assert_eq!(chunk.usage(), None);
    }

    #[test]
    fn test_from_json_invalid_shape() {
        let result = ProviderChunk::from_json_str(r#"{"choices": "nope"}"#);
        assert!(result.is_err());
    }
}
