//! OpenAI-compatible chat completion stream chunks.

use serde::{Deserialize, Serialize};

use crate::chunk::StreamChunk;
use crate::usage::TokenUsage;

/// Chat completion chunk (streaming).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    /// Response ID.
    #[serde(default)]
    pub id: String,
    /// Model used.
    #[serde(default)]
    pub model: String,
    /// Response choices.
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    /// Token usage (sent when `stream_options.include_usage` is set).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<CompletionUsage>,
}

/// Chunk choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkChoice {
    /// Choice index.
    #[serde(default)]
    pub index: u32,
    /// Delta content.
    #[serde(default)]
    pub delta: ChunkDelta,
    /// Finish reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Chunk delta.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkDelta {
    /// Role (usually only in the first chunk).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Text content delta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Reasoning content delta (DeepSeek, GLM and other reasoning models).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
    /// Refusal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
    /// Tool call deltas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ChunkToolCall>>,
}

/// Chunk tool call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkToolCall {
    /// Index of this tool call.
    #[serde(default)]
    pub index: u32,
    /// Tool call ID (only in the first chunk for this tool).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Function call delta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<ChunkFunction>,
}

/// Chunk function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkFunction {
    /// Function name (only in the first chunk).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Arguments delta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

/// Token usage as reported by chat completion endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionUsage {
    /// Prompt tokens.
    #[serde(default)]
    pub prompt_tokens: u64,
    /// Completion tokens.
    #[serde(default)]
    pub completion_tokens: u64,
    /// Total tokens.
    #[serde(default)]
    pub total_tokens: u64,
}

impl From<CompletionUsage> for TokenUsage {
    fn from(usage: CompletionUsage) -> Self {
        TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

impl ChatCompletionChunk {
    /// Create a chunk with a single choice carrying the given delta.
    #[must_use]
    pub fn from_delta(delta: ChunkDelta) -> Self {
        Self {
            choices: vec![ChunkChoice {
                delta,
                ..ChunkChoice::default()
            }],
            ..Self::default()
        }
    }

    /// Create a chunk carrying a text content delta.
    pub fn content(text: impl Into<String>) -> Self {
        Self::from_delta(ChunkDelta {
            content: Some(text.into()),
            ..ChunkDelta::default()
        })
    }

    /// Create a chunk carrying a reasoning content delta.
    pub fn reasoning_content(text: impl Into<String>) -> Self {
        Self::from_delta(ChunkDelta {
            reasoning_content: Some(text.into()),
            ..ChunkDelta::default()
        })
    }

    /// Attach usage.
    #[must_use]
    pub fn with_usage(mut self, usage: CompletionUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Set the finish reason on every choice.
    #[must_use]
    pub fn with_finish_reason(mut self, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        for choice in &mut self.choices {
            choice.finish_reason = Some(reason.clone());
        }
        self
    }

    /// Normalize into provider-neutral chunks.
    ///
    /// A usage-only chunk (empty `choices`) becomes a `finish` chunk without
    /// a finish reason.
    #[must_use]
    pub fn to_stream_chunks(&self) -> Vec<StreamChunk> {
        let usage = self.usage.map(TokenUsage::from);
        let mut chunks = Vec::new();

        for choice in &self.choices {
            let delta = &choice.delta;

            if let Some(reasoning) = delta.reasoning_content.as_deref() {
                if !reasoning.is_empty() {
                    chunks.push(StreamChunk::reasoning(reasoning));
                }
            }
            if let Some(content) = delta.content.as_deref() {
                if !content.is_empty() {
                    chunks.push(StreamChunk::text(content));
                }
            }
            if let Some(refusal) = delta.refusal.as_deref() {
                if !refusal.is_empty() {
                    chunks.push(StreamChunk::text(refusal));
                }
            }
            for call in delta.tool_calls.iter().flatten() {
                let function = call.function.as_ref();
                chunks.push(StreamChunk::ToolCallDelta {
                    tool_call_id: call.id.clone().unwrap_or_default(),
                    tool_name: function
                        .and_then(|f| f.name.clone())
                        .unwrap_or_default(),
                    args_text_delta: function
                        .and_then(|f| f.arguments.clone())
                        .unwrap_or_default(),
                });
            }
            if let Some(reason) = &choice.finish_reason {
                chunks.push(StreamChunk::finish(Some(reason.clone()), usage));
            }
        }

        if self.choices.is_empty() && usage.is_some() {
            chunks.push(StreamChunk::finish(None, usage));
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_sdk_chunk() {
        let chunk: ChatCompletionChunk = serde_json::from_str(
            r#"{"id":"123","object":"chat.completion.chunk","created":1,"model":"gpt-4o","choices":[{"index":0,"delta":{"content":"Hello"}}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.model, "gpt-4o");
        assert_eq!(chunk.choices[0].delta.content.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_to_stream_chunks_reasoning_then_text() {
        let chunk = ChatCompletionChunk::from_delta(ChunkDelta {
            reasoning_content: Some("hmm".into()),
            content: Some("ok".into()),
            ..ChunkDelta::default()
        });
        assert_eq!(
            chunk.to_stream_chunks(),
            vec![StreamChunk::reasoning("hmm"), StreamChunk::text("ok")]
        );
    }

    #[test]
    fn test_to_stream_chunks_tool_call() {
        let chunk = ChatCompletionChunk::from_delta(ChunkDelta {
            tool_calls: Some(vec![ChunkToolCall {
                index: 0,
                id: Some("call_1".into()),
                function: Some(ChunkFunction {
                    name: Some("search".into()),
                    arguments: Some("{\"q\":".into()),
                }),
            }]),
            ..ChunkDelta::default()
        });
        assert_eq!(
            chunk.to_stream_chunks(),
            vec![StreamChunk::ToolCallDelta {
                tool_call_id: "call_1".into(),
                tool_name: "search".into(),
                args_text_delta: "{\"q\":".into(),
            }]
        );
    }

    #[test]
    fn test_usage_only_chunk_becomes_finish() {
        let usage = CompletionUsage {
            prompt_tokens: 3,
            completion_tokens: 4,
            total_tokens: 7,
        };
        let chunk = ChatCompletionChunk::default().with_usage(usage);
        assert_eq!(
            chunk.to_stream_chunks(),
            vec![StreamChunk::finish(None, Some(TokenUsage::with_tokens(3, 4)))]
        );
    }

    #[test]
    fn test_finish_reason() {
        let chunk = ChatCompletionChunk::content("").with_finish_reason("stop");
        assert_eq!(
            chunk.to_stream_chunks(),
            vec![StreamChunk::finish(Some("stop".into()), None)]
        );
    }
}
