//! OpenAI Responses API stream events.

use serde::{Deserialize, Serialize};

use crate::chunk::StreamChunk;
use crate::usage::TokenUsage;

/// One server-sent event of a streamed Responses API call.
///
/// Only the events that carry displayable content or usage are modelled;
/// everything else decodes to [`ResponseStreamEvent::Other`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResponseStreamEvent {
    /// Response created.
    #[serde(rename = "response.created")]
    Created {
        /// Response snapshot.
        response: ResponseSnapshot,
    },

    /// Output text delta.
    #[serde(rename = "response.output_text.delta")]
    OutputTextDelta {
        /// Text fragment.
        delta: String,
    },

    /// Output text finished.
    #[serde(rename = "response.output_text.done")]
    OutputTextDone {
        /// Full text of the output item.
        text: String,
    },

    /// Refusal delta.
    #[serde(rename = "response.refusal.delta")]
    RefusalDelta {
        /// Refusal fragment.
        delta: String,
    },

    /// Reasoning summary delta.
    #[serde(rename = "response.reasoning_summary_text.delta")]
    ReasoningSummaryTextDelta {
        /// Summary fragment.
        delta: String,
    },

    /// Function call arguments delta.
    #[serde(rename = "response.function_call_arguments.delta")]
    FunctionCallArgumentsDelta {
        /// Output item the call belongs to.
        #[serde(default)]
        item_id: String,
        /// Arguments fragment.
        delta: String,
    },

    /// A partial image from an image generation call.
    #[serde(rename = "response.image_generation_call.partial_image")]
    ImageGenerationPartialImage {
        /// Base64 image data.
        #[serde(default)]
        partial_image_b64: String,
    },

    /// A content part was added.
    #[serde(rename = "response.content_part.added")]
    ContentPartAdded {
        /// The part.
        part: ResponseContentPart,
    },

    /// A content part was completed.
    #[serde(rename = "response.content_part.done")]
    ContentPartDone {
        /// The part.
        part: ResponseContentPart,
    },

    /// Response completed.
    #[serde(rename = "response.completed")]
    Completed {
        /// Final response snapshot.
        response: ResponseSnapshot,
    },

    /// Any other event.
    #[serde(other)]
    Other,
}

/// Snapshot of a response object embedded in lifecycle events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    /// Response ID.
    #[serde(default)]
    pub id: String,
    /// Aggregated output text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_text: Option<String>,
    /// Token usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<ResponseUsage>,
}

/// Content part of an output message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseContentPart {
    /// Output text.
    OutputText {
        /// The text.
        #[serde(default)]
        text: String,
    },
    /// Refusal.
    Refusal {
        /// The refusal message.
        #[serde(default)]
        refusal: String,
    },
    /// Any other part type.
    #[serde(other)]
    Other,
}

/// Token usage as reported by the Responses API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseUsage {
    /// Input tokens.
    #[serde(default)]
    pub input_tokens: u64,
    /// Output tokens.
    #[serde(default)]
    pub output_tokens: u64,
    /// Total tokens.
    #[serde(default)]
    pub total_tokens: u64,
}

impl From<ResponseUsage> for TokenUsage {
    fn from(usage: ResponseUsage) -> Self {
        TokenUsage {
            prompt_tokens: usage.input_tokens,
            completion_tokens: usage.output_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

impl ResponseStreamEvent {
    /// Usage carried by this event, if any.
    #[must_use]
    pub fn usage(&self) -> Option<TokenUsage> {
        match self {
            Self::Created { response } | Self::Completed { response } => {
                response.usage.map(TokenUsage::from)
            }
            _ => None,
        }
    }

    /// Normalize into provider-neutral chunks.
    #[must_use]
    pub fn to_stream_chunks(&self) -> Vec<StreamChunk> {
        match self {
            Self::OutputTextDelta { delta } | Self::RefusalDelta { delta } if !delta.is_empty() => {
                vec![StreamChunk::text(delta.clone())]
            }
            Self::ReasoningSummaryTextDelta { delta } if !delta.is_empty() => {
                vec![StreamChunk::reasoning(delta.clone())]
            }
            Self::FunctionCallArgumentsDelta { item_id, delta } => {
                vec![StreamChunk::ToolCallDelta {
                    tool_call_id: item_id.clone(),
                    tool_name: String::new(),
                    args_text_delta: delta.clone(),
                }]
            }
            Self::Completed { .. } => {
                vec![StreamChunk::finish(Some("stop".to_string()), self.usage())]
            }
            _ => Vec::new(),
        }
    }
}
