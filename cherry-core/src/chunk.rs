//! Normalized stream chunks.
//!
//! [`StreamChunk`] is the provider-neutral unit flowing from a model call to
//! the UI. The reasoning extractor only ever looks at `text-delta` chunks and
//! treats everything else as opaque; [`DeltaChunk`] captures exactly that
//! contract so the extractor can run over any chunk type.

use serde::{Deserialize, Serialize};

use crate::usage::TokenUsage;

/// Classification of a piece of streamed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaKind {
    /// User-facing answer text.
    Text,
    /// Model reasoning ("thinking").
    Reasoning,
}

/// A chunk type the reasoning extractor can rewrite.
pub trait DeltaChunk: Sized {
    /// The payload of a plain `text-delta` chunk, `None` for every other chunk.
    fn text_delta(&self) -> Option<&str>;

    /// Build a chunk shaped like `self` with the given kind and payload.
    fn retag(&self, kind: DeltaKind, text: String) -> Self;

    /// Whether this chunk ends the model response. Text held back by the
    /// extractor is released before a terminal chunk is forwarded.
    fn is_terminal(&self) -> bool {
        false
    }
}

/// One incremental unit of model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamChunk {
    /// Answer text.
    #[serde(rename_all = "camelCase")]
    TextDelta {
        /// The text.
        text_delta: String,
    },

    /// Reasoning text.
    #[serde(rename_all = "camelCase")]
    Reasoning {
        /// The text.
        text_delta: String,
    },

    /// Incremental tool call arguments.
    #[serde(rename_all = "camelCase")]
    ToolCallDelta {
        /// Tool call ID.
        tool_call_id: String,
        /// Tool name.
        tool_name: String,
        /// Arguments fragment (raw JSON text).
        args_text_delta: String,
    },

    /// A complete tool call.
    #[serde(rename_all = "camelCase")]
    ToolCall {
        /// Tool call ID.
        tool_call_id: String,
        /// Tool name.
        tool_name: String,
        /// Arguments (raw JSON text).
        args: String,
    },

    /// End of the model response.
    #[serde(rename_all = "camelCase")]
    Finish {
        /// Provider finish reason.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
        /// Final usage, if reported.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        usage: Option<TokenUsage>,
    },

    /// An error reported in-band by the provider.
    Error {
        /// Error message.
        message: String,
    },
}

impl StreamChunk {
    /// Create a text delta chunk.
    pub fn text(text: impl Into<String>) -> Self {
        Self::TextDelta {
            text_delta: text.into(),
        }
    }

    /// Create a reasoning delta chunk.
    pub fn reasoning(text: impl Into<String>) -> Self {
        Self::Reasoning {
            text_delta: text.into(),
        }
    }

    /// Create a finish chunk.
    pub fn finish(finish_reason: Option<String>, usage: Option<TokenUsage>) -> Self {
        Self::Finish {
            finish_reason,
            usage,
        }
    }

    /// The `type` discriminator as it appears on the wire.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::TextDelta { .. } => "text-delta",
            Self::Reasoning { .. } => "reasoning",
            Self::ToolCallDelta { .. } => "tool-call-delta",
            Self::ToolCall { .. } => "tool-call",
            Self::Finish { .. } => "finish",
            Self::Error { .. } => "error",
        }
    }

    /// The reasoning payload, if this is a reasoning chunk.
    #[must_use]
    pub fn reasoning_delta(&self) -> Option<&str> {
        match self {
            Self::Reasoning { text_delta } => Some(text_delta),
            _ => None,
        }
    }
}

impl DeltaChunk for StreamChunk {
    fn text_delta(&self) -> Option<&str> {
        match self {
            Self::TextDelta { text_delta } => Some(text_delta),
            _ => None,
        }
    }

    fn retag(&self, kind: DeltaKind, text: String) -> Self {
        match kind {
            DeltaKind::Text => Self::TextDelta { text_delta: text },
            DeltaKind::Reasoning => Self::Reasoning { text_delta: text },
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Finish { .. })
    }
}
