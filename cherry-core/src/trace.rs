//! Trace context passed explicitly through the stream pipeline.

use serde::{Deserialize, Serialize};

/// Handle to a span owned by an external tracing backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSpan {
    /// Span ID.
    pub span_id: String,
    /// ID of the trace the span belongs to.
    pub trace_id: String,
}

impl TraceSpan {
    /// Create a span handle.
    pub fn new(span_id: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            span_id: span_id.into(),
            trace_id: trace_id.into(),
        }
    }
}

/// Everything a tracing adapter needs to report on one stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceContext {
    /// The span covering the model call.
    pub span: TraceSpan,
    /// Conversation topic the call belongs to.
    pub topic_id: String,
    /// Model name reported alongside trace messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl TraceContext {
    /// Create a context.
    pub fn new(span: TraceSpan, topic_id: impl Into<String>) -> Self {
        Self {
            span,
            topic_id: topic_id.into(),
            model_name: None,
        }
    }

    /// Set the model name.
    #[must_use]
    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    /// Build a context only when both the span and the topic are known.
    ///
    /// Tracing is opt-in per call site: a missing span or topic means the
    /// stream is not traced at all.
    #[must_use]
    pub fn from_parts(
        span: Option<TraceSpan>,
        topic_id: Option<String>,
        model_name: Option<String>,
    ) -> Option<Self> {
        Some(Self {
            span: span?,
            topic_id: topic_id?,
            model_name,
        })
    }
}
