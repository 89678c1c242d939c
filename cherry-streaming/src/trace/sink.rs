//! Destinations for trace records.

use std::fmt;

use chrono::{DateTime, Utc};
use cherry_core::{TokenUsage, TraceSpan};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Target used by [`TracingSink`] events.
pub const TRACE_TARGET: &str = "cherry::trace";

/// Everything needed to close a span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSpan {
    /// Topic the span belongs to.
    pub topic_id: String,
    /// The span being closed.
    pub span: TraceSpan,
    /// Error description when the stream failed or was cancelled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Model that produced the stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl EndSpan {
    /// Whether the span ended successfully.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Receives content, usage and span lifecycle events from traced streams.
///
/// Implementations are shared between streams and must be cheap to call from
/// inside `poll_next`.
pub trait TraceSink: Send + Sync {
    /// Record a piece of streamed content. `raw` is the chunk it came from.
    fn add_message(
        &self,
        span: &TraceSpan,
        model_name: Option<&str>,
        text: &str,
        raw: &dyn fmt::Debug,
    );

    /// Record the final token usage of a span.
    fn record_usage(&self, span: &TraceSpan, usage: &TokenUsage);

    /// Close a span.
    fn end_span(&self, end: EndSpan);
}

/// Sink that emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn add_message(
        &self,
        span: &TraceSpan,
        model_name: Option<&str>,
        text: &str,
        raw: &dyn fmt::Debug,
    ) {
        trace!(
            target: TRACE_TARGET,
            span_id = %span.span_id,
            trace_id = %span.trace_id,
            model = model_name.unwrap_or_default(),
            raw = ?raw,
            "{text}"
        );
    }

    fn record_usage(&self, span: &TraceSpan, usage: &TokenUsage) {
        debug!(
            target: TRACE_TARGET,
            span_id = %span.span_id,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "token usage"
        );
    }

    fn end_span(&self, end: EndSpan) {
        match &end.error {
            Some(error) => warn!(
                target: TRACE_TARGET,
                span_id = %end.span.span_id,
                topic_id = %end.topic_id,
                model = end.model_name.as_deref().unwrap_or_default(),
                error = %error,
                "span ended with error"
            ),
            None => debug!(
                target: TRACE_TARGET,
                span_id = %end.span.span_id,
                topic_id = %end.topic_id,
                model = end.model_name.as_deref().unwrap_or_default(),
                "span ended"
            ),
        }
    }
}

/// A record captured by [`InMemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    /// Content was added to a span.
    Message {
        /// Span ID.
        span_id: String,
        /// Model name.
        model_name: Option<String>,
        /// Content text.
        text: String,
        /// When it was recorded.
        at: DateTime<Utc>,
    },
    /// Usage was recorded.
    Usage {
        /// Span ID.
        span_id: String,
        /// The usage.
        usage: TokenUsage,
        /// When it was recorded.
        at: DateTime<Utc>,
    },
    /// A span was closed.
    SpanEnded {
        /// Close details.
        end: EndSpan,
        /// When it was recorded.
        at: DateTime<Utc>,
    },
}

/// Sink that keeps every event in memory.
///
/// Useful for tests and for callers that forward traces in batches.
#[derive(Debug, Default)]
pub struct InMemorySink {
    events: Mutex<Vec<SinkEvent>>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events, oldest first.
    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    /// Content texts in the order they were added.
    pub fn messages(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Message { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Recorded usage values.
    pub fn usage(&self) -> Vec<TokenUsage> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Usage { usage, .. } => Some(*usage),
                _ => None,
            })
            .collect()
    }

    /// Span closures.
    pub fn span_ends(&self) -> Vec<EndSpan> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::SpanEnded { end, .. } => Some(end.clone()),
                _ => None,
            })
            .collect()
    }

    /// Drop all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl TraceSink for InMemorySink {
    fn add_message(
        &self,
        span: &TraceSpan,
        model_name: Option<&str>,
        text: &str,
        _raw: &dyn fmt::Debug,
    ) {
        self.events.lock().push(SinkEvent::Message {
            span_id: span.span_id.clone(),
            model_name: model_name.map(str::to_string),
            text: text.to_string(),
            at: Utc::now(),
        });
    }

    fn record_usage(&self, span: &TraceSpan, usage: &TokenUsage) {
        self.events.lock().push(SinkEvent::Usage {
            span_id: span.span_id.clone(),
            usage: *usage,
            at: Utc::now(),
        });
    }

    fn end_span(&self, end: EndSpan) {
        self.events.lock().push(SinkEvent::SpanEnded {
            end,
            at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span() -> TraceSpan {
        TraceSpan::new("s1", "t1")
    }

    #[test]
    fn test_in_memory_sink_records_in_order() {
        let sink = InMemorySink::new();
        sink.add_message(&span(), Some("m"), "hello", &"raw");
        sink.record_usage(&span(), &TokenUsage::with_tokens(1, 2));
        sink.end_span(EndSpan {
            topic_id: "topic".into(),
            span: span(),
            error: None,
            model_name: Some("m".into()),
        });

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], SinkEvent::Message { .. }));
        assert!(matches!(events[1], SinkEvent::Usage { .. }));
        assert!(matches!(events[2], SinkEvent::SpanEnded { .. }));
        assert_eq!(sink.messages(), vec!["hello".to_string()]);
        assert_eq!(sink.usage(), vec![TokenUsage::with_tokens(1, 2)]);
        assert!(sink.span_ends()[0].is_success());
    }

    #[test]
    fn test_timestamps_are_monotonic() {
        let sink = InMemorySink::new();
        sink.add_message(&span(), None, "a", &"");
        sink.add_message(&span(), None, "b", &"");

        let times: Vec<_> = sink
            .events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Message { at, .. } => Some(at),
                _ => None,
            })
            .collect();
        assert!(times[0] <= times[1]);
    }

    #[test]
    fn test_clear() {
        let sink = InMemorySink::new();
        sink.add_message(&span(), None, "a", &"");
        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_end_span_serializes_camel_case() {
        let end = EndSpan {
            topic_id: "topic".into(),
            span: span(),
            error: Some("boom".into()),
            model_name: None,
        };
        let json = serde_json::to_value(&end).unwrap();
        assert_eq!(json["topicId"], "topic");
        assert_eq!(json["error"], "boom");
        assert!(json.get("modelName").is_none());
    }

    #[test]
    fn test_tracing_sink_does_not_panic() {
        let sink = TracingSink;
        sink.add_message(&span(), None, "text", &1u8);
        sink.record_usage(&span(), &TokenUsage::new());
        sink.end_span(EndSpan {
            topic_id: "topic".into(),
            span: span(),
            error: Some("x".into()),
            model_name: None,
        });
    }
}
