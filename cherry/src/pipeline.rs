//! End-to-end processing of one model response stream.
//!
//! [`ChatStreamPipeline`] wires the pieces together in the order a chat
//! client needs them: the raw stream is traced first, so the trace sees
//! exactly what the provider sent, and reasoning extraction runs on top.
//!
//! ```rust,ignore
//! use cherry::prelude::*;
//! use futures::StreamExt;
//!
//! let pipeline = ChatStreamPipeline::new("deepseek-r1")
//!     .settings(ReasoningSettings::new().enable_reasoning(true))
//!     .trace(TraceContext::new(span, "topic-1"));
//!
//! let mut chunks = pipeline.run(model_stream);
//! while let Some(chunk) = chunks.next().await {
//!     render(chunk?);
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use cherry_core::{ProviderChunk, ReasoningSettings, StreamChunk, TraceContext};
use cherry_streaming::{
    collect_partition, trace_stream, Extracted, MaybeReasoningStream, ReasoningStreamExt,
    TraceSink, TracedStream, TracingSink,
};
use futures::future::Either;
use futures::{stream, Stream, TryStreamExt};
use tracing::debug;

/// Stream traced when a trace context is present.
pub type MaybeTraced<S> = Either<S, TracedStream<S>>;

/// Tracing plus reasoning extraction for a model's output stream.
#[derive(Clone)]
pub struct ChatStreamPipeline {
    model_id: String,
    settings: ReasoningSettings,
    trace: Option<TraceContext>,
    sink: Arc<dyn TraceSink>,
}

impl ChatStreamPipeline {
    /// Create a pipeline for `model_id` with reasoning extraction off,
    /// no tracing, and a [`TracingSink`].
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            settings: ReasoningSettings::default(),
            trace: None,
            sink: Arc::new(TracingSink),
        }
    }

    /// Set the reasoning settings.
    #[must_use]
    pub fn settings(mut self, settings: ReasoningSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Trace streams under `context`.
    ///
    /// The model name defaults to the pipeline's model ID.
    #[must_use]
    pub fn trace(mut self, context: TraceContext) -> Self {
        self.trace = Some(context);
        self
    }

    /// Set the trace sink.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Get the model ID.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Get the reasoning settings.
    pub fn reasoning_settings(&self) -> &ReasoningSettings {
        &self.settings
    }

    fn trace_context(&self) -> Option<TraceContext> {
        self.trace.clone().map(|context| match context.model_name {
            Some(_) => context,
            None => context.with_model_name(self.model_id.clone()),
        })
    }

    /// Process a stream of provider-neutral chunks.
    pub fn run<S, E>(&self, stream: S) -> MaybeReasoningStream<MaybeTraced<S>, StreamChunk>
    where
        S: Stream<Item = Result<StreamChunk, E>>,
        E: fmt::Display,
    {
        debug!(
            model = %self.model_id,
            reasoning = self.settings.enable_reasoning,
            traced = self.trace.is_some(),
            "starting chat stream"
        );

        trace_stream(stream, self.trace_context(), Arc::clone(&self.sink))
            .extract_reasoning_with(&self.settings, &self.model_id)
    }

    /// Process a stream of raw provider chunks.
    ///
    /// Chunks are traced in their provider shape, then normalized into
    /// [`StreamChunk`]s before extraction.
    pub fn run_provider<S, E>(&self, chunks: S) -> impl Stream<Item = Result<StreamChunk, E>>
    where
        S: Stream<Item = Result<ProviderChunk, E>>,
        E: fmt::Display,
    {
        debug!(
            model = %self.model_id,
            reasoning = self.settings.enable_reasoning,
            traced = self.trace.is_some(),
            "starting provider stream"
        );

        trace_stream(chunks, self.trace_context(), Arc::clone(&self.sink))
            .map_ok(|chunk| stream::iter(chunk.to_stream_chunks().into_iter().map(Ok::<_, E>)))
            .try_flatten()
            .extract_reasoning_with(&self.settings, &self.model_id)
    }

    /// Run `stream` to completion and return the final partition.
    pub async fn collect<S, E>(&self, stream: S) -> Result<Extracted, E>
    where
        S: Stream<Item = Result<StreamChunk, E>>,
        E: fmt::Display,
    {
        collect_partition(self.run(stream)).await
    }
}

impl fmt::Debug for ChatStreamPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatStreamPipeline")
            .field("model_id", &self.model_id)
            .field("settings", &self.settings)
            .field("trace", &self.trace)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cherry_core::{TagPair, TokenUsage, TraceSpan};
    use cherry_streaming::{InMemorySink, StreamError};
    use futures::StreamExt;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sink() -> Arc<InMemorySink> {
        Arc::new(InMemorySink::new())
    }

    fn context() -> TraceContext {
        TraceContext::new(TraceSpan::new("span", "trace"), "topic")
    }

    fn chunks(items: Vec<StreamChunk>) -> impl Stream<Item = Result<StreamChunk, StreamError>> {
        stream::iter(items.into_iter().map(Ok))
    }

    #[tokio::test]
    async fn test_traced_extraction() {
        let sink = sink();
        let pipeline = ChatStreamPipeline::new("deepseek-r1")
            .settings(ReasoningSettings::new().enable_reasoning(true))
            .trace(context())
            .sink(sink.clone());

        let input = chunks(vec![
            StreamChunk::text("<thi"),
            StreamChunk::text("nk>plan</th"),
            StreamChunk::text("ink>answer"),
            StreamChunk::finish(Some("stop".into()), Some(TokenUsage::with_tokens(4, 6))),
        ]);

        let out = pipeline.collect(input).await.unwrap();
        assert_eq!(out.reasoning.as_deref(), Some("plan"));
        assert_eq!(out.text, "answer");

        // The trace sees the raw, untagged text.
        assert_eq!(sink.messages().concat(), "<think>plan</think>answer");
        assert_eq!(sink.usage(), vec![TokenUsage::with_tokens(4, 6)]);

        let ends = sink.span_ends();
        assert_eq!(ends.len(), 1);
        assert_eq!(ends[0].model_name.as_deref(), Some("deepseek-r1"));
        assert!(ends[0].is_success());
    }

    #[tokio::test]
    async fn test_disabled_reasoning_is_pass_through() {
        let pipeline = ChatStreamPipeline::new("gpt-4o");
        let items = vec![StreamChunk::text("<think>x</think>y")];

        let stream = pipeline.run(chunks(items.clone()));
        assert!(matches!(stream, Either::Left(Either::Left(_))));

        let out: Vec<_> = stream.try_collect().await.unwrap();
        assert_eq!(out, items);
    }

    #[tokio::test]
    async fn test_explicit_tag_pair_and_model_name_kept() {
        let sink = sink();
        let pair = TagPair::new("<r>", "</r>", "\n").unwrap();
        let pipeline = ChatStreamPipeline::new("custom")
            .settings(ReasoningSettings::new().enable_reasoning(true).tag_pair(pair))
            .trace(context().with_model_name("display-name"))
            .sink(sink.clone());

        let out = pipeline
            .collect(chunks(vec![StreamChunk::text("<r>a</r>b")]))
            .await
            .unwrap();
        assert_eq!(out.reasoning.as_deref(), Some("a"));
        assert_eq!(out.text, "b");
        assert_eq!(
            sink.span_ends()[0].model_name.as_deref(),
            Some("display-name")
        );
    }

    #[tokio::test]
    async fn test_provider_chunks_are_normalized() {
        let sink = sink();
        let pipeline = ChatStreamPipeline::new("deepseek-r1")
            .settings(ReasoningSettings::new().enable_reasoning(true))
            .trace(context())
            .sink(sink.clone());

        let raw = vec![
            json!({"id": "1", "model": "m", "choices": [{"index": 0, "delta": {"content": "<think>a"}}]}),
            json!({"id": "1", "model": "m", "choices": [{"index": 0, "delta": {"content": "</think>b"}}]}),
            json!({"id": "1", "model": "m", "choices": [], "usage": {"prompt_tokens": 1, "completion_tokens": 2, "total_tokens": 3}}),
        ];
        let input = stream::iter(
            raw.into_iter()
                .map(|v| ProviderChunk::from_json(v).map_err(StreamError::from)),
        );

        let out: Vec<_> = pipeline.run_provider(input).try_collect().await.unwrap();
        let finish = out.last().cloned();
        let partition = collect_partition(stream::iter(out.into_iter().map(Ok::<_, StreamError>)))
            .await
            .unwrap();

        assert_eq!(partition.reasoning.as_deref(), Some("a"));
        assert_eq!(partition.text, "b");
        assert_eq!(
            finish,
            Some(StreamChunk::finish(None, Some(TokenUsage::with_tokens(1, 2))))
        );
        assert_eq!(sink.usage().len(), 1);
    }

    #[tokio::test]
    async fn test_upstream_error_reaches_caller_and_trace() {
        let sink = sink();
        let pipeline = ChatStreamPipeline::new("deepseek-r1")
            .settings(ReasoningSettings::new().enable_reasoning(true))
            .trace(context())
            .sink(sink.clone());

        let input = stream::iter(vec![
            Ok(StreamChunk::text("<think>half")),
            Err(StreamError::upstream("timeout")),
        ]);

        let mut out = pipeline.run(input);
        let mut seen = Vec::new();
        while let Some(item) = out.next().await {
            seen.push(item);
        }

        assert!(seen.last().unwrap().is_err());
        assert_eq!(sink.span_ends().len(), 1);
        assert!(sink.span_ends()[0].error.as_deref().unwrap().contains("timeout"));
    }
}
