//! Stream adapters that report content and usage to a [`TraceSink`].
//!
//! A [`TracedStream`] forwards every item of the inner stream untouched. On
//! the side it sends each chunk's content to the sink, keeps a running token
//! usage, and closes the span exactly once: on normal end, on the first
//! upstream error, or when the stream is dropped early.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use cherry_core::{ChatCompletionChunk, TokenUsage, TraceContext};
use futures::future::Either;
use futures::{ready, Stream};
use pin_project_lite::pin_project;
use tracing::{debug, warn};

use super::content::TraceableChunk;
use super::sink::{EndSpan, TraceSink};
use crate::error::StreamError;

/// How usage reported by successive chunks is combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsageMode {
    /// Each report overwrites the previous one.
    #[default]
    Replace,
    /// Reports are summed.
    Accumulate,
}

/// Owns the span and closes it once.
struct SpanFinalizer {
    sink: Arc<dyn TraceSink>,
    context: TraceContext,
    usage: TokenUsage,
    finished: bool,
}

impl SpanFinalizer {
    fn new(sink: Arc<dyn TraceSink>, context: TraceContext) -> Self {
        Self {
            sink,
            context,
            usage: TokenUsage::new(),
            finished: false,
        }
    }

    fn end_span(&self, error: Option<String>) -> EndSpan {
        EndSpan {
            topic_id: self.context.topic_id.clone(),
            span: self.context.span.clone(),
            error,
            model_name: self.context.model_name.clone(),
        }
    }

    fn complete(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        self.sink.record_usage(&self.context.span, &self.usage);
        self.sink.end_span(self.end_span(None));
        debug!(
            span_id = %self.context.span.span_id,
            prompt_tokens = self.usage.prompt_tokens,
            completion_tokens = self.usage.completion_tokens,
            total_tokens = self.usage.total_tokens,
            "traced stream completed"
        );
    }

    fn fail(&mut self, error: String) {
        if self.finished {
            return;
        }
        self.finished = true;

        warn!(span_id = %self.context.span.span_id, error = %error, "traced stream failed");
        self.sink.end_span(self.end_span(Some(error)));
    }
}

impl Drop for SpanFinalizer {
    fn drop(&mut self) {
        if !self.finished {
            self.fail(StreamError::Cancelled.to_string());
        }
    }
}

pin_project! {
    /// Stream wrapper that traces a model response.
    #[must_use = "streams do nothing unless polled"]
    pub struct TracedStream<S> {
        #[pin]
        inner: S,
        finalizer: SpanFinalizer,
        mode: UsageMode,
    }
}

impl<S> TracedStream<S> {
    /// Wrap `inner`, reporting to `sink` under `context`.
    pub fn new(
        inner: S,
        context: TraceContext,
        sink: Arc<dyn TraceSink>,
        mode: UsageMode,
    ) -> Self {
        Self {
            inner,
            finalizer: SpanFinalizer::new(sink, context),
            mode,
        }
    }

    /// Usage observed so far.
    pub fn usage(&self) -> TokenUsage {
        self.finalizer.usage
    }

    /// The trace context of this stream.
    pub fn context(&self) -> &TraceContext {
        &self.finalizer.context
    }

    /// Whether the span has been closed.
    pub fn is_finished(&self) -> bool {
        self.finalizer.finished
    }
}

impl<S> fmt::Debug for TracedStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracedStream")
            .field("context", &self.finalizer.context)
            .field("usage", &self.finalizer.usage)
            .field("mode", &self.mode)
            .field("finished", &self.finalizer.finished)
            .finish_non_exhaustive()
    }
}

impl<S, C, E> Stream for TracedStream<S>
where
    S: Stream<Item = Result<C, E>>,
    C: TraceableChunk + fmt::Debug,
    E: fmt::Display,
{
    type Item = Result<C, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if this.finalizer.finished {
            return Poll::Ready(None);
        }

        match ready!(this.inner.poll_next(cx)) {
            Some(Ok(chunk)) => {
                let content = chunk.trace_content();
                if !content.is_empty() {
                    let context = &this.finalizer.context;
                    this.finalizer.sink.add_message(
                        &context.span,
                        context.model_name.as_deref(),
                        &content,
                        &chunk,
                    );
                }
                if let Some(usage) = chunk.token_usage() {
                    match this.mode {
                        UsageMode::Replace => this.finalizer.usage.replace_with(&usage),
                        UsageMode::Accumulate => this.finalizer.usage.merge(&usage),
                    }
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            Some(Err(error)) => {
                this.finalizer.fail(error.to_string());
                Poll::Ready(Some(Err(error)))
            }
            None => {
                this.finalizer.complete();
                Poll::Ready(None)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finalizer.finished {
            (0, Some(0))
        } else {
            self.inner.size_hint()
        }
    }
}

/// Trace a stream of model chunks.
///
/// The last usage a chunk reports wins. Without a trace context the stream
/// is returned unchanged.
pub fn trace_stream<S, C, E>(
    stream: S,
    context: Option<TraceContext>,
    sink: Arc<dyn TraceSink>,
) -> Either<S, TracedStream<S>>
where
    S: Stream<Item = Result<C, E>>,
    C: TraceableChunk + fmt::Debug,
    E: fmt::Display,
{
    match context {
        Some(context) => Either::Right(TracedStream::new(stream, context, sink, UsageMode::Replace)),
        None => Either::Left(stream),
    }
}

/// Trace a stream of chat completion SDK chunks.
///
/// Usage reported by individual chunks is summed.
pub fn trace_sdk_stream<S, E>(
    stream: S,
    context: Option<TraceContext>,
    sink: Arc<dyn TraceSink>,
) -> Either<S, TracedStream<S>>
where
    S: Stream<Item = Result<ChatCompletionChunk, E>>,
    E: fmt::Display,
{
    match context {
        Some(context) => {
            Either::Right(TracedStream::new(stream, context, sink, UsageMode::Accumulate))
        }
        None => Either::Left(stream),
    }
}
