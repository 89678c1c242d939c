//! Single-input, single-output chunk transforms.
//!
//! A [`ChunkTransform`] sees every upstream chunk once and may enqueue any
//! number of output chunks on the [`Controller`]; [`TransformStream`] drives
//! it over a fallible stream and calls [`ChunkTransform::flush`] when the
//! upstream completes.

use futures::{ready, Stream};
use pin_project_lite::pin_project;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Output side of a transform: chunks enqueued here are emitted in order.
#[derive(Debug)]
pub struct Controller<C> {
    queue: VecDeque<C>,
}

impl<C> Default for Controller<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Controller<C> {
    /// Create an empty controller.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Emit a chunk downstream.
    pub fn enqueue(&mut self, chunk: C) {
        self.queue.push_back(chunk);
    }

    /// Number of chunks waiting to be emitted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Take the next chunk to emit.
    pub fn dequeue(&mut self) -> Option<C> {
        self.queue.pop_front()
    }

    /// Take every waiting chunk.
    pub fn drain(&mut self) -> impl Iterator<Item = C> + '_ {
        self.queue.drain(..)
    }
}

/// A stateful per-stream chunk transform.
pub trait ChunkTransform<C> {
    /// Handle one upstream chunk.
    fn transform(&mut self, chunk: C, controller: &mut Controller<C>);

    /// Called once after the upstream completed normally.
    fn flush(&mut self, _controller: &mut Controller<C>) {}
}

pin_project! {
    /// Stream that runs a [`ChunkTransform`] over a fallible upstream.
    ///
    /// An upstream error is forwarded as-is and ends the stream; whatever
    /// the transform still buffers at that point is dropped.
    pub struct TransformStream<S, T, C> {
        #[pin]
        inner: S,
        transformer: T,
        controller: Controller<C>,
        done: bool,
    }
}

impl<S, T, C> TransformStream<S, T, C> {
    /// Create a new transform stream.
    pub fn new(inner: S, transformer: T) -> Self {
        Self {
            inner,
            transformer,
            controller: Controller::new(),
            done: false,
        }
    }

    /// Get the transform.
    pub fn transformer(&self) -> &T {
        &self.transformer
    }
}

impl<S, T, C, E> Stream for TransformStream<S, T, C>
where
    S: Stream<Item = Result<C, E>>,
    T: ChunkTransform<C>,
{
    type Item = Result<C, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            if let Some(chunk) = this.controller.dequeue() {
                return Poll::Ready(Some(Ok(chunk)));
            }
            if *this.done {
                return Poll::Ready(None);
            }

            match ready!(this.inner.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => this.transformer.transform(chunk, this.controller),
                Some(Err(e)) => {
                    *this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    *this.done = true;
                    this.transformer.flush(this.controller);
                }
            }
        }
    }
}

/// Extension trait for attaching a transform to a stream.
pub trait TransformStreamExt<C, E>: Stream<Item = Result<C, E>> + Sized {
    /// Run `transformer` over this stream.
    fn transform_with<T>(self, transformer: T) -> TransformStream<Self, T, C>
    where
        T: ChunkTransform<C>,
    {
        TransformStream::new(self, transformer)
    }
}

impl<S, C, E> TransformStreamExt<C, E> for S where S: Stream<Item = Result<C, E>> {}
