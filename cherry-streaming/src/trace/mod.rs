//! Tracing adapters for model output streams.
//!
//! Wrap a stream with [`trace_stream`] (or [`trace_sdk_stream`] for raw chat
//! completion chunks) to report its content, token usage and completion to a
//! [`TraceSink`]. Items pass through unchanged.

pub mod adapter;
pub mod content;
pub mod sink;

pub use adapter::{trace_sdk_stream, trace_stream, TracedStream, UsageMode};
pub use content::{TraceableChunk, IMAGE_PLACEHOLDER};
pub use sink::{EndSpan, InMemorySink, SinkEvent, TraceSink, TracingSink, TRACE_TARGET};
