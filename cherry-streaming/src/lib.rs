//! # cherry-streaming
//!
//! Stream processing for model output.
//!
//! This crate turns raw model output into separated reasoning and answer
//! text, and reports what flowed through a stream to a trace sink.
//!
//! ## Core Concepts
//!
//! - **[`find_potential_start`]**: Where a delimiter may begin in a buffer
//! - **[`extract_tagged`]**: Split a finished text into reasoning and answer
//! - **[`ReasoningExtractor`]**: The same split, incrementally over a stream
//! - **[`TracedStream`]**: Report content, usage and span completion
//!
//! ## Example - Batch Extraction
//!
//! ```
//! use cherry_core::TagPair;
//! use cherry_streaming::extract_tagged;
//!
//! let out = extract_tagged("<think>plan</think>answer", &TagPair::default()).unwrap();
//! assert_eq!(out.reasoning.as_deref(), Some("plan"));
//! assert_eq!(out.text, "answer");
//! ```
//!
//! ## Example - Streaming Extraction
//!
//! ```ignore
//! use cherry_streaming::ReasoningStreamExt;
//! use futures::StreamExt;
//!
//! let mut chunks = model_stream.extract_reasoning(TagPair::default());
//! while let Some(chunk) = chunks.next().await {
//!     println!("{:?}", chunk?);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod boundary;
pub mod error;
pub mod extract;
pub mod reasoning;
pub mod trace;
pub mod transform;

// Re-exports
pub use boundary::{find_potential_start, is_complete_match};
pub use error::{StreamError, StreamResult};
pub use extract::{extract_tagged, Extracted, TagExtractor};
pub use reasoning::{collect_partition, MaybeReasoningStream, ReasoningExtractor, ReasoningStreamExt};
pub use trace::{
    trace_sdk_stream, trace_stream, EndSpan, InMemorySink, TraceSink, TraceableChunk,
    TracedStream, TracingSink, UsageMode,
};
pub use transform::{ChunkTransform, Controller, TransformStream, TransformStreamExt};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::error::{StreamError, StreamResult};
    pub use crate::extract::{extract_tagged, Extracted, TagExtractor};
    pub use crate::reasoning::{collect_partition, ReasoningExtractor, ReasoningStreamExt};
    pub use crate::trace::{trace_sdk_stream, trace_stream, TraceSink, TraceableChunk};
    pub use crate::transform::{ChunkTransform, TransformStreamExt};
}
