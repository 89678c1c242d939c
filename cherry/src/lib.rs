//! # Cherry - Reasoning-Aware Model Stream Processing
//!
//! Cherry turns the raw output stream of a language model into something a
//! chat client can render: reasoning wrapped in tags such as
//! `<think>…</think>` is split out from the answer as it streams, and the
//! stream's content, token usage and completion are reported to a tracing
//! sink.
//!
//! ## Quick Start
//!
//! ```
//! use cherry::prelude::*;
//!
//! let out = extract_tagged("<think>2 + 2</think>4", &TagPair::default()).unwrap();
//! assert_eq!(out.reasoning.as_deref(), Some("2 + 2"));
//! assert_eq!(out.text, "4");
//! ```
//!
//! ## Architecture
//!
//! Cherry is organized as a workspace of focused crates:
//!
//! - [`core`]: chunk types, tag pairs, settings, usage and provider shapes
//! - [`streaming`]: boundary scanning, extraction and tracing adapters
//!
//! [`ChatStreamPipeline`] combines both for the common case.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod pipeline;

/// Core types.
pub use cherry_core as core;

/// Stream processing.
pub use cherry_streaming as streaming;

pub use pipeline::{ChatStreamPipeline, MaybeTraced};

pub use cherry_core::{
    CoreError, DeltaChunk, DeltaKind, ProviderChunk, ReasoningSettings, StreamChunk, TagPair,
    TagPreset, TokenUsage, TraceContext, TraceSpan,
};
pub use cherry_streaming::{
    collect_partition, extract_tagged, find_potential_start, trace_sdk_stream, trace_stream,
    Extracted, InMemorySink, ReasoningExtractor, ReasoningStreamExt, StreamError, TagExtractor,
    TraceSink, TracingSink,
};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::pipeline::ChatStreamPipeline;
    pub use cherry_core::prelude::*;
    pub use cherry_streaming::prelude::*;
}
