//! # cherry-core
//!
//! Core types shared by the cherry model-output stream pipeline.
//!
//! - **Chunks**: the normalized [`StreamChunk`] and the [`DeltaChunk`] contract
//!   the reasoning extractor relies on
//! - **Provider shapes**: chat completion, Responses API and Gemini chunks,
//!   closed under [`ProviderChunk`]
//! - **Tags**: validated [`TagPair`]s and per-model presets
//! - **Usage**: the [`TokenUsage`] accumulator record
//! - **Trace**: explicit [`TraceContext`] for span reporting
//! - **Settings**: [`ReasoningSettings`]
//!
//! ## Example
//!
//! ```rust
//! use cherry_core::{ReasoningSettings, TagPair, TokenUsage};
//!
//! let pair = TagPair::new("<think>", "</think>", "\n").expect("valid pair");
//! let settings = ReasoningSettings::new()
//!     .enable_reasoning(true)
//!     .tag_pair(pair);
//! assert_eq!(settings.resolve_tag_pair("any-model").opening_tag(), "<think>");
//!
//! let mut usage = TokenUsage::with_tokens(10, 5);
//! usage += TokenUsage::with_tokens(0, 3);
//! assert_eq!(usage.total_tokens, 18);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod chunk;
pub mod errors;
pub mod provider;
pub mod settings;
pub mod tags;
pub mod trace;
pub mod usage;

// Re-exports for convenience
pub use chunk::{DeltaChunk, DeltaKind, StreamChunk};
pub use errors::{CoreError, Result};
pub use provider::{
    ChatCompletionChunk, CompletionUsage, GenerateContentResponse, ProviderChunk,
    ResponseStreamEvent, ResponseUsage,
};
pub use settings::ReasoningSettings;
pub use tags::{TagPair, TagPreset, DEFAULT_SEPARATOR};
pub use trace::{TraceContext, TraceSpan};
pub use usage::TokenUsage;

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::chunk::{DeltaChunk, DeltaKind, StreamChunk};
    pub use crate::errors::{CoreError, Result};
    pub use crate::provider::ProviderChunk;
    pub use crate::settings::ReasoningSettings;
    pub use crate::tags::{TagPair, TagPreset};
    pub use crate::trace::{TraceContext, TraceSpan};
    pub use crate::usage::TokenUsage;
}
