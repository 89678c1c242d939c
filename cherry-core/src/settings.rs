//! Reasoning extraction settings.
//!
//! This module provides the `ReasoningSettings` type that decides whether a
//! stream goes through reasoning extraction and which tags it uses.

use serde::{Deserialize, Serialize};

use crate::tags::TagPair;

/// Settings for reasoning extraction on one model call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningSettings {
    /// Whether tagged reasoning is split out of the text stream.
    #[serde(default)]
    pub enable_reasoning: bool,

    /// Tags to extract. When unset, the pair is picked from the model id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_pair: Option<TagPair>,

    /// Treat the stream as already inside a reasoning block.
    #[serde(default)]
    pub start_with_reasoning: bool,
}

impl ReasoningSettings {
    /// Create new settings with extraction disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable extraction.
    #[must_use]
    pub fn enable_reasoning(mut self, enabled: bool) -> Self {
        self.enable_reasoning = enabled;
        self
    }

    /// Set the tag pair.
    #[must_use]
    pub fn tag_pair(mut self, pair: TagPair) -> Self {
        self.tag_pair = Some(pair);
        self
    }

    /// Start inside a reasoning block.
    #[must_use]
    pub fn start_with_reasoning(mut self, start: bool) -> Self {
        self.start_with_reasoning = start;
        self
    }

    /// The configured tag pair, or the preset for `model_id`.
    #[must_use]
    pub fn resolve_tag_pair(&self, model_id: &str) -> TagPair {
        self.tag_pair
            .clone()
            .unwrap_or_else(|| TagPair::for_model(model_id))
    }
}
