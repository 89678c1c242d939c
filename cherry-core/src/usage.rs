//! Token usage tracking for streamed model calls.
//!
//! A stream tracing adapter owns one [`TokenUsage`] per stream and reports it
//! once the stream has ended. Providers disagree on how usage is reported:
//! some send a single cumulative record near the end, others send partial
//! counts per chunk. [`TokenUsage::replace_with`] and [`TokenUsage::merge`]
//! cover the two cases.

use serde::{Deserialize, Serialize};

/// Token counters for one streamed model call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of tokens in the prompt.
    #[serde(default)]
    pub prompt_tokens: u64,
    /// Number of tokens in the completion.
    #[serde(default)]
    pub completion_tokens: u64,
    /// Total tokens as reported by the provider.
    #[serde(default)]
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Create a new empty usage record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create usage with prompt and completion tokens; the total is derived.
    #[must_use]
    pub fn with_tokens(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }

    /// Set the total explicitly.
    #[must_use]
    pub fn total_tokens(mut self, total: u64) -> Self {
        self.total_tokens = total;
        self
    }

    /// Add another record's counters to this one. Counters saturate at `u64::MAX`.
    pub fn merge(&mut self, other: &TokenUsage) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.completion_tokens = self.completion_tokens.saturating_add(other.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(other.total_tokens);
    }

    /// Overwrite every counter with the other record's counters.
    pub fn replace_with(&mut self, other: &TokenUsage) {
        *self = *other;
    }

    /// Check if all counters are zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prompt_tokens == 0 && self.completion_tokens == 0 && self.total_tokens == 0
    }
}

impl std::ops::Add for TokenUsage {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self.merge(&rhs);
        self
    }
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
