//! Reasoning tag pairs.
//!
//! A [`TagPair`] names the delimiters a model uses to wrap its reasoning
//! ("thinking") output inside ordinary text, plus the separator inserted
//! between neighbouring runs once the tagged spans are taken out.
//!
//! Pairs are validated on construction and on deserialization, so a pair
//! that cannot be scanned unambiguously never reaches an extractor.

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

/// Separator used by every built-in preset.
pub const DEFAULT_SEPARATOR: &str = "\n";

/// Opening/closing delimiters and the separator used when rejoining text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TagPairConfig", rename_all = "camelCase")]
pub struct TagPair {
    opening_tag: String,
    closing_tag: String,
    separator: String,
}

/// Unvalidated wire form of a [`TagPair`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TagPairConfig {
    opening_tag: String,
    closing_tag: String,
    #[serde(default = "default_separator")]
    separator: String,
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

impl TryFrom<TagPairConfig> for TagPair {
    type Error = CoreError;

    fn try_from(config: TagPairConfig) -> Result<Self> {
        Self::new(config.opening_tag, config.closing_tag, config.separator)
    }
}

impl TagPair {
    /// Create a validated tag pair.
    ///
    /// Fails when either tag is empty, when both tags are identical, or when
    /// one tag contains the other: in all of those cases the scanner could
    /// not tell an opening from a closing delimiter.
    pub fn new(
        opening_tag: impl Into<String>,
        closing_tag: impl Into<String>,
        separator: impl Into<String>,
    ) -> Result<Self> {
        let opening_tag = opening_tag.into();
        let closing_tag = closing_tag.into();

        if opening_tag.is_empty() {
            return Err(CoreError::invalid_tag_pair("opening tag is empty"));
        }
        if closing_tag.is_empty() {
            return Err(CoreError::invalid_tag_pair("closing tag is empty"));
        }
        if opening_tag == closing_tag {
            return Err(CoreError::invalid_tag_pair(format!(
                "opening and closing tags are both {opening_tag:?}"
            )));
        }
        if closing_tag.contains(opening_tag.as_str()) {
            return Err(CoreError::invalid_tag_pair(format!(
                "closing tag {closing_tag:?} contains opening tag {opening_tag:?}"
            )));
        }
        if opening_tag.contains(closing_tag.as_str()) {
            return Err(CoreError::invalid_tag_pair(format!(
                "opening tag {opening_tag:?} contains closing tag {closing_tag:?}"
            )));
        }

        Ok(Self {
            opening_tag,
            closing_tag,
            separator: separator.into(),
        })
    }

    /// Pick the preset matching a model id.
    #[must_use]
    pub fn for_model(model_id: &str) -> Self {
        TagPreset::for_model(model_id).tag_pair()
    }

    /// The opening delimiter.
    #[must_use]
    pub fn opening_tag(&self) -> &str {
        &self.opening_tag
    }

    /// The closing delimiter.
    #[must_use]
    pub fn closing_tag(&self) -> &str {
        &self.closing_tag
    }

    /// The separator inserted between rejoined runs.
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Replace the separator.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

impl Default for TagPair {
    fn default() -> Self {
        TagPreset::Think.tag_pair()
    }
}

impl From<TagPreset> for TagPair {
    fn from(preset: TagPreset) -> Self {
        preset.tag_pair()
    }
}

/// Tag pairs emitted by known reasoning models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagPreset {
    /// `<think>` ... `</think>` (DeepSeek R1, Qwen3, QwQ and most open models).
    Think,
    /// `<thought>` ... `</thought>` (Gemini and Gemma).
    Thought,
    /// `###Thinking` ... `###Response` (GLM Zero).
    HashThinking,
    /// `◁think▷` ... `◁/think▷` (Kimi).
    Kimi,
    /// `<seed:think>` ... `</seed:think>` (Seed).
    SeedThink,
}

impl TagPreset {
    /// Every preset, in lookup order.
    pub const ALL: [TagPreset; 5] = [
        Self::Think,
        Self::Thought,
        Self::HashThinking,
        Self::Kimi,
        Self::SeedThink,
    ];

    /// The `(opening, closing)` delimiters.
    #[must_use]
    pub fn tags(self) -> (&'static str, &'static str) {
        match self {
            Self::Think => ("<think>", "</think>"),
            Self::Thought => ("<thought>", "</thought>"),
            Self::HashThinking => ("###Thinking", "###Response"),
            Self::Kimi => ("◁think▷", "◁/think▷"),
            Self::SeedThink => ("<seed:think>", "</seed:think>"),
        }
    }

    /// Build the tag pair for this preset.
    #[must_use]
    pub fn tag_pair(self) -> TagPair {
        let (opening, closing) = self.tags();
        // Presets are known-valid, so skip the checks in `TagPair::new`.
        TagPair {
            opening_tag: opening.to_string(),
            closing_tag: closing.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Pick a preset from a model id. Matching is case-insensitive and falls
    /// back to [`TagPreset::Think`].
    #[must_use]
    pub fn for_model(model_id: &str) -> Self {
        let id = model_id.to_lowercase();

        if id.contains("gemini") || id.contains("gemma") {
            Self::Thought
        } else if id.contains("glm-zero") || id.contains("glm-z1") {
            Self::HashThinking
        } else if id.contains("kimi") {
            Self::Kimi
        } else if id.contains("seed") {
            Self::SeedThink
        } else {
            Self::Think
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_new_valid_pair() {
        let pair = TagPair::new("<think>", "</think>", "\n").unwrap();
        assert_eq!(pair.opening_tag(), "<think>");
        assert_eq!(pair.closing_tag(), "</think>");
        assert_eq!(pair.separator(), "\n");
    }

    #[rstest]
    #[case("", "</think>")]
    #[case("<think>", "")]
    #[case("<think>", "<think>")]
    #[case("<t>", "</t><t>")]
    #[case("<think>x", "think")]
    fn test_new_rejects_degenerate_pairs(#[case] opening: &str, #[case] closing: &str) {
        let err = TagPair::new(opening, closing, "\n").unwrap_err();
        assert!(matches!(err, CoreError::InvalidTagPair { .. }));
    }

    #[test]
    fn test_presets_are_valid() {
        for preset in TagPreset::ALL {
            let (opening, closing) = preset.tags();
            let checked = TagPair::new(opening, closing, DEFAULT_SEPARATOR).unwrap();
            assert_eq!(checked, preset.tag_pair());
        }
    }

    #[rstest]
    #[case("deepseek-r1", TagPreset::Think)]
    #[case("Qwen3-235B-A22B", TagPreset::Think)]
    #[case("gemini-2.5-pro", TagPreset::Thought)]
    #[case("gemma-3-27b", TagPreset::Thought)]
    #[case("GLM-Zero-Preview", TagPreset::HashThinking)]
    #[case("kimi-k1.5", TagPreset::Kimi)]
    #[case("doubao-seed-1.6", TagPreset::SeedThink)]
    fn test_for_model(#[case] model: &str, #[case] expected: TagPreset) {
        assert_eq!(TagPreset::for_model(model), expected);
        assert_eq!(TagPair::for_model(model), expected.tag_pair());
    }

    #[test]
    fn test_deserialize_defaults_separator() {
        let pair: TagPair =
            serde_json::from_str(r#"{"openingTag":"<r>","closingTag":"</r>"}"#).unwrap();
        assert_eq!(pair.separator(), "\n");
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        let result =
            serde_json::from_str::<TagPair>(r#"{"openingTag":"<r>","closingTag":"<r>"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_camel_case() {
        let json = serde_json::to_value(TagPair::default()).unwrap();
        assert_eq!(json["openingTag"], "<think>");
        assert_eq!(json["closingTag"], "</think>");
    }
}
