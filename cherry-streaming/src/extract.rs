//! Batch extraction of tagged reasoning.
//!
//! Works on a complete text: every `opening(.*?)closing` span is removed,
//! its inner text becomes reasoning, and the remaining pieces are rejoined.
//! Streams go through [`ReasoningExtractor`](crate::ReasoningExtractor)
//! instead, which never re-scans the whole buffer.

use cherry_core::{CoreError, Result, TagPair};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A text split into answer text and reasoning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extracted {
    /// The text with all tagged spans removed.
    pub text: String,
    /// Inner text of every tagged span joined by the separator, or `None`
    /// when nothing was tagged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl Extracted {
    /// Text without reasoning.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reasoning: None,
        }
    }
}

/// Extracts tagged spans from complete texts.
///
/// The pattern is compiled once, so a single extractor can be reused for
/// every message of a conversation.
#[derive(Debug, Clone)]
pub struct TagExtractor {
    pair: TagPair,
    pattern: Regex,
    start_with_reasoning: bool,
}

impl TagExtractor {
    /// Compile an extractor for the given tag pair.
    pub fn new(pair: TagPair) -> Result<Self> {
        let source = format!(
            "(?s){}(.*?){}",
            regex::escape(pair.opening_tag()),
            regex::escape(pair.closing_tag())
        );
        let pattern = Regex::new(&source).map_err(|e| CoreError::configuration(e.to_string()))?;

        Ok(Self {
            pair,
            pattern,
            start_with_reasoning: false,
        })
    }

    /// Treat every text as if it began with the opening tag.
    #[must_use]
    pub fn start_with_reasoning(mut self, start: bool) -> Self {
        self.start_with_reasoning = start;
        self
    }

    /// The tag pair in use.
    #[must_use]
    pub fn tag_pair(&self) -> &TagPair {
        &self.pair
    }

    /// Split `full_text` into text and reasoning.
    ///
    /// Spans are removed last-first so earlier match offsets stay valid.
    /// Where a span is removed, one separator is inserted only if text
    /// remains on both sides, so neither leading, trailing nor doubled
    /// separators appear when spans sit next to each other or at the edges.
    ///
    /// Every span counts toward `reasoning`, including empty ones: `"a<think></think>b"`
    /// gives `Some("")`. The streaming extractor never emits empty chunks, so
    /// its collected reasoning differs from this result when a span is empty.
    #[must_use]
    pub fn extract(&self, full_text: &str) -> Extracted {
        if full_text.is_empty() {
            return Extracted::default();
        }

        let prefixed;
        let source = if self.start_with_reasoning {
            prefixed = format!("{}{}", self.pair.opening_tag(), full_text);
            prefixed.as_str()
        } else {
            full_text
        };

        let matches: Vec<_> = self
            .pattern
            .captures_iter(source)
            .filter_map(|caps| Some((caps.get(0)?.range(), caps.get(1)?.as_str())))
            .collect();

        if matches.is_empty() {
            if self.start_with_reasoning {
                // Never closed: the whole text is reasoning.
                return Extracted {
                    text: String::new(),
                    reasoning: Some(full_text.to_string()),
                };
            }
            return Extracted::text(full_text);
        }

        let separator = self.pair.separator();
        let reasoning = matches
            .iter()
            .map(|(_, inner)| *inner)
            .collect::<Vec<_>>()
            .join(separator);

        let mut text = source.to_string();
        for (i, (range, _)) in matches.iter().enumerate().rev() {
            // Text between the previous span and this one. When it is empty
            // the previous span's removal takes care of joining.
            let gap_start = if i == 0 { 0 } else { matches[i - 1].0.end };
            let gap_is_empty = gap_start == range.start;

            let before = &text[..range.start];
            let after = &text[range.end..];
            let joint = if !gap_is_empty && !after.is_empty() {
                separator
            } else {
                ""
            };
            text = format!("{before}{joint}{after}");
        }

        Extracted {
            text,
            reasoning: Some(reasoning),
        }
    }
}

/// Split `full_text` into text and reasoning using `pair`.
///
/// ```rust
/// use cherry_core::TagPair;
/// use cherry_streaming::extract_tagged;
///
/// let pair = TagPair::new("<think>", "</think>", "\n").unwrap();
/// let out = extract_tagged("before<think>mid</think>after", &pair).unwrap();
/// assert_eq!(out.text, "before\nafter");
/// assert_eq!(out.reasoning.as_deref(), Some("mid"));
/// ```
pub fn extract_tagged(full_text: &str, pair: &TagPair) -> Result<Extracted> {
    Ok(TagExtractor::new(pair.clone())?.extract(full_text))
}
