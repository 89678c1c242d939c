//! Streaming extraction of tagged reasoning.
//!
//! [`ReasoningExtractor`] re-tags `text-delta` chunks as they arrive: text
//! inside the tag pair becomes `reasoning`, everything else stays
//! `text-delta`. Text is held back only while it could still be the start
//! of a delimiter, so a tag split across chunks (`"<thi"` + `"nk>"`) is
//! still recognised.

use cherry_core::{DeltaChunk, DeltaKind, ReasoningSettings, StreamChunk, TagPair};
use futures::future::Either;
use futures::{Stream, TryStreamExt};
use tracing::trace;

use crate::boundary::{find_potential_start, is_complete_match};
use crate::extract::Extracted;
use crate::transform::{ChunkTransform, Controller, TransformStream};

/// Mutable state of one extraction session.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ExtractionState {
    buffer: String,
    is_reasoning: bool,
    after_switch: bool,
    is_first_reasoning: bool,
    is_first_text: bool,
}

impl ExtractionState {
    fn new(start_with_reasoning: bool) -> Self {
        Self {
            buffer: String::new(),
            is_reasoning: start_with_reasoning,
            after_switch: false,
            is_first_reasoning: true,
            is_first_text: true,
        }
    }

    fn kind(&self) -> DeltaKind {
        if self.is_reasoning {
            DeltaKind::Reasoning
        } else {
            DeltaKind::Text
        }
    }

    /// Emit `text` in the current mode. Empty text is never emitted.
    fn publish<C: DeltaChunk>(
        &mut self,
        text: String,
        separator: &str,
        template: &C,
        controller: &mut Controller<C>,
    ) {
        if text.is_empty() {
            return;
        }

        let is_first = if self.is_reasoning {
            self.is_first_reasoning
        } else {
            self.is_first_text
        };
        let payload = if self.after_switch && !is_first {
            format!("{separator}{text}")
        } else {
            text
        };

        controller.enqueue(template.retag(self.kind(), payload));

        self.after_switch = false;
        if self.is_reasoning {
            self.is_first_reasoning = false;
        } else {
            self.is_first_text = false;
        }
    }
}

/// Per-stream transform that splits tagged reasoning out of text deltas.
///
/// Chunks that are not `text-delta` pass through untouched and in order.
/// Text still held back (for example a dangling `"<thi"`) is emitted in the
/// current mode ahead of a terminal chunk, or when the upstream completes.
#[derive(Debug, Clone)]
pub struct ReasoningExtractor<C> {
    pair: TagPair,
    state: ExtractionState,
    template: Option<C>,
}

impl<C> ReasoningExtractor<C> {
    /// Create an extractor starting in plain-text mode.
    #[must_use]
    pub fn new(pair: TagPair) -> Self {
        Self {
            pair,
            state: ExtractionState::new(false),
            template: None,
        }
    }

    /// Start inside a reasoning block.
    #[must_use]
    pub fn start_with_reasoning(mut self, start: bool) -> Self {
        self.state.is_reasoning = start;
        self
    }

    /// The tag pair in use.
    #[must_use]
    pub fn tag_pair(&self) -> &TagPair {
        &self.pair
    }

    /// Whether the extractor is currently inside a reasoning block.
    #[must_use]
    pub fn is_reasoning(&self) -> bool {
        self.state.is_reasoning
    }

    /// Text held back because it may be the start of a tag.
    #[must_use]
    pub fn pending(&self) -> &str {
        &self.state.buffer
    }
}

impl<C: DeltaChunk> ChunkTransform<C> for ReasoningExtractor<C> {
    fn transform(&mut self, chunk: C, controller: &mut Controller<C>) {
        let Self {
            pair,
            state,
            template,
        } = self;

        match chunk.text_delta() {
            Some(text) => state.buffer.push_str(text),
            None => {
                if chunk.is_terminal() {
                    let text = std::mem::take(&mut state.buffer);
                    let shape = template.as_ref().unwrap_or(&chunk);
                    state.publish(text, pair.separator(), shape, controller);
                }
                controller.enqueue(chunk);
                return;
            }
        }

        loop {
            let next_tag = if state.is_reasoning {
                pair.closing_tag()
            } else {
                pair.opening_tag()
            };

            let Some(start) = find_potential_start(&state.buffer, next_tag) else {
                let text = std::mem::take(&mut state.buffer);
                state.publish(text, pair.separator(), &chunk, controller);
                break;
            };

            let rest = state.buffer.split_off(start);
            let safe = std::mem::replace(&mut state.buffer, rest);
            state.publish(safe, pair.separator(), &chunk, controller);

            if !is_complete_match(&state.buffer, 0, next_tag) {
                // Partial tag at the end of the buffer; wait for more input.
                break;
            }

            state.buffer.drain(..next_tag.len());
            state.is_reasoning = !state.is_reasoning;
            state.after_switch = true;
            trace!(reasoning = state.is_reasoning, tag = next_tag, "reasoning mode switch");
        }

        *template = Some(chunk);
    }

    fn flush(&mut self, controller: &mut Controller<C>) {
        let Some(template) = self.template.as_ref() else {
            return;
        };
        let text = std::mem::take(&mut self.state.buffer);
        self.state
            .publish(text, self.pair.separator(), template, controller);
    }
}

/// A stream that is either passed through or run through reasoning extraction.
pub type MaybeReasoningStream<S, C> = Either<S, TransformStream<S, ReasoningExtractor<C>, C>>;

/// Extension trait for reasoning extraction on chunk streams.
pub trait ReasoningStreamExt<C, E>: Stream<Item = Result<C, E>> + Sized {
    /// Split tagged reasoning out of this stream's text deltas.
    fn extract_reasoning(self, pair: TagPair) -> TransformStream<Self, ReasoningExtractor<C>, C>
    where
        C: DeltaChunk,
    {
        TransformStream::new(self, ReasoningExtractor::new(pair))
    }

    /// Apply extraction according to `settings`.
    ///
    /// With `enable_reasoning` off the stream is returned as-is: no
    /// buffering and no rewriting.
    fn extract_reasoning_with(
        self,
        settings: &ReasoningSettings,
        model_id: &str,
    ) -> MaybeReasoningStream<Self, C>
    where
        C: DeltaChunk,
    {
        if !settings.enable_reasoning {
            return Either::Left(self);
        }

        let extractor = ReasoningExtractor::new(settings.resolve_tag_pair(model_id))
            .start_with_reasoning(settings.start_with_reasoning);
        Either::Right(TransformStream::new(self, extractor))
    }
}

impl<S, C, E> ReasoningStreamExt<C, E> for S where S: Stream<Item = Result<C, E>> {}

/// Fold an extracted stream into its final text/reasoning partition.
///
/// `reasoning` is `None` when no reasoning chunk was seen. Non-text chunks
/// are ignored.
pub async fn collect_partition<S, E>(stream: S) -> Result<Extracted, E>
where
    S: Stream<Item = Result<StreamChunk, E>>,
{
    stream
        .try_fold(Extracted::default(), |mut acc, chunk| async move {
            match chunk {
                StreamChunk::TextDelta { text_delta } => acc.text.push_str(&text_delta),
                StreamChunk::Reasoning { text_delta } => acc
                    .reasoning
                    .get_or_insert_with(String::new)
                    .push_str(&text_delta),
                _ => {}
            }
            Ok(acc)
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_tagged;
    use futures::{stream, StreamExt};
    use std::convert::Infallible;

    fn think() -> TagPair {
        TagPair::new("<think>", "</think>", "\n").unwrap()
    }

    fn text_stream(
        parts: &[&str],
    ) -> impl Stream<Item = Result<StreamChunk, Infallible>> + Unpin {
        let chunks: Vec<_> = parts.iter().map(|p| Ok(StreamChunk::text(*p))).collect();
        stream::iter(chunks)
    }

    async fn run(parts: &[&str], pair: TagPair) -> Vec<StreamChunk> {
        text_stream(parts)
            .extract_reasoning(pair)
            .map(|r| r.unwrap())
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_tag_split_across_chunks() {
        let out = run(&["<thi", "nk>reasoning text</think>answer"], think()).await;
        assert_eq!(
            out,
            vec![
                StreamChunk::reasoning("reasoning text"),
                StreamChunk::text("answer"),
            ]
        );
    }

    #[tokio::test]
    async fn test_matches_batch_partition() {
        let full = "<think>reasoning text</think>answer";
        let batch = extract_tagged(full, &think()).unwrap();

        let streamed = collect_partition(
            text_stream(&["<thi", "nk>reasoning text</think>answer"]).extract_reasoning(think()),
        )
        .await
        .unwrap();

        assert_eq!(streamed, batch);
    }

    #[tokio::test]
    async fn test_empty_span_yields_no_reasoning() {
        let streamed =
            collect_partition(text_stream(&["a<think></think>b"]).extract_reasoning(think()))
                .await
                .unwrap();
        assert_eq!(streamed.text, "a\nb");
        assert_eq!(streamed.reasoning, None);

        let streamed = collect_partition(
            text_stream(&["<think>a</think><think></think>b"]).extract_reasoning(think()),
        )
        .await
        .unwrap();
        assert_eq!(streamed.text, "b");
        assert_eq!(streamed.reasoning.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_every_split_point_matches_batch() {
        let full = "intro<think>step one\nstep two</think>middle<think>again</think>end";
        let batch = extract_tagged(full, &think()).unwrap();

        for split in (1..full.len()).filter(|i| full.is_char_boundary(*i)) {
            let (a, b) = full.split_at(split);
            let streamed = collect_partition(text_stream(&[a, b]).extract_reasoning(think()))
                .await
                .unwrap();
            assert_eq!(streamed, batch, "split at {split}");
        }
    }

    #[tokio::test]
    async fn test_char_by_char_multibyte_tags() {
        let pair = cherry_core::TagPreset::Kimi.tag_pair();
        let full = "◁think▷思考◁/think▷答案";
        let chars: Vec<String> = full.chars().map(String::from).collect();
        let parts: Vec<&str> = chars.iter().map(String::as_str).collect();

        let streamed = collect_partition(text_stream(&parts).extract_reasoning(pair))
            .await
            .unwrap();
        assert_eq!(streamed.reasoning.as_deref(), Some("思考"));
        assert_eq!(streamed.text, "答案");
    }

    #[test]
    fn test_text_is_released_before_tag_completes() {
        let mut extractor = ReasoningExtractor::new(think());
        let mut controller = Controller::new();

        extractor.transform(StreamChunk::text("hello <th"), &mut controller);
        assert_eq!(
            controller.drain().collect::<Vec<_>>(),
            vec![StreamChunk::text("hello ")]
        );
        assert_eq!(extractor.pending(), "<th");
        assert!(!extractor.is_reasoning());

        extractor.transform(StreamChunk::text("ink>"), &mut controller);
        assert!(controller.is_empty());
        assert!(extractor.is_reasoning());
        assert_eq!(extractor.pending(), "");
    }

    #[tokio::test]
    async fn test_separator_between_runs_of_same_kind() {
        let out = run(&["a<think>x</think>b<think>y</think>c"], think()).await;
        assert_eq!(
            out,
            vec![
                StreamChunk::text("a"),
                StreamChunk::reasoning("x"),
                StreamChunk::text("\nb"),
                StreamChunk::reasoning("\ny"),
                StreamChunk::text("\nc"),
            ]
        );
    }

    #[tokio::test]
    async fn test_no_empty_chunks() {
        let out = run(&["<think>", "</think>", "x"], think()).await;
        assert_eq!(out, vec![StreamChunk::text("x")]);
    }

    #[tokio::test]
    async fn test_non_text_chunks_pass_through_in_order() {
        let finish = StreamChunk::finish(Some("stop".into()), None);
        let input = stream::iter(vec![
            Ok::<_, Infallible>(StreamChunk::text("<think>a")),
            Ok(StreamChunk::ToolCallDelta {
                tool_call_id: "c".into(),
                tool_name: "t".into(),
                args_text_delta: "{}".into(),
            }),
            Ok(StreamChunk::text("</think>b")),
            Ok(finish.clone()),
        ]);

        let out: Vec<_> = input
            .extract_reasoning(think())
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(out[0], StreamChunk::reasoning("a"));
        assert_eq!(out[1].type_name(), "tool-call-delta");
        assert_eq!(out[2], StreamChunk::text("b"));
        assert_eq!(out[3], finish);
    }

    #[tokio::test]
    async fn test_flushes_dangling_partial_tag() {
        let out = run(&["answer <thi"], think()).await;
        assert_eq!(
            out,
            vec![StreamChunk::text("answer "), StreamChunk::text("<thi")]
        );
    }

    #[tokio::test]
    async fn test_held_back_text_precedes_finish() {
        let finish = StreamChunk::finish(Some("stop".into()), None);
        let input = stream::iter(vec![
            Ok::<_, Infallible>(StreamChunk::text("a < b and <")),
            Ok(finish.clone()),
        ]);

        let out: Vec<_> = input
            .extract_reasoning(think())
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(
            out,
            vec![
                StreamChunk::text("a < b and "),
                StreamChunk::text("<"),
                finish,
            ]
        );
    }

    #[tokio::test]
    async fn test_held_back_reasoning_precedes_finish() {
        let finish = StreamChunk::finish(None, None);
        let input = stream::iter(vec![
            Ok::<_, Infallible>(StreamChunk::text("<think>plan </thi")),
            Ok(finish.clone()),
            Ok(StreamChunk::text("nk>late")),
        ]);

        let out: Vec<_> = input
            .extract_reasoning(think())
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(
            out,
            vec![
                StreamChunk::reasoning("plan "),
                StreamChunk::reasoning("</thi"),
                finish,
                StreamChunk::reasoning("nk>late"),
            ]
        );
    }

    #[tokio::test]
    async fn test_unclosed_reasoning_is_flushed_as_reasoning() {
        let out = run(&["<think>still going </thi"], think()).await;
        assert_eq!(
            out,
            vec![
                StreamChunk::reasoning("still going "),
                StreamChunk::reasoning("</thi"),
            ]
        );
    }

    #[tokio::test]
    async fn test_upstream_error_discards_buffer() {
        let input = stream::iter(vec![
            Ok(StreamChunk::text("ok <thi")),
            Err("upstream failed"),
        ]);
        let out: Vec<_> = input.extract_reasoning(think()).collect().await;
        assert_eq!(out, vec![Ok(StreamChunk::text("ok ")), Err("upstream failed")]);
    }

    #[tokio::test]
    async fn test_start_with_reasoning() {
        let settings = ReasoningSettings::new()
            .enable_reasoning(true)
            .tag_pair(think())
            .start_with_reasoning(true);
        let out: Vec<_> = text_stream(&["plan</think>", "answer"])
            .extract_reasoning_with(&settings, "qwen3")
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(
            out,
            vec![StreamChunk::reasoning("plan"), StreamChunk::text("answer")]
        );
    }

    #[tokio::test]
    async fn test_bypass_when_disabled() {
        let settings = ReasoningSettings::new();
        let input = vec!["<think>x</think>", "y"];
        let out: Vec<_> = text_stream(&input)
            .extract_reasoning_with(&settings, "deepseek-r1")
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(
            out,
            vec![StreamChunk::text("<think>x</think>"), StreamChunk::text("y")]
        );
    }

    #[tokio::test]
    async fn test_model_preset_is_used() {
        let settings = ReasoningSettings::new().enable_reasoning(true);
        let partition = collect_partition(
            text_stream(&["<thought>hm</thought>ok"]).extract_reasoning_with(&settings, "gemini-2.5"),
        )
        .await
        .unwrap();
        assert_eq!(partition.reasoning.as_deref(), Some("hm"));
        assert_eq!(partition.text, "ok");
    }
}
