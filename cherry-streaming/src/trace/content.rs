//! Human-readable content and usage of traced chunks.
//!
//! Each known chunk shape renders to the text a trace viewer should show for
//! it. Binary payloads become short placeholders rather than data.

use cherry_core::provider::gemini::Part;
use cherry_core::provider::openai::ChunkDelta;
use cherry_core::provider::responses::ResponseContentPart;
use cherry_core::{
    ChatCompletionChunk, GenerateContentResponse, ProviderChunk, ResponseStreamEvent,
    StreamChunk, TokenUsage,
};

/// Placeholder for image payloads.
pub const IMAGE_PLACEHOLDER: &str = "<Image Data>";

/// A chunk a tracing adapter can report on.
pub trait TraceableChunk {
    /// Text to forward to the trace sink; empty when the chunk has none.
    fn trace_content(&self) -> String;

    /// Token usage carried by this chunk.
    fn token_usage(&self) -> Option<TokenUsage>;
}

fn first_non_empty<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<&'a str> {
    candidates.into_iter().flatten().find(|s| !s.is_empty())
}

fn delta_content(delta: &ChunkDelta) -> String {
    if let Some(text) = first_non_empty([
        delta.content.as_deref(),
        delta.reasoning_content.as_deref(),
        delta.refusal.as_deref(),
    ]) {
        return text.to_string();
    }

    delta
        .tool_calls
        .iter()
        .flatten()
        .filter_map(|call| call.function.as_ref())
        .filter_map(|f| first_non_empty([f.name.as_deref(), f.arguments.as_deref()]))
        .collect()
}

impl TraceableChunk for ChatCompletionChunk {
    fn trace_content(&self) -> String {
        self.choices.iter().map(|c| delta_content(&c.delta)).collect()
    }

    fn token_usage(&self) -> Option<TokenUsage> {
        self.usage.map(TokenUsage::from)
    }
}

impl TraceableChunk for ResponseStreamEvent {
    fn trace_content(&self) -> String {
        match self {
            Self::Completed { response } => response.output_text.clone().unwrap_or_default(),
            Self::OutputTextDelta { delta }
            | Self::RefusalDelta { delta }
            | Self::ReasoningSummaryTextDelta { delta }
            | Self::FunctionCallArgumentsDelta { delta, .. } => delta.clone(),
            Self::OutputTextDone { text } => text.clone(),
            Self::ImageGenerationPartialImage { .. } => IMAGE_PLACEHOLDER.to_string(),
            Self::ContentPartAdded { part } | Self::ContentPartDone { part } => match part {
                ResponseContentPart::Refusal { refusal } => refusal.clone(),
                ResponseContentPart::OutputText { text } => text.clone(),
                ResponseContentPart::Other => String::new(),
            },
            Self::Created { .. } | Self::Other => String::new(),
        }
    }

    fn token_usage(&self) -> Option<TokenUsage> {
        self.usage()
    }
}

fn part_content(part: &Part) -> String {
    match part {
        Part::Text { text, .. } => text.clone(),
        Part::InlineData { inline_data } => {
            if inline_data.mime_type.starts_with("image/") {
                IMAGE_PLACEHOLDER.to_string()
            } else {
                format!("<Inline Data: {}>", inline_data.mime_type)
            }
        }
        Part::FileData {
            file_data,
            video_metadata,
        } => match video_metadata {
            Some(video) => format!(
                "<File: {} [{}-{}]>",
                file_data.file_uri,
                video.start_offset.as_deref().unwrap_or("start"),
                video.end_offset.as_deref().unwrap_or("end"),
            ),
            None => format!("<File: {}>", file_data.file_uri),
        },
        Part::FunctionCall { function_call } => {
            format!("{}({})", function_call.name, function_call.args)
        }
        Part::FunctionResponse { function_response } => {
            format!("{} -> {}", function_response.name, function_response.response)
        }
        Part::ExecutableCode { executable_code } => executable_code.code.clone(),
        Part::CodeExecutionResult {
            code_execution_result,
        } => code_execution_result.output.clone(),
    }
}

impl TraceableChunk for GenerateContentResponse {
    fn trace_content(&self) -> String {
        self.parts().map(part_content).collect()
    }

    fn token_usage(&self) -> Option<TokenUsage> {
        self.usage_metadata.map(TokenUsage::from)
    }
}

impl TraceableChunk for ProviderChunk {
    fn trace_content(&self) -> String {
        match self {
            Self::ChatCompletion(chunk) => chunk.trace_content(),
            Self::Response(event) => event.trace_content(),
            Self::Gemini(response) => response.trace_content(),
            Self::Unknown(_) => String::new(),
        }
    }

    fn token_usage(&self) -> Option<TokenUsage> {
        self.usage()
    }
}

impl TraceableChunk for StreamChunk {
    fn trace_content(&self) -> String {
        match self {
            Self::TextDelta { text_delta } | Self::Reasoning { text_delta } => text_delta.clone(),
            Self::ToolCallDelta {
                tool_name,
                args_text_delta,
                ..
            } => first_non_empty([Some(args_text_delta.as_str()), Some(tool_name.as_str())])
                .unwrap_or_default()
                .to_string(),
            Self::ToolCall {
                tool_name, args, ..
            } => format!("{tool_name}({args})"),
            Self::Error { message } => message.clone(),
            Self::Finish { .. } => String::new(),
        }
    }

    fn token_usage(&self) -> Option<TokenUsage> {
        match self {
            Self::Finish { usage, .. } => *usage,
            _ => None,
        }
    }
}
