//! Gemini `generateContent` stream responses.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::chunk::StreamChunk;
use crate::usage::TokenUsage;

/// One streamed `generateContent` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidates.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Usage metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
    /// Model version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

/// Response candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    /// Finish reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Candidate content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Role, usually "model".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Content part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    /// Text, or thought summary text when `thought` is set.
    Text {
        /// The text.
        text: String,
        /// Whether this is reasoning output.
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        thought: bool,
    },
    /// Inline binary data.
    InlineData {
        /// The blob.
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    /// Reference to an uploaded file.
    FileData {
        /// The file reference.
        #[serde(rename = "fileData")]
        file_data: FileData,
        /// Clip bounds when the file is a video.
        #[serde(
            default,
            rename = "videoMetadata",
            skip_serializing_if = "Option::is_none"
        )]
        video_metadata: Option<VideoMetadata>,
    },
    /// Function call from the model.
    FunctionCall {
        /// The call.
        #[serde(rename = "functionCall")]
        function_call: FunctionCall,
    },
    /// Function response sent back to the model.
    FunctionResponse {
        /// The response.
        #[serde(rename = "functionResponse")]
        function_response: FunctionResponse,
    },
    /// Code produced by the code execution tool.
    ExecutableCode {
        /// The code.
        #[serde(rename = "executableCode")]
        executable_code: ExecutableCode,
    },
    /// Result of running executable code.
    CodeExecutionResult {
        /// The result.
        #[serde(rename = "codeExecutionResult")]
        code_execution_result: CodeExecutionResult,
    },
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            thought: false,
        }
    }

    /// Create a thought part.
    pub fn thought(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            thought: true,
        }
    }
}

/// Binary blob data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    /// MIME type.
    pub mime_type: String,
    /// Base64-encoded data.
    #[serde(default)]
    pub data: String,
}

/// File reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    /// MIME type.
    #[serde(default)]
    pub mime_type: String,
    /// File URI.
    pub file_uri: String,
}

/// Video clip bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    /// Clip start, e.g. "1.5s".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_offset: Option<String>,
    /// Clip end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_offset: Option<String>,
}

/// Function call from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name.
    pub name: String,
    /// Function arguments.
    #[serde(default)]
    pub args: JsonValue,
}

/// Function response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    /// Function name.
    pub name: String,
    /// Response data.
    #[serde(default)]
    pub response: JsonValue,
}

/// Executable code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutableCode {
    /// Programming language.
    #[serde(default)]
    pub language: String,
    /// The code.
    pub code: String,
}

/// Result of code execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeExecutionResult {
    /// Execution outcome.
    #[serde(default)]
    pub outcome: String,
    /// Output text.
    #[serde(default)]
    pub output: String,
}

/// Usage metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Prompt token count.
    #[serde(default)]
    pub prompt_token_count: u64,
    /// Candidates token count.
    #[serde(default)]
    pub candidates_token_count: u64,
    /// Total token count.
    #[serde(default)]
    pub total_token_count: u64,
}

impl From<UsageMetadata> for TokenUsage {
    fn from(usage: UsageMetadata) -> Self {
        TokenUsage {
            prompt_tokens: usage.prompt_token_count,
            completion_tokens: usage.candidates_token_count,
            total_tokens: usage.total_token_count,
        }
    }
}

impl GenerateContentResponse {
    /// Create a response with one candidate holding the given parts.
    #[must_use]
    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts,
                }),
                finish_reason: None,
            }],
            ..Self::default()
        }
    }

    /// Attach usage metadata.
    #[must_use]
    pub fn with_usage(mut self, usage: UsageMetadata) -> Self {
        self.usage_metadata = Some(usage);
        self
    }

    /// All parts across all candidates, in order.
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
    }

    /// Normalize into provider-neutral chunks.
    #[must_use]
    pub fn to_stream_chunks(&self) -> Vec<StreamChunk> {
        let mut chunks = Vec::new();

        for candidate in &self.candidates {
            let parts = candidate.content.iter().flat_map(|c| c.parts.iter());
            for part in parts {
                match part {
                    Part::Text { text, thought } if !text.is_empty() => {
                        if *thought {
                            chunks.push(StreamChunk::reasoning(text.clone()));
                        } else {
                            chunks.push(StreamChunk::text(text.clone()));
                        }
                    }
                    Part::FunctionCall { function_call } => {
                        chunks.push(StreamChunk::ToolCall {
                            tool_call_id: function_call.name.clone(),
                            tool_name: function_call.name.clone(),
                            args: function_call.args.to_string(),
                        });
                    }
                    _ => {}
                }
            }
            if let Some(reason) = &candidate.finish_reason {
                chunks.push(StreamChunk::finish(
                    Some(reason.clone()),
                    self.usage_metadata.map(TokenUsage::from),
                ));
            }
        }

        chunks
    }
}
