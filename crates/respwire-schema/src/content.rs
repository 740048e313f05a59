// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Content parts and annotations.
//!
//! All three unions here declare per-variant key sets, so an object that mixes
//! two shapes (say, a file citation carrying `url` and `title`) is rejected
//! rather than decoded as whichever tag happened to be present.

use respwire_codec::{impl_extensible, wire_union, Extensions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Requested fidelity of an input image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageDetail {
    /// Low resolution.
    Low,
    /// High resolution.
    High,
    /// Let the server decide.
    #[default]
    Auto,
}

/// `input_text` part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputText {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Text content.
    pub text: String,
}

/// `input_image` part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputImage {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Requested detail.
    #[serde(default)]
    pub detail: ImageDetail,
    /// Uploaded file id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    /// URL or data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// `input_file` part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputFile {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Uploaded file id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    /// Inline base64 content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_data: Option<String>,
    /// Remote location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Base64 audio clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioClip {
    /// Base64 data.
    pub data: String,
    /// `mp3` or `wav`.
    pub format: String,
}

/// `input_audio` part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputAudio {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// The clip.
    pub input_audio: AudioClip,
}

wire_union! {
    /// A part of an input message.
    #[derive(Debug, Clone, PartialEq)]
    pub enum InputContent: "InputContent" {
        /// Plain text.
        "input_text" => Text(InputText) keys ["text"],
        /// Image by URL or file id.
        "input_image" => Image(InputImage) keys ["detail", "file_id", "image_url"],
        /// File by id, URL or inline data.
        "input_file" => File(InputFile) keys ["file_id", "file_data", "file_url", "filename"],
        /// Audio clip.
        "input_audio" => Audio(InputAudio) keys ["input_audio"],
    }
}

impl InputContent {
    /// Shorthand for an `input_text` part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(InputText {
            extensions: Extensions::new(),
            text: text.into(),
        })
    }
}

/// `file_citation` annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCitation {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Cited file.
    pub file_id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Position in the text.
    pub index: u64,
}

/// `url_citation` annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlCitation {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Cited page.
    pub url: String,
    /// Page title.
    pub title: String,
    /// First cited character.
    pub start_index: u64,
    /// One past the last cited character.
    pub end_index: u64,
}

/// `container_file_citation` annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerFileCitation {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Owning container.
    pub container_id: String,
    /// Cited file.
    pub file_id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// First cited character.
    pub start_index: u64,
    /// One past the last cited character.
    pub end_index: u64,
}

/// `file_path` annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePath {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Referenced file.
    pub file_id: String,
    /// Position in the text.
    pub index: u64,
}

wire_union! {
    /// Annotation attached to output text.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Annotation: "Annotation" {
        /// Citation of an uploaded file.
        "file_citation" => FileCitation(FileCitation) keys ["file_id", "filename", "index"],
        /// Citation of a web page.
        "url_citation" => UrlCitation(UrlCitation) keys ["url", "title", "start_index", "end_index"],
        /// Citation of a file inside a container.
        "container_file_citation" => ContainerFileCitation(ContainerFileCitation)
            keys ["container_id", "file_id", "filename", "start_index", "end_index"],
        /// Path to a generated file.
        "file_path" => FilePath(FilePath) keys ["file_id", "index"],
    }
}

/// `output_text` part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputText {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Generated text.
    pub text: String,
    /// Citations and paths.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    /// Token log probabilities, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<Vec<Value>>,
}

/// `refusal` part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refusal {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Refusal explanation.
    pub refusal: String,
}

wire_union! {
    /// A part of an output message.
    #[derive(Debug, Clone, PartialEq)]
    pub enum OutputContent: "OutputContent" {
        /// Generated text.
        "output_text" => Text(OutputText) keys ["text", "annotations", "logprobs"],
        /// Model refusal.
        "refusal" => Refusal(Refusal) keys ["refusal"],
    }
}

impl OutputContent {
    /// Shorthand for an `output_text` part without annotations.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(OutputText {
            extensions: Extensions::new(),
            text: text.into(),
            annotations: Vec::new(),
            logprobs: None,
        })
    }
}

/// `summary_text` part of a reasoning item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryText {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Summary text.
    pub text: String,
}

wire_union! {
    /// A part of a reasoning summary.
    #[derive(Debug, Clone, PartialEq)]
    pub enum ReasoningSummaryPart: "ReasoningSummaryPart" {
        /// Summary text.
        "summary_text" => SummaryText(SummaryText),
    }
}

/// `reasoning_text` part of a reasoning item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningText {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Raw reasoning text.
    pub text: String,
}

wire_union! {
    /// A part of a reasoning item's raw content.
    #[derive(Debug, Clone, PartialEq)]
    pub enum ReasoningContentPart: "ReasoningContentPart" {
        /// Raw reasoning text.
        "reasoning_text" => ReasoningText(ReasoningText),
    }
}

impl_extensible!(
    InputText,
    InputImage,
    InputFile,
    InputAudio,
    FileCitation,
    UrlCitation,
    ContainerFileCitation,
    FilePath,
    OutputText,
    Refusal,
    SummaryText,
    ReasoningText,
);
