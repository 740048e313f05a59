// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Response bodies and request parameters.

use std::collections::BTreeMap;

use respwire_codec::{impl_extensible, wire_union, Extensions, TextOrList};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::item::{InputItem, OutputItem};
use crate::tool::{Tool, ToolChoice};

/// Lifecycle state of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// Finished.
    Completed,
    /// Failed; see [`Response::error`].
    Failed,
    /// Still generating.
    InProgress,
    /// Cancelled by the caller.
    Cancelled,
    /// Waiting to start.
    Queued,
    /// Cut short; see [`Response::incomplete_details`].
    Incomplete,
}

/// Error attached to a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Why a response stopped early.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncompleteDetails {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// `max_output_tokens` or `content_filter`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Breakdown of input tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputTokensDetails {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Tokens served from cache.
    #[serde(default)]
    pub cached_tokens: u64,
}

/// Breakdown of output tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputTokensDetails {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Tokens spent reasoning.
    #[serde(default)]
    pub reasoning_tokens: u64,
}

/// Token accounting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Input tokens.
    pub input_tokens: u64,
    /// Input breakdown.
    #[serde(default)]
    pub input_tokens_details: InputTokensDetails,
    /// Output tokens.
    pub output_tokens: u64,
    /// Output breakdown.
    #[serde(default)]
    pub output_tokens_details: OutputTokensDetails,
    /// Input plus output.
    pub total_tokens: u64,
}

/// Reasoning controls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// `minimal`, `low`, `medium` or `high`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort: Option<String>,
    /// `auto`, `concise` or `detailed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// `text` output format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlainTextFormat {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// `json_schema` output format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaFormat {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Schema name.
    pub name: String,
    /// JSON schema the output must satisfy.
    pub schema: Value,
    /// What the format is for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Enforce the schema strictly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

wire_union! {
    /// Output format of text generation.
    #[derive(Debug, Clone, PartialEq)]
    pub enum TextFormat: "TextFormat" {
        /// Free text.
        "text" => Text(PlainTextFormat) keys [],
        /// Structured output against a schema.
        "json_schema" => JsonSchema(JsonSchemaFormat) keys ["name", "schema", "description", "strict"],
        /// Any JSON object.
        "json_object" => JsonObject(PlainTextFormat) keys [],
    }
}

impl Default for TextFormat {
    fn default() -> Self {
        Self::Text(PlainTextFormat::default())
    }
}

/// Text generation controls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Output format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<TextFormat>,
    /// `low`, `medium` or `high`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<String>,
}

/// A model response.
///
/// Every optional member is written, as `null` when unset; producers of
/// streaming lifecycle events emit the full body on each event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Response id.
    pub id: String,
    /// Always `response`.
    #[serde(default = "response_object")]
    pub object: String,
    /// Unix seconds.
    pub created_at: u64,
    /// Lifecycle state.
    #[serde(default)]
    pub status: Option<ResponseStatus>,
    /// Failure, when `status` is `failed`.
    #[serde(default)]
    pub error: Option<ResponseError>,
    /// Early stop, when `status` is `incomplete`.
    #[serde(default)]
    pub incomplete_details: Option<IncompleteDetails>,
    /// System instructions.
    #[serde(default)]
    pub instructions: Option<TextOrList<InputItem>>,
    /// Model used.
    pub model: String,
    /// Produced items.
    #[serde(default)]
    pub output: Vec<OutputItem>,
    /// Tool calls may run in parallel.
    #[serde(default)]
    pub parallel_tool_calls: bool,
    /// Sampling temperature.
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Nucleus sampling mass.
    #[serde(default)]
    pub top_p: Option<f64>,
    /// Tool choice in effect.
    #[serde(default)]
    pub tool_choice: Option<ToolChoice>,
    /// Tools offered.
    #[serde(default)]
    pub tools: Vec<Tool>,
    /// Output token cap.
    #[serde(default)]
    pub max_output_tokens: Option<u64>,
    /// Previous turn.
    #[serde(default)]
    pub previous_response_id: Option<String>,
    /// Reasoning controls.
    #[serde(default)]
    pub reasoning: Option<ReasoningConfig>,
    /// Text controls.
    #[serde(default)]
    pub text: Option<TextConfig>,
    /// `auto` or `disabled`.
    #[serde(default)]
    pub truncation: Option<String>,
    /// Token accounting.
    #[serde(default)]
    pub usage: Option<Usage>,
    /// End-user id.
    #[serde(default)]
    pub user: Option<String>,
    /// Caller metadata.
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, String>>,
    /// Ran in background mode.
    #[serde(default)]
    pub background: Option<bool>,
    /// Processing tier.
    #[serde(default)]
    pub service_tier: Option<String>,
}

fn response_object() -> String {
    "response".to_owned()
}

impl Response {
    /// Concatenated text of every `output_text` part across output messages.
    pub fn output_text(&self) -> String {
        let mut text = String::new();
        for item in &self.output {
            if let OutputItem::Message(message) = item {
                for part in &message.content {
                    if let crate::content::OutputContent::Text(part) = part {
                        text.push_str(&part.text);
                    }
                }
            }
        }
        text
    }
}

/// Request body for creating a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseCreateParams {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Model to run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Text, or a list of items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<TextOrList<InputItem>>,
    /// System instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Extra output to include.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    /// Output token cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u64>,
    /// Caller metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    /// Tool calls may run in parallel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_tool_calls: Option<bool>,
    /// Previous turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,
    /// Reasoning controls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningConfig>,
    /// Persist the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<bool>,
    /// Stream events instead of one body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Text controls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextConfig>,
    /// Tool choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    /// Tools offered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    /// Nucleus sampling mass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// `auto` or `disabled`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncation: Option<String>,
    /// End-user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Run in background mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<bool>,
    /// Processing tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_tier: Option<String>,
}

impl ResponseCreateParams {
    /// Request for `model` with a plain-text prompt.
    pub fn text(model: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            input: Some(TextOrList::Text(input.into())),
            ..Self::default()
        }
    }
}

impl_extensible!(
    ResponseError,
    IncompleteDetails,
    InputTokensDetails,
    OutputTokensDetails,
    Usage,
    ReasoningConfig,
    PlainTextFormat,
    JsonSchemaFormat,
    TextConfig,
    Response,
    ResponseCreateParams,
);

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use respwire_codec::{TaggedUnion, WireCodec, WireError};
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "id": "resp_1",
            "object": "response",
            "created_at": 1_700_000_000,
            "model": "m",
            "output": []
        })
    }

    #[test]
    fn unset_options_encode_as_null() {
        let response: Response = serde_json::from_value(minimal()).unwrap();
        let encoded = WireCodec::default().encode_value(&response).unwrap();
        assert_eq!(encoded["status"], Value::Null);
        assert_eq!(encoded["usage"], Value::Null);
        assert_eq!(encoded["output"], json!([]));
        assert_eq!(encoded["tools"], json!([]));
    }

    #[test]
    fn request_accepts_text_or_items() {
        let text: ResponseCreateParams = serde_json::from_value(json!({ "model": "m", "input": "hi" })).unwrap();
        assert_eq!(text, ResponseCreateParams::text("m", "hi"));

        let items: ResponseCreateParams = serde_json::from_value(json!({
            "model": "m",
            "input": [{ "role": "user", "content": "hi" }],
            "tool_choice": "auto"
        }))
        .unwrap();
        assert_eq!(items.input.and_then(|i| i.as_list().map(<[InputItem]>::len)), Some(1));
    }

    #[test]
    fn request_omits_unset_members() {
        let encoded = serde_json::to_value(ResponseCreateParams::text("m", "hi")).unwrap();
        assert_eq!(encoded, json!({ "model": "m", "input": "hi" }));
    }

    #[test]
    fn output_text_joins_message_parts() {
        let mut raw = minimal();
        raw["output"] = json!([{
            "type": "message",
            "id": "msg_1",
            "role": "assistant",
            "status": "completed",
            "content": [
                { "type": "output_text", "text": "a", "annotations": [] },
                { "type": "refusal", "refusal": "x" },
                { "type": "output_text", "text": "b", "annotations": [] }
            ]
        }]);
        let response: Response = serde_json::from_value(raw).unwrap();
        assert_eq!(response.output_text(), "ab");
    }

    #[test]
    fn json_schema_format_rejects_bare_text_keys_mix() {
        let err = WireCodec::default()
            .decode_value::<TextFormat>(json!({ "type": "text", "schema": {} }))
            .unwrap_err();
        assert_eq!(
            err,
            WireError::MultipleVariantsSet {
                union: "TextFormat",
                tags: vec!["json_schema".into(), "text".into()]
            }
        );
        assert!(TextFormat::registry().conflicts().is_empty());
    }
}
