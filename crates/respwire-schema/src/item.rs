// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Conversation items: the input and output item unions and their records.
//!
//! Tool-call records keep `status` as a plain string; the hosted tools use
//! vocabularies (`searching`, `interpreting`, `generating`, ...) that grow
//! independently of this crate.

use respwire_codec::{impl_extensible, wire_union, Extensions, TextOrList};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::{CodeInterpreterOutput, ComputerAction, ComputerScreenshot, SafetyCheck, ShellExec, WebSearchAction};
use crate::content::{InputContent, ReasoningContentPart, ReasoningSummaryPart};
use crate::message::{ItemStatus, LegacyOutputMessage, MessageItem, OutputMessage};

/// `function_call` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Item id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Correlates the call with its output.
    pub call_id: String,
    /// Function name.
    pub name: String,
    /// JSON-encoded arguments.
    pub arguments: String,
    /// Lifecycle state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

/// `function_call_output` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallOutput {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Item id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Call being answered.
    pub call_id: String,
    /// Text, or a list of input parts.
    pub output: TextOrList<InputContent>,
    /// Lifecycle state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

/// `reasoning` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reasoning {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Item id.
    pub id: String,
    /// Summary parts.
    #[serde(default)]
    pub summary: Vec<ReasoningSummaryPart>,
    /// Raw reasoning parts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<ReasoningContentPart>>,
    /// Opaque encrypted reasoning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_content: Option<String>,
    /// Lifecycle state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

/// One file search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSearchResult {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Matching file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Relevance in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Matched text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// File attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
}

/// `file_search_call` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSearchCall {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Item id.
    pub id: String,
    /// Queries issued.
    #[serde(default)]
    pub queries: Vec<String>,
    /// Call state.
    pub status: String,
    /// Hits, when included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<FileSearchResult>>,
}

/// `web_search_call` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchCall {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Item id.
    pub id: String,
    /// Call state.
    pub status: String,
    /// What the search did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<WebSearchAction>,
}

/// `computer_call` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputerCall {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Item id.
    pub id: String,
    /// Correlates the call with its output.
    pub call_id: String,
    /// Requested action.
    pub action: ComputerAction,
    /// Checks the caller must acknowledge.
    #[serde(default)]
    pub pending_safety_checks: Vec<SafetyCheck>,
    /// Lifecycle state.
    pub status: ItemStatus,
}

/// `computer_call_output` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputerCallOutput {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Item id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Call being answered.
    pub call_id: String,
    /// Resulting screen.
    pub output: ComputerScreenshot,
    /// Checks the caller acknowledged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_safety_checks: Option<Vec<SafetyCheck>>,
    /// Lifecycle state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

/// `image_generation_call` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerationCall {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Item id.
    pub id: String,
    /// Call state.
    pub status: String,
    /// Base64 image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

/// `code_interpreter_call` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeInterpreterCall {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Item id.
    pub id: String,
    /// Call state.
    pub status: String,
    /// Container the code ran in.
    pub container_id: String,
    /// Code run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Logs and images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<CodeInterpreterOutput>>,
}

/// `local_shell_call` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalShellCall {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Item id.
    pub id: String,
    /// Correlates the call with its output.
    pub call_id: String,
    /// Command to run.
    pub action: ShellExec,
    /// Lifecycle state.
    pub status: ItemStatus,
}

/// `local_shell_call_output` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalShellCallOutput {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Id of the call being answered.
    pub id: String,
    /// JSON-encoded command output.
    pub output: String,
    /// Lifecycle state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

/// Tool advertised by an MCP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolInfo {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Tool name.
    pub name: String,
    /// What the tool does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON schema of the input.
    pub input_schema: Value,
    /// Server-supplied hints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Value>,
}

/// `mcp_list_tools` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpListTools {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Item id.
    pub id: String,
    /// Server label.
    pub server_label: String,
    /// Advertised tools.
    pub tools: Vec<McpToolInfo>,
    /// Listing failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `mcp_approval_request` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpApprovalRequest {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Item id.
    pub id: String,
    /// Server label.
    pub server_label: String,
    /// Tool to run.
    pub name: String,
    /// JSON-encoded arguments.
    pub arguments: String,
}

/// `mcp_approval_response` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpApprovalResponse {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Item id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Request being answered.
    pub approval_request_id: String,
    /// Decision.
    pub approve: bool,
    /// Why.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `mcp_call` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpCall {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Item id.
    pub id: String,
    /// Server label.
    pub server_label: String,
    /// Tool run.
    pub name: String,
    /// JSON-encoded arguments.
    pub arguments: String,
    /// Tool output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Tool failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `custom_tool_call` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomToolCall {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Item id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Correlates the call with its output.
    pub call_id: String,
    /// Tool name.
    pub name: String,
    /// Free-form input.
    pub input: String,
}

/// `custom_tool_call_output` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomToolCallOutput {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Item id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Call being answered.
    pub call_id: String,
    /// Free-form output.
    pub output: String,
}

/// `item_reference` item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemReference {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Referenced item.
    pub id: String,
}

wire_union! {
    /// An item of model input.
    ///
    /// Objects without `type` are messages. Assistant output sent in legacy
    /// shape is completed by [`LegacyOutputMessage`] before dispatch.
    #[derive(Debug, Clone, PartialEq)]
    pub enum InputItem: "InputItem" {
        /// Input or output message.
        "message" => Message(MessageItem),
        /// Function call replayed as input.
        "function_call" => FunctionCall(FunctionCall),
        /// Function result.
        "function_call_output" => FunctionCallOutput(FunctionCallOutput),
        /// Reasoning replayed as input.
        "reasoning" => Reasoning(Reasoning),
        /// File search call.
        "file_search_call" => FileSearchCall(FileSearchCall),
        /// Web search call.
        "web_search_call" => WebSearchCall(WebSearchCall),
        /// Computer-use call.
        "computer_call" => ComputerCall(ComputerCall),
        /// Computer-use result.
        "computer_call_output" => ComputerCallOutput(ComputerCallOutput),
        /// Image generation call.
        "image_generation_call" => ImageGenerationCall(ImageGenerationCall),
        /// Code interpreter call.
        "code_interpreter_call" => CodeInterpreterCall(CodeInterpreterCall),
        /// Local shell call.
        "local_shell_call" => LocalShellCall(LocalShellCall),
        /// Local shell result.
        "local_shell_call_output" => LocalShellCallOutput(LocalShellCallOutput),
        /// MCP tool listing.
        "mcp_list_tools" => McpListTools(McpListTools),
        /// MCP approval request.
        "mcp_approval_request" => McpApprovalRequest(McpApprovalRequest),
        /// MCP approval decision.
        "mcp_approval_response" => McpApprovalResponse(McpApprovalResponse),
        /// MCP tool call.
        "mcp_call" => McpCall(McpCall),
        /// Custom tool call.
        "custom_tool_call" => CustomToolCall(CustomToolCall),
        /// Custom tool result.
        "custom_tool_call_output" => CustomToolCallOutput(CustomToolCallOutput),
        /// Reference to a stored item.
        "item_reference" => ItemReference(ItemReference),
    }
    default = "message";
    rules = &[&LegacyOutputMessage];
}

wire_union! {
    /// An item the model produced.
    #[derive(Debug, Clone, PartialEq)]
    pub enum OutputItem: "OutputItem" {
        /// Assistant message.
        "message" => Message(OutputMessage),
        /// Function call.
        "function_call" => FunctionCall(FunctionCall),
        /// File search call.
        "file_search_call" => FileSearchCall(FileSearchCall),
        /// Web search call.
        "web_search_call" => WebSearchCall(WebSearchCall),
        /// Computer-use call.
        "computer_call" => ComputerCall(ComputerCall),
        /// Reasoning.
        "reasoning" => Reasoning(Reasoning),
        /// Image generation call.
        "image_generation_call" => ImageGenerationCall(ImageGenerationCall),
        /// Code interpreter call.
        "code_interpreter_call" => CodeInterpreterCall(CodeInterpreterCall),
        /// Local shell call.
        "local_shell_call" => LocalShellCall(LocalShellCall),
        /// MCP tool call.
        "mcp_call" => McpCall(McpCall),
        /// MCP tool listing.
        "mcp_list_tools" => McpListTools(McpListTools),
        /// MCP approval request.
        "mcp_approval_request" => McpApprovalRequest(McpApprovalRequest),
        /// Custom tool call.
        "custom_tool_call" => CustomToolCall(CustomToolCall),
    }
}

impl InputItem {
    /// A user message with plain text content.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::Message(MessageItem::Input(crate::message::InputMessage::user_text(text)))
    }
}

impl From<OutputItem> for InputItem {
    /// Replays a produced item as input for the next turn.
    fn from(item: OutputItem) -> Self {
        match item {
            OutputItem::Message(message) => Self::Message(MessageItem::Output(message)),
            OutputItem::FunctionCall(call) => Self::FunctionCall(call),
            OutputItem::FileSearchCall(call) => Self::FileSearchCall(call),
            OutputItem::WebSearchCall(call) => Self::WebSearchCall(call),
            OutputItem::ComputerCall(call) => Self::ComputerCall(call),
            OutputItem::Reasoning(reasoning) => Self::Reasoning(reasoning),
            OutputItem::ImageGenerationCall(call) => Self::ImageGenerationCall(call),
            OutputItem::CodeInterpreterCall(call) => Self::CodeInterpreterCall(call),
            OutputItem::LocalShellCall(call) => Self::LocalShellCall(call),
            OutputItem::McpCall(call) => Self::McpCall(call),
            OutputItem::McpListTools(list) => Self::McpListTools(list),
            OutputItem::McpApprovalRequest(request) => Self::McpApprovalRequest(request),
            OutputItem::CustomToolCall(call) => Self::CustomToolCall(call),
        }
    }
}

impl_extensible!(
    FunctionCall,
    FunctionCallOutput,
    Reasoning,
    FileSearchResult,
    FileSearchCall,
    WebSearchCall,
    ComputerCall,
    ComputerCallOutput,
    ImageGenerationCall,
    CodeInterpreterCall,
    LocalShellCall,
    LocalShellCallOutput,
    McpToolInfo,
    McpListTools,
    McpApprovalRequest,
    McpApprovalResponse,
    McpCall,
    CustomToolCall,
    CustomToolCallOutput,
    ItemReference,
);
