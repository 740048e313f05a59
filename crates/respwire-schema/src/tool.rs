// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tool definitions and tool choice.

use std::collections::BTreeMap;

use respwire_codec::{impl_extensible, wire_union, Extensions, ModeOrObject};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `function` tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTool {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Function name.
    pub name: String,
    /// What the function does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON schema of the arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    /// Enforce strict schema adherence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

/// `file_search` tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSearchTool {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Stores to search.
    pub vector_store_ids: Vec<String>,
    /// Result cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_num_results: Option<u32>,
    /// Ranking tunables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranking_options: Option<Value>,
    /// Attribute filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Value>,
}

/// Approximate location hint for web search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Always `approximate`.
    #[serde(rename = "type")]
    pub kind: String,
    /// City.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// ISO country code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// IANA time zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// `web_search_preview` tool, under either of its tags.
///
/// The payload repeats its own `type`, which must match the tag it was
/// dispatched under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchTool {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Tag copy.
    #[serde(rename = "type")]
    pub kind: String,
    /// `low`, `medium` or `high`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_context_size: Option<String>,
    /// Location hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_location: Option<UserLocation>,
}

/// `computer_use_preview` tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputerUseTool {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Screen width.
    pub display_width: u32,
    /// Screen height.
    pub display_height: u32,
    /// `browser`, `mac`, `windows`, `ubuntu` or `linux`.
    pub environment: String,
}

/// `mcp` tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpTool {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Server label used in calls.
    pub server_label: String,
    /// Server endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    /// Hosted connector id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_id: Option<String>,
    /// Server description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_description: Option<String>,
    /// Tool allow-list (list or filter object).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<Value>,
    /// Request headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// Approval policy (mode string or filter object).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_approval: Option<Value>,
}

/// `code_interpreter` tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeInterpreterTool {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Container id or auto-container spec.
    pub container: Value,
}

/// `image_generation` tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerationTool {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Image model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Background handling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Quality setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    /// Output size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Output format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    /// Number of partial images to stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_images: Option<u32>,
}

/// Tool with no configuration (`local_shell`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlainTool {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// `custom` tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTool {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Tool name.
    pub name: String,
    /// What the tool does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Input grammar or text format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
}

wire_union! {
    /// A tool the model may call.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Tool: "Tool" {
        /// Caller-defined function.
        "function" => Function(FunctionTool),
        /// Vector store search.
        "file_search" => FileSearch(FileSearchTool),
        /// Web search.
        "web_search_preview" => WebSearchPreview(WebSearchTool) embeds kind,
        /// Web search, dated snapshot.
        "web_search_preview_2025_03_11" => WebSearchPreviewDated(WebSearchTool) embeds kind,
        /// Computer use.
        "computer_use_preview" => ComputerUse(ComputerUseTool),
        /// Remote MCP server.
        "mcp" => Mcp(McpTool),
        /// Code interpreter.
        "code_interpreter" => CodeInterpreter(CodeInterpreterTool),
        /// Image generation.
        "image_generation" => ImageGeneration(ImageGenerationTool),
        /// Local shell.
        "local_shell" => LocalShell(PlainTool),
        /// Free-form custom tool.
        "custom" => Custom(CustomTool),
    }
}

impl Tool {
    /// A `function` tool with a JSON schema.
    pub fn function(name: impl Into<String>, parameters: Value) -> Self {
        Self::Function(FunctionTool {
            extensions: Extensions::new(),
            name: name.into(),
            description: None,
            parameters: Some(parameters),
            strict: None,
        })
    }
}

/// String form of tool choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoiceMode {
    /// Never call tools.
    None,
    /// Model decides.
    Auto,
    /// Must call at least one tool.
    Required,
}

/// Named choice (`function`, `custom`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedToolChoice {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Tool name.
    pub name: String,
}

/// Hosted tool choice with no fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostedToolChoice {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// `mcp` tool choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolChoice {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Server label.
    pub server_label: String,
    /// Specific tool on the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// `allowed_tools` choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowedToolsChoice {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// `auto` or `required`.
    pub mode: String,
    /// Tool references.
    pub tools: Vec<Value>,
}

wire_union! {
    /// Object form of tool choice.
    #[derive(Debug, Clone, PartialEq)]
    pub enum ToolChoiceObject: "ToolChoiceObject" {
        /// Force a function.
        "function" => Function(NamedToolChoice),
        /// Force file search.
        "file_search" => FileSearch(HostedToolChoice),
        /// Force web search.
        "web_search_preview" => WebSearchPreview(HostedToolChoice),
        /// Force computer use.
        "computer_use_preview" => ComputerUse(HostedToolChoice),
        /// Force image generation.
        "image_generation" => ImageGeneration(HostedToolChoice),
        /// Force code interpreter.
        "code_interpreter" => CodeInterpreter(HostedToolChoice),
        /// Force an MCP tool.
        "mcp" => Mcp(McpToolChoice),
        /// Force a custom tool.
        "custom" => Custom(NamedToolChoice),
        /// Restrict to a subset.
        "allowed_tools" => AllowedTools(AllowedToolsChoice),
    }
}

/// `"auto"`-style mode or a tool choice object.
pub type ToolChoice = ModeOrObject<ToolChoiceMode, ToolChoiceObject>;

impl_extensible!(
    FunctionTool,
    FileSearchTool,
    UserLocation,
    WebSearchTool,
    ComputerUseTool,
    McpTool,
    CodeInterpreterTool,
    ImageGenerationTool,
    PlainTool,
    CustomTool,
    NamedToolChoice,
    HostedToolChoice,
    McpToolChoice,
    AllowedToolsChoice,
);
