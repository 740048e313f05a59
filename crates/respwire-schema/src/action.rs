// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tool-call actions and tool outputs nested inside items.

use std::collections::BTreeMap;

use respwire_codec::{impl_extensible, wire_union, Extensions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Screen coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal pixel.
    pub x: i64,
    /// Vertical pixel.
    pub y: i64,
}

/// `click` action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Click {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// `left`, `right`, `wheel`, `back` or `forward`.
    pub button: String,
    /// Horizontal pixel.
    pub x: i64,
    /// Vertical pixel.
    pub y: i64,
}

/// Pointer action at one coordinate (`double_click`, `move`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerAt {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Horizontal pixel.
    pub x: i64,
    /// Vertical pixel.
    pub y: i64,
}

/// `drag` action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drag {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Path from start to end.
    pub path: Vec<Point>,
}

/// `keypress` action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypress {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Key combination, pressed together.
    pub keys: Vec<String>,
}

/// `scroll` action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scroll {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Horizontal pixel.
    pub x: i64,
    /// Vertical pixel.
    pub y: i64,
    /// Horizontal distance.
    pub scroll_x: i64,
    /// Vertical distance.
    pub scroll_y: i64,
}

/// `type` action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeText {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Text to type.
    pub text: String,
}

/// Action with no fields of its own (`screenshot`, `wait`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bare {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
}

wire_union! {
    /// Action requested by a computer-use call.
    #[derive(Debug, Clone, PartialEq)]
    pub enum ComputerAction: "ComputerAction" {
        /// Mouse click.
        "click" => Click(Click) keys ["button", "x", "y"],
        /// Double click.
        "double_click" => DoubleClick(PointerAt) keys ["x", "y"],
        /// Drag along a path.
        "drag" => Drag(Drag) keys ["path"],
        /// Key combination.
        "keypress" => Keypress(Keypress) keys ["keys"],
        /// Pointer move.
        "move" => Move(PointerAt) keys ["x", "y"],
        /// Capture the screen.
        "screenshot" => Screenshot(Bare) keys [],
        /// Scroll wheel.
        "scroll" => Scroll(Scroll) keys ["x", "y", "scroll_x", "scroll_y"],
        /// Type text.
        "type" => Type(TypeText) keys ["text"],
        /// Pause.
        "wait" => Wait(Bare) keys [],
    }
}

/// `search` web action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchQuery {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Search query.
    pub query: String,
    /// Consulted sources, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Value>>,
}

/// `open_page` web action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPage {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Opened page.
    pub url: String,
}

/// `find` web action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindInPage {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Searched page.
    pub url: String,
    /// Pattern looked for.
    pub pattern: String,
}

wire_union! {
    /// What a web search call did.
    #[derive(Debug, Clone, PartialEq)]
    pub enum WebSearchAction: "WebSearchAction" {
        /// Ran a query.
        "search" => Search(WebSearchQuery),
        /// Opened a page.
        "open_page" => OpenPage(OpenPage),
        /// Searched within a page.
        "find" => Find(FindInPage),
    }
}

/// `logs` output of a code interpreter call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeLogs {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Captured output.
    pub logs: String,
}

/// `image` output of a code interpreter call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeImage {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Image location.
    pub url: String,
}

wire_union! {
    /// Output produced by a code interpreter call.
    #[derive(Debug, Clone, PartialEq)]
    pub enum CodeInterpreterOutput: "CodeInterpreterOutput" {
        /// Text logs.
        "logs" => Logs(CodeLogs),
        /// Rendered image.
        "image" => Image(CodeImage),
    }
}

/// `exec` action of a local shell call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShellExec {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Always `exec`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Argument vector.
    pub command: Vec<String>,
    /// Environment additions.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// User to run as.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
}

/// Screenshot returned to a computer-use call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputerScreenshot {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Always `computer_screenshot`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Uploaded file id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
}

/// Safety check raised on a computer-use call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyCheck {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Check id.
    pub id: String,
    /// Check kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Explanation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl_extensible!(
    Click,
    PointerAt,
    Drag,
    Keypress,
    Scroll,
    TypeText,
    Bare,
    WebSearchQuery,
    OpenPage,
    FindInPage,
    CodeLogs,
    CodeImage,
    ShellExec,
    ComputerScreenshot,
    SafetyCheck,
);
