// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! respwire-schema: the Responses wire schema.
//!
//! Every polymorphic shape of the wire format is a [`respwire_codec`] union:
//! content parts, annotations, conversation items, tools and tool choice,
//! text formats, and streaming events. Fixed-shape records carry an
//! [`Extensions`](respwire_codec::Extensions) map so unknown keys survive a
//! decode/encode cycle.
//!
//! Only the `message` tag is lenient: objects without `type` default to it,
//! and assistant output in legacy shape is repaired by
//! [`LegacyOutputMessage`] with a diagnostic. Every other union is strict.
#![forbid(unsafe_code)]

pub mod action;
pub mod content;
pub mod item;
pub mod message;
pub mod response;
pub mod stream;
pub mod tool;

/// Content parts and annotations.
pub use content::{Annotation, ImageDetail, InputContent, OutputContent, ReasoningContentPart, ReasoningSummaryPart};
/// Conversation items.
pub use item::{InputItem, OutputItem};
/// Messages and the legacy-shape rule.
pub use message::{InputMessage, ItemStatus, LegacyOutputMessage, MessageItem, MessageRole, OutputMessage};
/// Response and request bodies.
pub use response::{Response, ResponseCreateParams, ResponseStatus, TextConfig, TextFormat, Usage};
/// Streaming.
pub use stream::{parse_sse_data, SequenceToken, SequencedEvent, SseLine, StreamDispatcher, StreamEvent};
/// Tools.
pub use tool::{Tool, ToolChoice, ToolChoiceMode, ToolChoiceObject};
