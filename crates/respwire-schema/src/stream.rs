// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Server-pushed streaming events.
//!
//! Each event arrives as one JSON document. The transport owns framing; this
//! module only decodes the documents it hands over, one at a time and in
//! arrival order. `sequence_number` is lifted off the event into a
//! [`SequenceToken`] before dispatch and restored on encode. Every event
//! except `keepalive` and `error` must carry one.

use std::fmt;

use respwire_codec::{
    de_error, impl_extensible, peek_tag, ser_error, wire_union, Decoded, Extensions, TaggedUnion, WireCodec,
    WireError,
};
use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::content::{Annotation, OutputContent, ReasoningSummaryPart};
use crate::item::OutputItem;
use crate::response::Response;

/// Member carrying the event's position in its stream.
pub const SEQUENCE_FIELD: &str = "sequence_number";

/// Lifecycle event carrying the full response body.
///
/// Shared by `response.created`, `.in_progress`, `.completed`, `.failed`,
/// `.incomplete` and `.queued`; the payload keeps its own `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseLifecycleEvent {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Event tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// Response snapshot.
    pub response: Response,
}

impl ResponseLifecycleEvent {
    /// Lifecycle event `kind` for `response`.
    pub fn new(kind: impl Into<String>, response: Response) -> Self {
        Self {
            extensions: Extensions::new(),
            kind: kind.into(),
            response,
        }
    }
}

/// `response.output_item.added` / `.done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputItemEvent {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Position in `output`.
    pub output_index: u32,
    /// The item.
    pub item: OutputItem,
}

/// `response.content_part.added` / `.done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPartEvent {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Owning item.
    pub item_id: String,
    /// Position in `output`.
    pub output_index: u32,
    /// Position in the item's content.
    pub content_index: u32,
    /// The part.
    pub part: OutputContent,
}

/// Text delta within one content part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDeltaEvent {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Owning item.
    pub item_id: String,
    /// Position in `output`.
    pub output_index: u32,
    /// Position in the item's content.
    pub content_index: u32,
    /// Appended text.
    pub delta: String,
    /// Token log probabilities, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<Vec<Value>>,
}

/// Final text of one content part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDoneEvent {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Owning item.
    pub item_id: String,
    /// Position in `output`.
    pub output_index: u32,
    /// Position in the item's content.
    pub content_index: u32,
    /// Full text.
    pub text: String,
    /// Token log probabilities, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<Vec<Value>>,
}

/// `response.output_text.annotation.added`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationAddedEvent {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Owning item.
    pub item_id: String,
    /// Position in `output`.
    pub output_index: u32,
    /// Position in the item's content.
    pub content_index: u32,
    /// Position among the part's annotations.
    pub annotation_index: u32,
    /// The annotation.
    pub annotation: Annotation,
}

/// `response.refusal.done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefusalDoneEvent {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Owning item.
    pub item_id: String,
    /// Position in `output`.
    pub output_index: u32,
    /// Position in the item's content.
    pub content_index: u32,
    /// Full refusal.
    pub refusal: String,
}

/// Delta of an item-level string (arguments, code, custom input).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDeltaEvent {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Owning item.
    pub item_id: String,
    /// Position in `output`.
    pub output_index: u32,
    /// Appended text.
    pub delta: String,
}

/// Final arguments of a function or MCP call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentsDoneEvent {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Owning item.
    pub item_id: String,
    /// Position in `output`.
    pub output_index: u32,
    /// JSON-encoded arguments.
    pub arguments: String,
}

/// `response.code_interpreter_call_code.done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeDoneEvent {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Owning item.
    pub item_id: String,
    /// Position in `output`.
    pub output_index: u32,
    /// Full code.
    pub code: String,
}

/// `response.custom_tool_call_input.done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomInputDoneEvent {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Owning item.
    pub item_id: String,
    /// Position in `output`.
    pub output_index: u32,
    /// Full input.
    pub input: String,
}

/// Progress of a hosted tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemProgressEvent {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Owning item.
    pub item_id: String,
    /// Position in `output`.
    pub output_index: u32,
}

/// `response.image_generation_call.partial_image`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialImageEvent {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Owning item.
    pub item_id: String,
    /// Position in `output`.
    pub output_index: u32,
    /// Zero-based partial counter.
    pub partial_image_index: u32,
    /// Base64 image.
    pub partial_image_b64: String,
}

/// `response.reasoning_summary_part.added` / `.done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryPartEvent {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Owning item.
    pub item_id: String,
    /// Position in `output`.
    pub output_index: u32,
    /// Position in the summary.
    pub summary_index: u32,
    /// The part.
    pub part: ReasoningSummaryPart,
}

/// `response.reasoning_summary_text.delta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTextDeltaEvent {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Owning item.
    pub item_id: String,
    /// Position in `output`.
    pub output_index: u32,
    /// Position in the summary.
    pub summary_index: u32,
    /// Appended text.
    pub delta: String,
}

/// `response.reasoning_summary_text.done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryTextDoneEvent {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Owning item.
    pub item_id: String,
    /// Position in `output`.
    pub output_index: u32,
    /// Position in the summary.
    pub summary_index: u32,
    /// Full text.
    pub text: String,
}

/// Audio chunk or transcript delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioDeltaEvent {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Base64 audio or transcript text.
    pub delta: String,
}

/// Event with no payload of its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// `error` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEvent {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Machine-readable code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Offending parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

wire_union! {
    /// Every event a response stream can carry.
    ///
    /// Strict: no default tag and no normalization.
    #[derive(Debug, Clone, PartialEq)]
    pub enum StreamEvent: "StreamEvent" {
        /// Response created.
        "response.created" => Created(ResponseLifecycleEvent) embeds kind,
        /// Response generating.
        "response.in_progress" => InProgress(ResponseLifecycleEvent) embeds kind,
        /// Response finished.
        "response.completed" => Completed(ResponseLifecycleEvent) embeds kind,
        /// Response failed.
        "response.failed" => Failed(ResponseLifecycleEvent) embeds kind,
        /// Response cut short.
        "response.incomplete" => Incomplete(ResponseLifecycleEvent) embeds kind,
        /// Response queued.
        "response.queued" => Queued(ResponseLifecycleEvent) embeds kind,
        /// Output item started.
        "response.output_item.added" => OutputItemAdded(OutputItemEvent),
        /// Output item finished.
        "response.output_item.done" => OutputItemDone(OutputItemEvent),
        /// Content part started.
        "response.content_part.added" => ContentPartAdded(ContentPartEvent),
        /// Content part finished.
        "response.content_part.done" => ContentPartDone(ContentPartEvent),
        /// Output text delta.
        "response.output_text.delta" => OutputTextDelta(TextDeltaEvent),
        /// Output text finished.
        "response.output_text.done" => OutputTextDone(TextDoneEvent),
        /// Annotation attached to output text.
        "response.output_text.annotation.added" => OutputTextAnnotationAdded(AnnotationAddedEvent),
        /// Refusal delta.
        "response.refusal.delta" => RefusalDelta(TextDeltaEvent),
        /// Refusal finished.
        "response.refusal.done" => RefusalDone(RefusalDoneEvent),
        /// Function arguments delta.
        "response.function_call_arguments.delta" => FunctionCallArgumentsDelta(ItemDeltaEvent),
        /// Function arguments finished.
        "response.function_call_arguments.done" => FunctionCallArgumentsDone(ArgumentsDoneEvent),
        /// File search started.
        "response.file_search_call.in_progress" => FileSearchCallInProgress(ItemProgressEvent),
        /// File search running.
        "response.file_search_call.searching" => FileSearchCallSearching(ItemProgressEvent),
        /// File search finished.
        "response.file_search_call.completed" => FileSearchCallCompleted(ItemProgressEvent),
        /// Web search started.
        "response.web_search_call.in_progress" => WebSearchCallInProgress(ItemProgressEvent),
        /// Web search running.
        "response.web_search_call.searching" => WebSearchCallSearching(ItemProgressEvent),
        /// Web search finished.
        "response.web_search_call.completed" => WebSearchCallCompleted(ItemProgressEvent),
        /// Summary part started.
        "response.reasoning_summary_part.added" => ReasoningSummaryPartAdded(SummaryPartEvent),
        /// Summary part finished.
        "response.reasoning_summary_part.done" => ReasoningSummaryPartDone(SummaryPartEvent),
        /// Summary text delta.
        "response.reasoning_summary_text.delta" => ReasoningSummaryTextDelta(SummaryTextDeltaEvent),
        /// Summary text finished.
        "response.reasoning_summary_text.done" => ReasoningSummaryTextDone(SummaryTextDoneEvent),
        /// Reasoning text delta.
        "response.reasoning_text.delta" => ReasoningTextDelta(TextDeltaEvent),
        /// Reasoning text finished.
        "response.reasoning_text.done" => ReasoningTextDone(TextDoneEvent),
        /// Image generation finished.
        "response.image_generation_call.completed" => ImageGenerationCallCompleted(ItemProgressEvent),
        /// Image generation running.
        "response.image_generation_call.generating" => ImageGenerationCallGenerating(ItemProgressEvent),
        /// Image generation started.
        "response.image_generation_call.in_progress" => ImageGenerationCallInProgress(ItemProgressEvent),
        /// Partial image available.
        "response.image_generation_call.partial_image" => ImageGenerationCallPartialImage(PartialImageEvent),
        /// MCP arguments delta.
        "response.mcp_call_arguments.delta" => McpCallArgumentsDelta(ItemDeltaEvent),
        /// MCP arguments finished.
        "response.mcp_call_arguments.done" => McpCallArgumentsDone(ArgumentsDoneEvent),
        /// MCP call finished.
        "response.mcp_call.completed" => McpCallCompleted(ItemProgressEvent),
        /// MCP call failed.
        "response.mcp_call.failed" => McpCallFailed(ItemProgressEvent),
        /// MCP call started.
        "response.mcp_call.in_progress" => McpCallInProgress(ItemProgressEvent),
        /// MCP listing finished.
        "response.mcp_list_tools.completed" => McpListToolsCompleted(ItemProgressEvent),
        /// MCP listing failed.
        "response.mcp_list_tools.failed" => McpListToolsFailed(ItemProgressEvent),
        /// MCP listing started.
        "response.mcp_list_tools.in_progress" => McpListToolsInProgress(ItemProgressEvent),
        /// Code interpreter started.
        "response.code_interpreter_call.in_progress" => CodeInterpreterCallInProgress(ItemProgressEvent),
        /// Code interpreter running.
        "response.code_interpreter_call.interpreting" => CodeInterpreterCallInterpreting(ItemProgressEvent),
        /// Code interpreter finished.
        "response.code_interpreter_call.completed" => CodeInterpreterCallCompleted(ItemProgressEvent),
        /// Code delta.
        "response.code_interpreter_call_code.delta" => CodeInterpreterCallCodeDelta(ItemDeltaEvent),
        /// Code finished.
        "response.code_interpreter_call_code.done" => CodeInterpreterCallCodeDone(CodeDoneEvent),
        /// Custom tool input delta.
        "response.custom_tool_call_input.delta" => CustomToolCallInputDelta(ItemDeltaEvent),
        /// Custom tool input finished.
        "response.custom_tool_call_input.done" => CustomToolCallInputDone(CustomInputDoneEvent),
        /// Audio chunk.
        "response.audio.delta" => AudioDelta(AudioDeltaEvent),
        /// Audio finished.
        "response.audio.done" => AudioDone(SignalEvent),
        /// Transcript delta.
        "response.audio.transcript.delta" => AudioTranscriptDelta(AudioDeltaEvent),
        /// Transcript finished.
        "response.audio.transcript.done" => AudioTranscriptDone(SignalEvent),
        /// Stream-level error.
        "error" => Error(ErrorEvent),
        /// Idle heartbeat.
        "keepalive" => Keepalive(SignalEvent),
    }
}

impl StreamEvent {
    /// Response snapshot of lifecycle events.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Created(event)
            | Self::InProgress(event)
            | Self::Completed(event)
            | Self::Failed(event)
            | Self::Incomplete(event)
            | Self::Queued(event) => Some(&event.response),
            _ => None,
        }
    }

    /// Returns `true` for events that must carry a `sequence_number`.
    ///
    /// Heartbeats and transport-level `error` events may arrive unsequenced.
    pub fn requires_sequence(&self) -> bool {
        !matches!(self, Self::Keepalive(_) | Self::Error(_))
    }

    /// Returns `true` for events after which the stream carries nothing more.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed(_) | Self::Failed(_) | Self::Incomplete(_) | Self::Error(_)
        )
    }
}

/// Position of an event within its stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceToken(pub u64);

impl fmt::Display for SequenceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An event plus its stream position.
#[derive(Debug, Clone, PartialEq)]
pub struct SequencedEvent {
    /// `sequence_number`, when the producer sent one.
    pub sequence: Option<SequenceToken>,
    /// The event.
    pub event: StreamEvent,
}

impl SequencedEvent {
    /// Event at position `sequence`.
    pub fn new(sequence: u64, event: StreamEvent) -> Self {
        Self {
            sequence: Some(SequenceToken(sequence)),
            event,
        }
    }
}

impl Serialize for SequencedEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut object = match serde_json::to_value(&self.event) {
            Ok(Value::Object(object)) => object,
            Ok(_) => return Err(S::Error::custom("stream event did not encode as an object")),
            Err(err) => return Err(S::Error::custom(err)),
        };
        match self.sequence {
            Some(SequenceToken(sequence)) => {
                object.insert(SEQUENCE_FIELD.to_owned(), Value::from(sequence));
            }
            None if self.event.requires_sequence() => {
                return Err(ser_error(missing_sequence(&self.event)));
            }
            None => {}
        }
        Value::Object(object).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SequencedEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut object = Map::<String, Value>::deserialize(deserializer)?;
        let sequence = match object.remove(SEQUENCE_FIELD) {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => match n.as_u64() {
                Some(sequence) => Some(SequenceToken(sequence)),
                None => return Err(D::Error::custom(format!("`{SEQUENCE_FIELD}` must be a non-negative integer, found {n}"))),
            },
            Some(other) => {
                return Err(D::Error::custom(format!(
                    "`{SEQUENCE_FIELD}` must be a non-negative integer, found {other}"
                )))
            }
        };
        let event = StreamEvent::deserialize(Value::Object(object)).map_err(D::Error::custom)?;
        if sequence.is_none() && event.requires_sequence() {
            return Err(de_error(missing_sequence(&event)));
        }
        Ok(Self { sequence, event })
    }
}

fn missing_sequence(event: &StreamEvent) -> WireError {
    WireError::MissingSequence {
        union: StreamEvent::NAME,
        tag: event.tag().to_owned(),
    }
}

/// One line of an SSE body, as far as the payload is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseLine<'a> {
    /// JSON payload of a `data:` line (or a bare JSON line).
    Data(&'a str),
    /// The `[DONE]` sentinel.
    Done,
    /// Blank lines, comments and non-data fields.
    Skip,
}

/// Classifies one line of an event stream.
///
/// Accepts SSE `data:` lines and bare JSON documents. Multi-line `data:`
/// reassembly stays with the transport.
pub fn parse_sse_data(line: &str) -> SseLine<'_> {
    let line = line.trim_end_matches(['\r', '\n']);
    let payload = if let Some(rest) = line.strip_prefix("data:") {
        rest.strip_prefix(' ').unwrap_or(rest)
    } else if line.trim_start().starts_with('{') {
        line.trim_start()
    } else {
        return SseLine::Skip;
    };
    match payload.trim() {
        "" => SseLine::Skip,
        "[DONE]" => SseLine::Done,
        _ => SseLine::Data(payload),
    }
}

/// Decodes stream events one document at a time.
#[derive(Debug, Clone, Default)]
pub struct StreamDispatcher {
    codec: WireCodec,
}

impl StreamDispatcher {
    /// Dispatcher decoding through `codec`.
    pub fn new(codec: WireCodec) -> Self {
        Self { codec }
    }

    /// Underlying codec.
    pub fn codec(&self) -> &WireCodec {
        &self.codec
    }

    /// Decodes one event document.
    ///
    /// The tag is read before the full parse, so an unknown event fails
    /// without building the payload tree.
    ///
    /// # Errors
    /// [`WireError::MissingDiscriminator`] or [`WireError::UnsupportedVariant`]
    /// from the tag peek, otherwise any decode error of the event.
    pub fn decode(&self, bytes: &[u8]) -> Result<Decoded<SequencedEvent>, WireError> {
        self.codec.ensure_within_limit(bytes.len())?;
        match peek_tag(bytes)? {
            None => {
                return Err(WireError::MissingDiscriminator {
                    union: StreamEvent::NAME,
                })
            }
            Some(tag) if !StreamEvent::registry().contains(&tag) => {
                tracing::debug!(%tag, "unknown stream event");
                return Err(WireError::UnsupportedVariant {
                    union: StreamEvent::NAME,
                    tag,
                });
            }
            Some(_) => {}
        }
        let decoded = self.codec.decode::<SequencedEvent>(bytes)?;
        tracing::trace!(
            tag = decoded.value.event.tag(),
            sequence = decoded.value.sequence.map(|s| s.0),
            "stream event"
        );
        Ok(decoded)
    }

    /// Decodes one stream line; `Ok(None)` for lines that carry no event.
    ///
    /// # Errors
    /// As [`Self::decode`].
    pub fn decode_line(&self, line: &str) -> Result<Option<Decoded<SequencedEvent>>, WireError> {
        match parse_sse_data(line) {
            SseLine::Data(payload) => self.decode(payload.as_bytes()).map(Some),
            SseLine::Done | SseLine::Skip => Ok(None),
        }
    }

    /// Lazily decodes `lines` in order, skipping lines without events.
    pub fn events<'a, I>(&'a self, lines: I) -> impl Iterator<Item = Result<Decoded<SequencedEvent>, WireError>> + 'a
    where
        I: IntoIterator<Item = &'a str>,
        I::IntoIter: 'a,
    {
        lines.into_iter().filter_map(move |line| self.decode_line(line).transpose())
    }

    /// Encodes one event with its sequence number.
    ///
    /// # Errors
    /// Any encode error of the event.
    pub fn encode(&self, event: &SequencedEvent) -> Result<Vec<u8>, WireError> {
        self.codec.encode(event)
    }
}

impl_extensible!(
    ResponseLifecycleEvent,
    OutputItemEvent,
    ContentPartEvent,
    TextDeltaEvent,
    TextDoneEvent,
    AnnotationAddedEvent,
    RefusalDoneEvent,
    ItemDeltaEvent,
    ArgumentsDoneEvent,
    CodeDoneEvent,
    CustomInputDoneEvent,
    ItemProgressEvent,
    PartialImageEvent,
    SummaryPartEvent,
    SummaryTextDeltaEvent,
    SummaryTextDoneEvent,
    AudioDeltaEvent,
    SignalEvent,
    ErrorEvent,
);

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_count_covers_every_response_event() {
        let response_events = StreamEvent::TAGS.iter().filter(|t| t.starts_with("response.")).count();
        assert_eq!(response_events, 52);
        assert_eq!(StreamEvent::TAGS.len(), 54);
        assert!(StreamEvent::registry().conflicts().is_empty());
    }

    #[test]
    fn unknown_tags_fail_before_payload_parse() {
        let dispatcher = StreamDispatcher::default();
        // Payload is not valid for any event; the tag check must win.
        let err = dispatcher
            .decode(br#"{"type":"response.bogus","sequence_number":"x"}"#)
            .unwrap_err();
        assert_eq!(
            err,
            WireError::UnsupportedVariant {
                union: "StreamEvent",
                tag: "response.bogus".into()
            }
        );
        let err = dispatcher.decode(br#"{"sequence_number":1}"#).unwrap_err();
        assert_eq!(err, WireError::MissingDiscriminator { union: "StreamEvent" });
    }

    #[test]
    fn sequence_number_is_lifted_and_restored() {
        let dispatcher = StreamDispatcher::default();
        let raw = br#"{"type":"response.output_text.delta","item_id":"msg_1","output_index":0,"content_index":0,"delta":"He","sequence_number":4}"#;
        let decoded = dispatcher.decode(raw).unwrap();
        assert_eq!(decoded.value.sequence, Some(SequenceToken(4)));
        let StreamEvent::OutputTextDelta(delta) = &decoded.value.event else {
            panic!("expected output_text.delta");
        };
        assert!(delta.extensions.is_empty());
        assert_eq!(delta.delta, "He");

        let encoded: Value = serde_json::from_slice(&dispatcher.encode(&decoded.value).unwrap()).unwrap();
        let original: Value = serde_json::from_slice(raw).unwrap();
        assert_eq!(encoded, original);
    }

    #[test]
    fn unsequenced_content_events_are_rejected() {
        let dispatcher = StreamDispatcher::default();
        let raw = br#"{"type":"response.output_text.delta","item_id":"msg_1","output_index":0,"content_index":0,"delta":"He"}"#;
        let err = dispatcher.decode(raw).unwrap_err();
        assert_eq!(
            err,
            WireError::MissingSequence {
                union: "StreamEvent",
                tag: "response.output_text.delta".into()
            }
        );
        let null = br#"{"type":"response.output_text.delta","item_id":"msg_1","output_index":0,"content_index":0,"delta":"He","sequence_number":null}"#;
        assert_eq!(dispatcher.decode(null).unwrap_err().kind(), respwire_codec::WireErrorKind::MissingSequence);

        let sequenced = br#"{"type":"response.output_text.delta","item_id":"msg_1","output_index":0,"content_index":0,"delta":"He","sequence_number":3}"#;
        let mut event = dispatcher.decode(sequenced).unwrap().value;
        event.sequence = None;
        assert_eq!(dispatcher.encode(&event).unwrap_err().kind(), respwire_codec::WireErrorKind::MissingSequence);
    }

    #[test]
    fn heartbeats_and_errors_may_be_unsequenced() {
        let dispatcher = StreamDispatcher::default();
        let error = dispatcher.decode(br#"{"type":"error","message":"boom"}"#).unwrap().value;
        assert_eq!(error.sequence, None);
    }

    #[test]
    fn keepalive_sequence_is_optional() {
        let event: SequencedEvent = serde_json::from_value(json!({ "type": "keepalive" })).unwrap();
        assert_eq!(event.sequence, None);
        assert_eq!(serde_json::to_value(&event).unwrap(), json!({ "type": "keepalive" }));
    }

    #[test]
    fn lifecycle_tag_must_match_embedded_kind() {
        let response: Response = serde_json::from_value(json!({
            "id": "resp_1", "created_at": 1, "model": "m", "output": []
        }))
        .unwrap();
        let event = StreamEvent::Completed(ResponseLifecycleEvent::new("response.created", response));
        let err = WireCodec::default().encode_value(&event).unwrap_err();
        assert_eq!(
            err,
            WireError::TypeTagMismatch {
                union: "StreamEvent",
                expected: "response.completed".into(),
                found: "response.created".into()
            }
        );
    }

    #[test]
    fn sse_lines_are_classified() {
        assert_eq!(parse_sse_data("data: {\"type\":\"keepalive\"}"), SseLine::Data("{\"type\":\"keepalive\"}"));
        assert_eq!(parse_sse_data("data:{}\r"), SseLine::Data("{}"));
        assert_eq!(parse_sse_data("  {\"type\":\"keepalive\"}"), SseLine::Data("{\"type\":\"keepalive\"}"));
        assert_eq!(parse_sse_data("data: [DONE]"), SseLine::Done);
        assert_eq!(parse_sse_data(": ping"), SseLine::Skip);
        assert_eq!(parse_sse_data("event: response.created"), SseLine::Skip);
        assert_eq!(parse_sse_data(""), SseLine::Skip);
    }

    #[test]
    fn events_preserve_arrival_order() {
        let dispatcher = StreamDispatcher::default();
        let lines = [
            "event: keepalive",
            "data: {\"type\":\"keepalive\",\"sequence_number\":2}",
            "",
            "data: {\"type\":\"keepalive\",\"sequence_number\":1}",
            "data: [DONE]",
        ];
        let sequence: Vec<_> = dispatcher
            .events(lines)
            .map(|event| event.unwrap().value.sequence)
            .collect();
        assert_eq!(sequence, [Some(SequenceToken(2)), Some(SequenceToken(1))]);
    }

    #[test]
    fn terminal_events() {
        let error: StreamEvent = serde_json::from_value(json!({ "type": "error", "message": "boom" })).unwrap();
        assert!(error.is_terminal());
        assert!(error.response().is_none());
    }
}
