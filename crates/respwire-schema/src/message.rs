// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The message-like union and its legacy-shape rule.
//!
//! Both message shapes share the wire tag `message`. Within that tag the
//! presence of `status` selects [`OutputMessage`]; its absence selects
//! [`InputMessage`]. Some producers send assistant output with no `type`, no
//! `id` and no `status`; [`LegacyOutputMessage`] recognizes those and
//! completes them before dispatch.
//!
//! Known ambiguity: the `status` check is a heuristic. A conforming producer
//! that sends an input message carrying `status` is read as output.

use respwire_codec::{
    impl_extensible, Diagnostic, Extensions, NormalizationRule, RuleContext, TaggedUnion, TextOrList, VariantRegistry,
    VariantSpec, WireError, DISCRIMINATOR,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::content::{InputContent, OutputContent};

/// Wire tag shared by both message shapes.
pub const MESSAGE_TAG: &str = "message";

/// Prefix of synthesized message ids.
pub const MESSAGE_ID_PREFIX: &str = "msg";

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// End user.
    User,
    /// The model.
    Assistant,
    /// System instructions.
    System,
    /// Developer instructions.
    Developer,
}

/// Lifecycle state of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Still being produced.
    InProgress,
    /// Finished.
    Completed,
    /// Cut short.
    Incomplete,
}

/// Message supplied as model input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMessage {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Author.
    pub role: MessageRole,
    /// Plain text or a list of input parts.
    pub content: TextOrList<InputContent>,
}

impl InputMessage {
    /// A user message with plain text content.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            extensions: Extensions::new(),
            role: MessageRole::User,
            content: TextOrList::Text(text.into()),
        }
    }
}

/// Message produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputMessage {
    /// Unclaimed keys.
    #[serde(flatten)]
    pub extensions: Extensions,
    /// Item id.
    pub id: String,
    /// Always `assistant` from conforming producers.
    pub role: MessageRole,
    /// Output parts.
    pub content: Vec<OutputContent>,
    /// Lifecycle state.
    pub status: ItemStatus,
}

/// A message in either direction.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageItem {
    /// Input-shaped message.
    Input(InputMessage),
    /// Output-shaped message.
    Output(OutputMessage),
}

impl From<InputMessage> for MessageItem {
    fn from(message: InputMessage) -> Self {
        Self::Input(message)
    }
}

impl From<OutputMessage> for MessageItem {
    fn from(message: OutputMessage) -> Self {
        Self::Output(message)
    }
}

fn decode_message(object: Map<String, Value>) -> Result<MessageItem, WireError> {
    let output = object.contains_key("status");
    let value = Value::Object(object);
    if output {
        Ok(MessageItem::Output(serde_json::from_value(value)?))
    } else {
        Ok(MessageItem::Input(serde_json::from_value(value)?))
    }
}

impl TaggedUnion for MessageItem {
    const NAME: &'static str = "MessageItem";

    fn registry() -> &'static VariantRegistry<Self> {
        static REGISTRY: std::sync::OnceLock<VariantRegistry<MessageItem>> = std::sync::OnceLock::new();
        REGISTRY.get_or_init(|| {
            let mut registry = VariantRegistry::new(Self::NAME);
            let spec = VariantSpec::new(MESSAGE_TAG, "InputMessage | OutputMessage");
            if let Err(err) = registry.register_with(spec, Box::new(decode_message)) {
                registry.note_conflict(err);
            }
            if let Err(err) = registry.set_default_tag(MESSAGE_TAG) {
                registry.note_conflict(err);
            }
            registry
        })
    }

    fn tag(&self) -> &'static str {
        MESSAGE_TAG
    }

    fn encode_payload(&self) -> Result<Value, WireError> {
        let value = match self {
            Self::Input(message) => serde_json::to_value(message)?,
            Self::Output(message) => serde_json::to_value(message)?,
        };
        Ok(value)
    }

    fn normalization_rules() -> &'static [&'static dyn NormalizationRule] {
        &[&LegacyOutputMessage]
    }
}

impl Serialize for MessageItem {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        respwire_codec::serialize_union(self, serializer)
    }
}

impl<'de> Deserialize<'de> for MessageItem {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        respwire_codec::deserialize_union(deserializer)
    }
}

/// Completes assistant output sent without `type`, `id` or `status`.
///
/// In scope: objects whose `type` is absent or `message` and that show output
/// evidence, namely a `status` key or an array `content` holding an
/// `output_text` or `refusal` part. Missing `type`, `id` and `status` are
/// filled with `message`, a fresh `msg_…` id and `completed`. Filling only
/// `type` is silent.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyOutputMessage;

impl LegacyOutputMessage {
    /// Rule name reported in diagnostics.
    pub const NAME: &'static str = "legacy_output_message";

    fn has_output_parts(object: &Map<String, Value>) -> bool {
        let Some(Value::Array(parts)) = object.get("content") else {
            return false;
        };
        parts.iter().any(|part| {
            matches!(
                part.get(DISCRIMINATOR).and_then(Value::as_str),
                Some("output_text" | "refusal")
            )
        })
    }
}

impl NormalizationRule for LegacyOutputMessage {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn applies(&self, object: &Map<String, Value>) -> bool {
        let message_like = match object.get(DISCRIMINATOR) {
            None => true,
            Some(tag) => tag.as_str() == Some(MESSAGE_TAG),
        };
        message_like && (object.contains_key("status") || Self::has_output_parts(object))
    }

    fn rewrite(&self, object: &mut Map<String, Value>, ctx: &RuleContext<'_>) -> Option<Diagnostic> {
        let mut synthesized = Vec::new();
        if !object.contains_key(DISCRIMINATOR) {
            object.insert(DISCRIMINATOR.to_owned(), Value::String(MESSAGE_TAG.to_owned()));
            synthesized.push("type");
        }
        // An absent tag alone is the union default, not a legacy shape. Outer
        // unions strip `type` before handing the payload down.
        if object.contains_key("id") && object.contains_key("status") {
            return None;
        }
        if !object.contains_key("id") {
            object.insert("id".to_owned(), Value::String(ctx.fresh_id(MESSAGE_ID_PREFIX)));
            synthesized.push("id");
        }
        if !object.contains_key("status") {
            object.insert("status".to_owned(), Value::String("completed".to_owned()));
            synthesized.push("status");
        }
        Some(Diagnostic {
            rule: Self::NAME,
            union: ctx.union(),
            message: format!(
                "message-like object read as output message; synthesized {}",
                synthesized.join(", ")
            ),
            synthesized,
        })
    }
}

impl_extensible!(InputMessage, OutputMessage);

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use respwire_codec::{apply_rules, CodecConfig, IdSourceKind, SequentialIds, WireCodec};
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn sequential_codec() -> WireCodec {
        WireCodec::new(CodecConfig {
            id_source: IdSourceKind::Sequential,
            ..CodecConfig::default()
        })
    }

    #[test]
    fn rule_is_idempotent() {
        let ids = SequentialIds::default();
        let ctx = RuleContext::new("MessageItem", &ids);
        let rules: [&dyn NormalizationRule; 1] = [&LegacyOutputMessage];
        let mut raw = object(json!({
            "role": "assistant",
            "content": [{ "type": "output_text", "text": "ok", "annotations": [] }]
        }));

        let first = apply_rules(&rules, &mut raw, &ctx);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].synthesized, ["type", "id", "status"]);
        let canonical = raw.clone();

        let second = apply_rules(&rules, &mut raw, &ctx);
        assert!(second.is_empty());
        assert_eq!(raw, canonical);
    }

    #[test]
    fn restoring_a_stripped_tag_is_silent() {
        let ids = SequentialIds::default();
        let ctx = RuleContext::new("MessageItem", &ids);
        let mut raw = object(json!({ "id": "msg_1", "role": "assistant", "content": [], "status": "completed" }));
        assert!(LegacyOutputMessage.rewrite(&mut raw, &ctx).is_none());
        assert_eq!(raw.get("type"), Some(&json!("message")));
    }

    #[test]
    fn input_shapes_are_out_of_scope() {
        let rule = LegacyOutputMessage;
        assert!(!rule.applies(&object(json!({ "role": "user", "content": "hi" }))));
        assert!(!rule.applies(&object(json!({
            "role": "user",
            "content": [{ "type": "input_text", "text": "hi" }]
        }))));
        assert!(!rule.applies(&object(json!({ "type": "function_call", "status": "completed" }))));
        assert!(rule.applies(&object(json!({ "type": "message", "status": "completed" }))));
    }

    #[test]
    fn status_selects_the_output_shape() {
        let codec = sequential_codec();
        let decoded = codec
            .decode_value::<MessageItem>(json!({
                "type": "message",
                "id": "msg_1",
                "role": "assistant",
                "status": "in_progress",
                "content": []
            }))
            .unwrap();
        assert!(decoded.is_clean());
        let MessageItem::Output(message) = decoded.value else {
            panic!("expected output message");
        };
        assert_eq!(message.status, ItemStatus::InProgress);
    }

    #[test]
    fn absent_type_defaults_to_input_message() {
        let decoded = sequential_codec()
            .decode_value::<MessageItem>(json!({ "role": "user", "content": "hello" }))
            .unwrap();
        assert!(decoded.is_clean());
        assert_eq!(decoded.value, MessageItem::Input(InputMessage::user_text("hello")));
    }

    #[test]
    fn legacy_assistant_output_is_completed() {
        let decoded = sequential_codec()
            .decode_value::<MessageItem>(json!({
                "role": "assistant",
                "content": [{ "type": "refusal", "refusal": "no" }]
            }))
            .unwrap();
        assert_eq!(decoded.diagnostics.len(), 1);
        let MessageItem::Output(message) = decoded.value else {
            panic!("expected output message");
        };
        assert_eq!(message.id, "msg_000001");
        assert_eq!(message.status, ItemStatus::Completed);
    }

    #[test]
    fn disabled_normalization_leaves_legacy_shape_unrepaired() {
        let codec = WireCodec::new(CodecConfig {
            normalize_legacy_shapes: false,
            ..CodecConfig::default()
        });
        let err = codec
            .decode_value::<MessageItem>(json!({
                "role": "assistant",
                "content": [{ "type": "output_text", "text": "ok", "annotations": [] }]
            }))
            .unwrap_err();
        assert_eq!(
            err,
            WireError::UnsupportedVariant {
                union: "InputContent",
                tag: "output_text".into()
            }
        );
    }

    #[test]
    fn output_message_encodes_with_tag() {
        let message = MessageItem::Output(OutputMessage {
            extensions: Extensions::new(),
            id: "msg_9".into(),
            role: MessageRole::Assistant,
            content: vec![OutputContent::text("done")],
            status: ItemStatus::Completed,
        });
        let value = WireCodec::default().encode_value(&message).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "message",
                "id": "msg_9",
                "role": "assistant",
                "status": "completed",
                "content": [{ "type": "output_text", "text": "done", "annotations": [] }]
            })
        );
    }
}
