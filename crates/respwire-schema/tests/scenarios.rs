// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! End-to-end decode scenarios over the shared fixtures.

use std::sync::Arc;

use respwire_codec::{CodecConfig, Extensions, WireCodec, WireError, WireErrorKind};
use respwire_dry_tests::fixtures::{
    canonical_response, response_created, sse_transcript, INPUT_TEXT, LEGACY_ASSISTANT_OUTPUT, MIXED_CITATION,
};
use respwire_dry_tests::{codec_with_ids, deterministic_codec, ScriptedIds};
use respwire_schema::content::FileCitation;
use respwire_schema::{
    Annotation, InputContent, InputItem, ItemStatus, LegacyOutputMessage, MessageItem, Response,
    ResponseCreateParams, SequenceToken, StreamDispatcher, StreamEvent,
};
use serde_json::{json, Value};

#[test]
fn input_text_decodes_and_reencodes_unchanged() {
    let codec = WireCodec::default();
    let decoded = codec.decode_str::<InputContent>(INPUT_TEXT).unwrap();
    assert!(decoded.is_clean());
    let InputContent::Text(text) = &decoded.value else {
        panic!("expected input_text, got {:?}", decoded.value);
    };
    assert_eq!(text.text, "hi");

    let reencoded: Value = serde_json::from_slice(&codec.encode(&decoded.value).unwrap()).unwrap();
    let original: Value = serde_json::from_str(INPUT_TEXT).unwrap();
    assert_eq!(reencoded, original);
}

#[test]
fn legacy_assistant_output_becomes_output_message() {
    let decoded = deterministic_codec().decode_str::<InputItem>(LEGACY_ASSISTANT_OUTPUT).unwrap();
    assert_eq!(decoded.diagnostics.len(), 1);
    let diagnostic = &decoded.diagnostics[0];
    assert_eq!(diagnostic.rule, LegacyOutputMessage::NAME);
    assert_eq!(diagnostic.synthesized, ["type", "id", "status"]);

    let InputItem::Message(MessageItem::Output(message)) = decoded.value else {
        panic!("expected output message");
    };
    assert_eq!(message.id, "msg_000001");
    assert_eq!(message.status, ItemStatus::Completed);
    assert_eq!(message.content.len(), 1);
}

#[test]
fn legacy_repair_draws_one_id_from_the_scope_source() {
    let ids = Arc::new(ScriptedIds::new(["legacy"]));
    let codec = codec_with_ids(ids.clone());
    let decoded = codec
        .decode_value::<Vec<InputItem>>(json!([
            serde_json::from_str::<Value>(LEGACY_ASSISTANT_OUTPUT).unwrap(),
            { "role": "user", "content": "thanks" }
        ]))
        .unwrap();
    assert_eq!(decoded.diagnostics.len(), 1);
    assert_eq!(ids.requests(), ["msg"]);
    let InputItem::Message(MessageItem::Output(message)) = &decoded.value[0] else {
        panic!("expected output message first");
    };
    assert_eq!(message.id, "msg_legacy");
    assert!(matches!(decoded.value[1], InputItem::Message(MessageItem::Input(_))));
}

#[test]
fn repaired_output_reencodes_canonically_and_decodes_clean() {
    let codec = deterministic_codec();
    let repaired = codec.decode_str::<InputItem>(LEGACY_ASSISTANT_OUTPUT).unwrap().value;
    let encoded = codec.encode_value(&repaired).unwrap();
    assert_eq!(encoded["type"], "message");
    assert_eq!(encoded["status"], "completed");

    let again = codec.decode_value::<InputItem>(encoded).unwrap();
    assert!(again.is_clean());
    assert_eq!(again.value, repaired);
}

#[test]
fn disabled_normalization_reports_the_nested_part() {
    let codec = WireCodec::new(CodecConfig {
        normalize_legacy_shapes: false,
        ..CodecConfig::default()
    });
    let err = codec.decode_str::<InputItem>(LEGACY_ASSISTANT_OUTPUT).unwrap_err();
    assert_eq!(
        err,
        WireError::UnsupportedVariant {
            union: "InputContent",
            tag: "output_text".into()
        }
    );
}

#[test]
fn response_created_round_trips_without_loss() {
    let dispatcher = StreamDispatcher::default();
    let raw = response_created();
    let bytes = serde_json::to_vec(&raw).unwrap();

    let decoded = dispatcher.decode(&bytes).unwrap();
    assert!(decoded.is_clean());
    assert_eq!(decoded.value.sequence, Some(SequenceToken(0)));
    let StreamEvent::Created(created) = &decoded.value.event else {
        panic!("expected response.created");
    };
    assert!(created.response.output.is_empty());

    let encoded: Value = serde_json::from_slice(&dispatcher.encode(&decoded.value).unwrap()).unwrap();
    assert_eq!(encoded, raw);
}

#[test]
fn mixed_citation_is_rejected_on_decode_and_encode() {
    let codec = WireCodec::default();
    let err = codec.decode_str::<Annotation>(MIXED_CITATION).unwrap_err();
    assert_eq!(
        err,
        WireError::MultipleVariantsSet {
            union: "Annotation",
            tags: vec!["file_citation".into(), "url_citation".into()]
        }
    );

    let mut extensions = Extensions::new();
    extensions.insert("title", json!("Example"));
    let citation = Annotation::FileCitation(FileCitation {
        extensions,
        file_id: "file_1".into(),
        filename: None,
        index: 3,
    });
    let err = codec.encode(&citation).unwrap_err();
    assert_eq!(err.kind(), WireErrorKind::MultipleVariantsSet);
}

#[test]
fn sse_transcript_decodes_in_order() {
    let dispatcher = StreamDispatcher::default();
    let transcript = sse_transcript();
    let events: Vec<_> = dispatcher
        .events(transcript.lines())
        .map(|event| event.unwrap().value)
        .collect();

    let sequence: Vec<_> = events.iter().filter_map(|e| e.sequence).map(|s| s.0).collect();
    assert_eq!(sequence, [0, 1, 2, 3, 4, 5]);

    let text: String = events
        .iter()
        .filter_map(|e| match &e.event {
            StreamEvent::OutputTextDelta(delta) => Some(delta.delta.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, "Hello");
    assert!(events.last().is_some_and(|e| e.event.is_terminal()));
}

#[test]
fn unknown_keys_survive_request_round_trip() {
    let raw = json!({
        "model": "m",
        "x_trace": { "span": 7 },
        "input": [
            { "type": "message", "role": "user", "content": [{ "type": "input_text", "text": "hi", "x_hint": true }] },
            { "type": "function_call_output", "call_id": "c1", "output": "{}", "x_meta": [1, 2] }
        ],
        "tools": [{ "type": "function", "name": "lookup", "parameters": {}, "strict": true }]
    });
    let codec = WireCodec::default();
    let request = codec.decode_value::<ResponseCreateParams>(raw.clone()).unwrap().value;
    assert_eq!(request.extensions.get("x_trace"), Some(&json!({ "span": 7 })));
    assert_eq!(codec.encode_value(&request).unwrap(), raw);
}

#[test]
fn nested_output_errors_name_the_inner_union() {
    let mut raw = canonical_response("resp_9", "completed");
    raw["output"] = json!([{ "type": "hologram", "id": "x" }]);
    let err = WireCodec::default().decode_value::<Response>(raw).unwrap_err();
    assert_eq!(
        err,
        WireError::UnsupportedVariant {
            union: "OutputItem",
            tag: "hologram".into()
        }
    );
}
