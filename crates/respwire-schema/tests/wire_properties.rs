// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]
//! Property tests over the schema unions.

use proptest::prelude::*;
use respwire_codec::{TaggedUnion, WireCodec, WireError};
use respwire_schema::{
    InputContent, InputItem, OutputItem, StreamDispatcher, StreamEvent, Tool, ToolChoiceObject,
};
use serde_json::{json, Map, Value};

fn extension_keys() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("x_[a-z]{1,8}", any::<i64>().prop_map(Value::from), 0..4)
        .prop_map(|map| map.into_iter().collect())
}

fn progress_tags() -> Vec<&'static str> {
    StreamEvent::TAGS
        .iter()
        .copied()
        .filter(|tag| {
            StreamEvent::registry()
                .get(tag)
                .is_some_and(|entry| entry.type_name() == "ItemProgressEvent")
        })
        .collect()
}

proptest! {
    #[test]
    fn input_text_survives_any_text(text in ".{0,64}", extra in extension_keys()) {
        let mut object = extra.clone();
        object.insert("type".into(), json!("input_text"));
        object.insert("text".into(), json!(text));
        let raw = Value::Object(object);

        let codec = WireCodec::default();
        let part = codec.decode_value::<InputContent>(raw.clone()).unwrap().value;
        prop_assert_eq!(codec.encode_value(&part).unwrap(), raw);
    }

    #[test]
    fn function_calls_keep_unknown_keys_through_both_item_unions(
        name in "[a-z_]{1,12}",
        extra in extension_keys(),
    ) {
        let mut object = extra.clone();
        object.insert("type".into(), json!("function_call"));
        object.insert("call_id".into(), json!("call_1"));
        object.insert("name".into(), json!(name));
        object.insert("arguments".into(), json!("{}"));
        let raw = Value::Object(object);

        let codec = WireCodec::default();
        let output = codec.decode_value::<OutputItem>(raw.clone()).unwrap().value;
        let replayed = InputItem::from(output);
        prop_assert_eq!(codec.encode_value(&replayed).unwrap(), raw);
    }

    #[test]
    fn progress_events_select_their_own_tag(index in 0usize..64, output_index in 0u32..16, sequence in any::<u64>()) {
        let tags = progress_tags();
        let tag = tags[index % tags.len()];
        let raw = json!({
            "type": tag,
            "item_id": "item_1",
            "output_index": output_index,
            "sequence_number": sequence
        });
        let dispatcher = StreamDispatcher::default();
        let decoded = dispatcher.decode(&serde_json::to_vec(&raw).unwrap()).unwrap().value;
        prop_assert_eq!(decoded.event.tag(), tag);
        prop_assert_eq!(decoded.sequence.map(|s| s.0), Some(sequence));
        let encoded: Value = serde_json::from_slice(&dispatcher.encode(&decoded).unwrap()).unwrap();
        prop_assert_eq!(encoded, raw);
    }

    #[test]
    fn unregistered_event_tags_fail_fast(suffix in "[a-z_]{1,12}") {
        let tag = format!("response.zz_{suffix}");
        let raw = json!({ "type": tag, "sequence_number": 1 });
        let err = StreamDispatcher::default().decode(&serde_json::to_vec(&raw).unwrap()).unwrap_err();
        prop_assert_eq!(err, WireError::UnsupportedVariant { union: "StreamEvent", tag });
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = StreamDispatcher::default().decode(&bytes);
        let _ = WireCodec::default().decode::<InputItem>(&bytes);
    }
}

#[test]
fn every_union_registry_is_conflict_free() {
    assert!(InputContent::registry().conflicts().is_empty());
    assert!(InputItem::registry().conflicts().is_empty());
    assert!(OutputItem::registry().conflicts().is_empty());
    assert!(Tool::registry().conflicts().is_empty());
    assert!(ToolChoiceObject::registry().conflicts().is_empty());
    assert!(StreamEvent::registry().conflicts().is_empty());
    assert_eq!(progress_tags().len(), 18);
}
