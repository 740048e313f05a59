// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Wire documents shared by the schema tests and the CLI tests.

use serde_json::{json, Value};

/// A plain `input_text` part.
pub const INPUT_TEXT: &str = r#"{"type":"input_text","text":"hi"}"#;

/// Assistant output in legacy shape: no `type`, no `id`, no `status`.
pub const LEGACY_ASSISTANT_OUTPUT: &str =
    r#"{"role":"assistant","content":[{"type":"output_text","text":"ok","annotations":[]}]}"#;

/// A file citation that also carries a URL citation's keys.
pub const MIXED_CITATION: &str =
    r#"{"type":"file_citation","file_id":"file_1","index":3,"url":"https://example.com","title":"Example"}"#;

/// `response.created` with an empty `output` array, in canonical encoding.
pub fn response_created() -> Value {
    json!({
        "type": "response.created",
        "sequence_number": 0,
        "response": canonical_response("resp_1", "in_progress")
    })
}

/// Response body with every optional member present, as the codec encodes it.
pub fn canonical_response(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "object": "response",
        "created_at": 1_741_476_542,
        "status": status,
        "error": null,
        "incomplete_details": null,
        "instructions": null,
        "model": "gpt-4o-2024-08-06",
        "output": [],
        "parallel_tool_calls": true,
        "temperature": 1.0,
        "top_p": 1.0,
        "tool_choice": "auto",
        "tools": [],
        "max_output_tokens": null,
        "previous_response_id": null,
        "reasoning": null,
        "text": { "format": { "type": "text" } },
        "truncation": "disabled",
        "usage": null,
        "user": null,
        "metadata": {},
        "background": false,
        "service_tier": "auto"
    })
}

/// A short SSE transcript: lifecycle, one text part, completion, sentinel.
///
/// Includes a comment line, an `event:` field and blank separators, which a
/// line reader must skip.
pub fn sse_transcript() -> String {
    let created = response_created();
    let completed = json!({
        "type": "response.completed",
        "sequence_number": 5,
        "response": canonical_response("resp_1", "completed")
    });
    let lines = [
        ": keep-alive".to_owned(),
        "event: response.created".to_owned(),
        format!("data: {created}"),
        String::new(),
        format!(
            "data: {}",
            json!({
                "type": "response.output_item.added",
                "sequence_number": 1,
                "output_index": 0,
                "item": {
                    "type": "message",
                    "id": "msg_1",
                    "role": "assistant",
                    "status": "in_progress",
                    "content": []
                }
            })
        ),
        format!(
            "data: {}",
            json!({
                "type": "response.output_text.delta",
                "sequence_number": 2,
                "item_id": "msg_1",
                "output_index": 0,
                "content_index": 0,
                "delta": "Hel"
            })
        ),
        format!(
            "data: {}",
            json!({
                "type": "response.output_text.delta",
                "sequence_number": 3,
                "item_id": "msg_1",
                "output_index": 0,
                "content_index": 0,
                "delta": "lo"
            })
        ),
        format!(
            "data: {}",
            json!({
                "type": "response.output_text.done",
                "sequence_number": 4,
                "item_id": "msg_1",
                "output_index": 0,
                "content_index": 0,
                "text": "Hello"
            })
        ),
        format!("data: {completed}"),
        String::new(),
        "data: [DONE]".to_owned(),
    ];
    lines.join("\n")
}
