// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]
//! Black-box tests for the `respwire` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use respwire_dry_tests::fixtures::{sse_transcript, INPUT_TEXT, LEGACY_ASSISTANT_OUTPUT};
use serde_json::Value;

fn respwire(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("respwire").unwrap();
    cmd.arg("--config-dir").arg(config_dir);
    cmd
}

fn sequential_config() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("codec.json"), r#"{"id_source":"sequential"}"#).unwrap();
    dir
}

#[test]
fn decodes_content_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let output = respwire(dir.path())
        .args(["decode", "--kind", "content", "-"])
        .write_stdin(INPUT_TEXT)
        .assert()
        .success()
        .stderr(predicate::str::contains("diagnostic").not())
        .get_output()
        .stdout
        .clone();
    let printed: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(printed, serde_json::from_str::<Value>(INPUT_TEXT).unwrap());
}

#[test]
fn legacy_message_is_repaired_with_configured_ids() {
    let dir = sequential_config();
    let input = dir.path().join("legacy.json");
    fs::write(&input, LEGACY_ASSISTANT_OUTPUT).unwrap();

    respwire(dir.path())
        .args(["decode", "--kind", "input-item"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""id": "msg_000001""#))
        .stdout(predicate::str::contains(r#""status": "completed""#))
        .stderr(predicate::str::contains(r#""rule":"legacy_output_message""#));
}

#[test]
fn stream_prints_one_line_per_event() {
    let dir = tempfile::tempdir().unwrap();
    let output = respwire(dir.path())
        .arg("stream")
        .write_stdin(sse_transcript())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(
        lines,
        [
            "0\tresponse.created",
            "1\tresponse.output_item.added",
            "2\tresponse.output_text.delta",
            "3\tresponse.output_text.delta",
            "4\tresponse.output_text.done",
            "5\tresponse.completed",
        ]
    );
}

#[test]
fn unknown_event_fails_with_union_and_tag() {
    let dir = tempfile::tempdir().unwrap();
    respwire(dir.path())
        .arg("stream")
        .write_stdin("data: {\"type\":\"response.teleported\",\"sequence_number\":1}\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 1"))
        .stderr(predicate::str::contains("response.teleported"));
}

#[test]
fn config_prints_defaults_and_writes_on_request() {
    let dir = tempfile::tempdir().unwrap();
    respwire(dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""normalize_legacy_shapes": true"#));
    assert!(!dir.path().join("codec.json").exists());

    respwire(dir.path()).args(["config", "--write"]).assert().success();
    let written: Value = serde_json::from_slice(&fs::read(dir.path().join("codec.json")).unwrap()).unwrap();
    assert_eq!(written["id_source"], "random");
}
