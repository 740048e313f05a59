// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Deterministic identifier sources for tests.

use respwire_codec::{CodecConfig, IdSource, IdSourceKind, WireCodec};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Identifier source that hands out scripted suffixes and records every
/// prefix it was asked for.
///
/// Once the script runs out it falls back to `{prefix}_fallback{n}`.
#[derive(Debug, Default)]
pub struct ScriptedIds {
    state: Mutex<ScriptState>,
}

#[derive(Debug, Default)]
struct ScriptState {
    script: VecDeque<String>,
    requests: Vec<String>,
}

impl ScriptedIds {
    /// Source that returns `{prefix}_{suffix}` for each suffix in order.
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            state: Mutex::new(ScriptState {
                script: suffixes.into_iter().map(Into::into).collect(),
                requests: Vec::new(),
            }),
        }
    }

    /// Prefixes requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).requests.clone()
    }
}

impl IdSource for ScriptedIds {
    fn next_id(&self, prefix: &str) -> String {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.requests.push(prefix.to_owned());
        match state.script.pop_front() {
            Some(suffix) => format!("{prefix}_{suffix}"),
            None => format!("{prefix}_fallback{}", state.requests.len()),
        }
    }
}

/// Codec with normalization on and a fresh sequential id counter
/// (`msg_000001` first).
pub fn deterministic_codec() -> WireCodec {
    WireCodec::new(CodecConfig {
        id_source: IdSourceKind::Sequential,
        ..CodecConfig::default()
    })
}

/// Codec drawing ids from `ids`.
pub fn codec_with_ids(ids: Arc<dyn IdSource>) -> WireCodec {
    WireCodec::default().with_id_source(ids)
}
