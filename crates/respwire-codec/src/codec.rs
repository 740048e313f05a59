// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Top-level decode/encode entry points.
//!
//! Each call opens one scope, runs serde over the whole document, and returns
//! the value together with every diagnostic raised on the way. When a nested
//! union failed, the typed error recorded in the scope is returned in place of
//! serde's stringly error.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::CodecConfig;
use crate::error::WireError;
use crate::ids::{global_id_source, IdSource, IdSourceKind};
use crate::normalize::Diagnostic;
use crate::scope::{ScopeGuard, ScopeSettings};
use crate::union::{self, Emptiness, Oneof, TaggedUnion};

/// A decoded value plus the diagnostics its decode produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    /// The decoded value.
    pub value: T,
    /// Informational repairs applied during decode, in encounter order.
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Decoded<T> {
    /// Maps the value, keeping the diagnostics.
    pub fn map<V>(self, f: impl FnOnce(T) -> V) -> Decoded<V> {
        Decoded {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }

    /// Splits into value and diagnostics.
    pub fn into_parts(self) -> (T, Vec<Diagnostic>) {
        (self.value, self.diagnostics)
    }

    /// Returns `true` when decode repaired nothing.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Configured codec. Cheap to clone and safe to share across threads.
#[derive(Clone)]
pub struct WireCodec {
    config: CodecConfig,
    ids: Arc<dyn IdSource>,
}

impl fmt::Debug for WireCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireCodec").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Default for WireCodec {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl WireCodec {
    /// Builds a codec from `config`.
    ///
    /// `random` ids come from the process-wide source; `sequential` ids get a
    /// counter private to this codec.
    pub fn new(config: CodecConfig) -> Self {
        let ids = match config.id_source {
            IdSourceKind::Random => global_id_source(),
            kind @ IdSourceKind::Sequential => kind.build(),
        };
        Self { config, ids }
    }

    /// Replaces the identifier source.
    pub fn with_id_source(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = ids;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decodes a JSON document into `T`.
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<Decoded<T>, WireError> {
        self.ensure_within_limit(bytes.len())?;
        self.scoped(|| serde_json::from_slice::<T>(bytes))
    }

    /// Decodes a JSON string into `T`.
    pub fn decode_str<T: DeserializeOwned>(&self, text: &str) -> Result<Decoded<T>, WireError> {
        self.decode(text.as_bytes())
    }

    /// Decodes an already parsed value into `T`.
    pub fn decode_value<T: DeserializeOwned>(&self, value: Value) -> Result<Decoded<T>, WireError> {
        self.scoped(|| serde_json::from_value::<T>(value))
    }

    /// Decodes a top-level union, mapping `null` per `emptiness`.
    pub fn decode_union<U: TaggedUnion>(&self, bytes: &[u8], emptiness: Emptiness) -> Result<Decoded<Oneof<U>>, WireError> {
        self.ensure_within_limit(bytes.len())?;
        let value: Value = serde_json::from_slice(bytes)?;
        self.scoped(|| union::decode_union::<U>(value, emptiness))
    }

    /// Encodes `value` to compact JSON bytes.
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, WireError> {
        let tree = self.encode_value(value)?;
        Ok(serde_json::to_vec(&tree)?)
    }

    /// Encodes `value` to a JSON tree.
    ///
    /// Records are always encoded through a tree so named fields overwrite any
    /// colliding extension key.
    pub fn encode_value<T: Serialize>(&self, value: &T) -> Result<Value, WireError> {
        self.scoped(|| serde_json::to_value(value)).map(|decoded| decoded.value)
    }

    /// Rejects documents larger than `max_document_bytes`.
    ///
    /// # Errors
    /// [`WireError::MalformedPayload`] naming the limit.
    pub fn ensure_within_limit(&self, len: usize) -> Result<(), WireError> {
        if len > self.config.max_document_bytes {
            return Err(WireError::MalformedPayload(format!(
                "document of {len} bytes exceeds the {} byte limit",
                self.config.max_document_bytes
            )));
        }
        Ok(())
    }

    fn scoped<R, E>(&self, run: impl FnOnce() -> Result<R, E>) -> Result<Decoded<R>, WireError>
    where
        E: Into<WireError> + fmt::Display,
    {
        let guard = ScopeGuard::enter(ScopeSettings {
            ids: Arc::clone(&self.ids),
            normalize: self.config.normalize_legacy_shapes,
        });
        let outcome = run();
        let report = guard.finish();
        match outcome {
            Ok(value) => Ok(Decoded {
                value,
                diagnostics: report.diagnostics,
            }),
            Err(err) => {
                // The stashed error only stands for `err` when it is on the
                // failing path, i.e. serde's message still carries it.
                let err = match report.error {
                    Some(typed) if err.to_string().contains(&typed.to_string()) => typed,
                    _ => err.into(),
                };
                tracing::debug!(%err, "wire codec call failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Plain {
        text: String,
    }

    crate::wire_union! {
        #[derive(Debug, PartialEq)]
        enum Part: "Part" {
            "plain" => Plain(Plain) keys ["text"],
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Envelope {
        parts: Vec<Part>,
    }

    #[test]
    fn nested_union_errors_surface_typed() {
        let codec = WireCodec::default();
        let err = codec
            .decode::<Envelope>(br#"{"parts":[{"type":"plain","text":"a"},{"type":"nope"}]}"#)
            .unwrap_err();
        assert_eq!(
            err,
            WireError::UnsupportedVariant {
                union: "Part",
                tag: "nope".into()
            }
        );
    }

    /// Accepts a `Part`, or keeps anything else as raw JSON.
    #[derive(Debug, PartialEq)]
    enum Lenient {
        Part(Part),
        Raw(Value),
    }

    impl<'de> Deserialize<'de> for Lenient {
        fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let value = Value::deserialize(deserializer)?;
            match crate::attempt(|| Part::deserialize(value.clone())) {
                Ok(part) => Ok(Self::Part(part)),
                Err(_) => Ok(Self::Raw(value)),
            }
        }
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Fallbacks {
        first: Lenient,
        count: u32,
    }

    #[test]
    fn abandoned_alternative_does_not_mask_later_errors() {
        let codec = WireCodec::default();
        let ok = codec
            .decode::<Fallbacks>(br#"{"first":{"type":"nope"},"count":1}"#)
            .unwrap();
        assert_eq!(ok.value.first, Lenient::Raw(json!({ "type": "nope" })));

        let err = codec
            .decode::<Fallbacks>(br#"{"first":{"type":"nope"},"count":"x"}"#)
            .unwrap_err();
        assert_eq!(err.kind(), crate::WireErrorKind::MalformedPayload);
        assert!(err.to_string().contains("invalid type"), "{err}");
    }

    #[test]
    fn fallback_without_attempt_is_still_not_reported() {
        // A bare `or_else` fallback stashes, but the stash is off the failing path.
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Bare {
            #[serde(deserialize_with = "bare_part")]
            first: Option<Part>,
            count: u32,
        }
        fn bare_part<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Option<Part>, D::Error> {
            let value = Value::deserialize(deserializer)?;
            Ok(Part::deserialize(value).ok())
        }
        let err = WireCodec::default()
            .decode::<Bare>(br#"{"first":{"type":"nope"},"count":"x"}"#)
            .unwrap_err();
        assert_eq!(err.kind(), crate::WireErrorKind::MalformedPayload);
    }

    #[test]
    fn syntax_errors_are_malformed() {
        let err = WireCodec::default().decode::<Envelope>(b"{\"parts\":").unwrap_err();
        assert_eq!(err.kind(), crate::WireErrorKind::MalformedPayload);
    }

    #[test]
    fn oversized_documents_fail_before_parsing() {
        let codec = WireCodec::new(CodecConfig {
            max_document_bytes: 8,
            ..CodecConfig::default()
        });
        let err = codec.decode::<Envelope>(br#"{"parts":[]}"#).unwrap_err();
        assert!(matches!(err, WireError::MalformedPayload(msg) if msg.contains("limit")));
    }

    #[test]
    fn top_level_union_honours_emptiness() {
        let codec = WireCodec::default();
        let empty = codec.decode_union::<Part>(b"null", Emptiness::Allowed).unwrap();
        assert!(empty.value.is_empty());
        assert!(codec.decode_union::<Part>(b"null", Emptiness::Required).is_err());
        let full = codec
            .decode_union::<Part>(br#"{"type":"plain","text":"x"}"#, Emptiness::Required)
            .unwrap();
        assert_eq!(full.value.tag(), Some("plain"));
    }

    #[test]
    fn encode_round_trips_through_bytes() {
        let codec = WireCodec::default().with_id_source(Arc::new(SequentialIds::default()));
        let envelope = Envelope {
            parts: vec![Part::Plain(Plain { text: "hi".into() })],
        };
        let bytes = codec.encode(&envelope).unwrap();
        let back = codec.decode::<Envelope>(&bytes).unwrap();
        assert!(back.is_clean());
        assert_eq!(back.value, envelope);
        assert_eq!(
            codec.encode_value(&envelope).unwrap(),
            json!({ "parts": [{ "type": "plain", "text": "hi" }] })
        );
    }
}
