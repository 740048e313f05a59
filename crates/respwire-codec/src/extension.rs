// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Extension-field passthrough for keys the named schema does not claim.
//!
//! Records embed an [`Extensions`] map as a `#[serde(flatten)]` field. On decode
//! serde hands it exactly the top-level keys no named field consumed, with
//! their raw values. On encode the map is merged back in.
//!
//! Convention: the `extensions` field is declared **first** in every record.
//! Serde serializes fields in declaration order, so named fields are written
//! after the extension entries and overwrite any colliding key once the record
//! lands in a [`serde_json::Value`]. All codec encode paths go through `Value`
//! (see [`crate::WireCodec::encode`]), so a hostile or malformed extension key
//! can never replace schema-known data. Manual assembly uses
//! [`Extensions::merge_into`], which applies the same rule explicitly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unordered map of unclaimed top-level keys to their raw wire values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extensions(BTreeMap<String, Value>);

impl Extensions {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when no extension keys are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of extension keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Iterates over `(key, raw value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Extension keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Moves every key of `object` not listed in `claimed` into a new map.
    ///
    /// Used by hand-written decoders that consume named keys themselves.
    pub fn take_unclaimed(object: &mut Map<String, Value>, claimed: &[&str]) -> Self {
        let leftovers: Vec<String> = object
            .keys()
            .filter(|key| !claimed.contains(&key.as_str()))
            .cloned()
            .collect();
        let mut out = Self::new();
        for key in leftovers {
            if let Some(value) = object.remove(&key) {
                out.0.insert(key, value);
            }
        }
        out
    }

    /// Merges entries into `target`, skipping keys already present there.
    ///
    /// Returns the keys that were skipped because a named field owns them.
    pub fn merge_into(&self, target: &mut Map<String, Value>) -> Vec<&str> {
        let mut shadowed = Vec::new();
        for (key, value) in &self.0 {
            if target.contains_key(key) {
                shadowed.push(key.as_str());
                continue;
            }
            target.insert(key.clone(), value.clone());
        }
        shadowed
    }
}

impl FromIterator<(String, Value)> for Extensions {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Extensions {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Records that carry an [`Extensions`] side-channel.
pub trait Extensible {
    /// Unclaimed keys captured at decode.
    fn extensions(&self) -> &Extensions;
    /// Mutable access for callers attaching their own passthrough keys.
    fn extensions_mut(&mut self) -> &mut Extensions;
}

/// Implements [`Extensible`] for records whose passthrough field is named
/// `extensions`.
#[macro_export]
macro_rules! impl_extensible {
    ($($record:ty),+ $(,)?) => {
        $(
            impl $crate::Extensible for $record {
                fn extensions(&self) -> &$crate::Extensions {
                    &self.extensions
                }

                fn extensions_mut(&mut self) -> &mut $crate::Extensions {
                    &mut self.extensions
                }
            }
        )+
    };
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(flatten)]
        extensions: Extensions,
        text: String,
    }

    impl_extensible!(Sample);

    #[test]
    fn unclaimed_keys_are_captured_verbatim() {
        let raw = json!({ "text": "hi", "x_trace": { "span": [1, 2] }, "beta": null });
        let sample: Sample = serde_json::from_value(raw).unwrap();
        assert_eq!(sample.text, "hi");
        assert_eq!(sample.extensions().len(), 2);
        assert_eq!(sample.extensions().get("x_trace"), Some(&json!({ "span": [1, 2] })));
        assert_eq!(sample.extensions().get("beta"), Some(&Value::Null));
        assert!(!sample.extensions().contains_key("text"));
    }

    #[test]
    fn named_fields_win_over_colliding_extensions() {
        let mut sample = Sample {
            extensions: Extensions::new(),
            text: "schema".into(),
        };
        sample.extensions_mut().insert("text", json!("hostile"));
        sample.extensions_mut().insert("extra", json!(1));
        let value = serde_json::to_value(&sample).unwrap();
        assert_eq!(value, json!({ "text": "schema", "extra": 1 }));
    }

    #[test]
    fn merge_into_skips_named_keys() {
        let mut target = Map::new();
        target.insert("text".into(), json!("schema"));
        let ext: Extensions = [("text".to_string(), json!("x")), ("y".to_string(), json!(2))]
            .into_iter()
            .collect();
        let shadowed = ext.merge_into(&mut target);
        assert_eq!(shadowed, ["text"]);
        assert_eq!(Value::Object(target), json!({ "text": "schema", "y": 2 }));
    }

    #[test]
    fn take_unclaimed_leaves_claimed_keys() {
        let Value::Object(mut object) = json!({ "a": 1, "b": 2, "c": 3 }) else {
            unreachable!()
        };
        let ext = Extensions::take_unclaimed(&mut object, &["a"]);
        assert_eq!(object.len(), 1);
        assert_eq!(ext.keys().cloned().collect::<Vec<_>>(), ["b", "c"]);
    }
}
