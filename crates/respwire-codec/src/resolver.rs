// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fields whose wire shape is the discriminator.
//!
//! A field that is "a string or a list of parts" carries no tag; the JSON kind
//! of the raw value decides. The kind is inspected up front so no decode is
//! attempted speculatively.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::WireError;
use crate::union::{de_error, decode_variant, serialize_union, TaggedUnion};

/// Syntactic kind of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireKind {
    /// `null`
    Null,
    /// `true` / `false`
    Bool,
    /// Any number.
    Number,
    /// A string.
    String,
    /// An array.
    Array,
    /// An object.
    Object,
}

impl WireKind {
    /// Classifies `value`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

impl fmt::Display for WireKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        })
    }
}

/// Text, or a list of structured elements.
#[derive(Debug, Clone, PartialEq)]
pub enum TextOrList<T> {
    /// Scalar form.
    Text(String),
    /// Collection form.
    List(Vec<T>),
}

impl<T> TextOrList<T> {
    /// Text form, if this is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::List(_) => None,
        }
    }

    /// List form, if this is one.
    pub fn as_list(&self) -> Option<&[T]> {
        match self {
            Self::Text(_) => None,
            Self::List(items) => Some(items),
        }
    }

    /// Kind this value encodes as.
    pub fn wire_kind(&self) -> WireKind {
        match self {
            Self::Text(_) => WireKind::String,
            Self::List(_) => WireKind::Array,
        }
    }
}

impl<T: DeserializeOwned> TextOrList<T> {
    /// Decodes by inspecting the kind of `value`.
    ///
    /// # Errors
    /// [`WireError::MalformedPayload`] for kinds other than string and array,
    /// or the first element's decode error.
    pub fn from_value(value: Value) -> Result<Self, WireError> {
        match value {
            Value::String(text) => Ok(Self::Text(text)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| serde_json::from_value(item).map_err(WireError::from))
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            other => Err(WireError::MalformedPayload(format!(
                "expected string or array, found {}",
                WireKind::of(&other)
            ))),
        }
    }
}

impl<T> From<String> for TextOrList<T> {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl<T> From<&str> for TextOrList<T> {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl<T> From<Vec<T>> for TextOrList<T> {
    fn from(items: Vec<T>) -> Self {
        Self::List(items)
    }
}

impl<T: Serialize> Serialize for TextOrList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(text) => serializer.serialize_str(text),
            Self::List(items) => items.serialize(serializer),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for TextOrList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(de_error)
    }
}

/// Non-strict builder carrying both representations.
///
/// Resolving keeps the text when both are set; the list is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct TextOrListSlots<T> {
    /// Scalar slot.
    pub text: Option<String>,
    /// Collection slot.
    pub list: Option<Vec<T>>,
}

impl<T> Default for TextOrListSlots<T> {
    fn default() -> Self {
        Self { text: None, list: None }
    }
}

impl<T> TextOrListSlots<T> {
    /// Collapses the slots; text takes precedence.
    pub fn resolve(self) -> Option<TextOrList<T>> {
        match (self.text, self.list) {
            (Some(text), _) => Some(TextOrList::Text(text)),
            (None, Some(list)) => Some(TextOrList::List(list)),
            (None, None) => None,
        }
    }
}

impl<T: Serialize> Serialize for TextOrListSlots<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match (&self.text, &self.list) {
            (Some(text), _) => serializer.serialize_str(text),
            (None, Some(list)) => list.serialize(serializer),
            (None, None) => serializer.serialize_unit(),
        }
    }
}

/// A plain string mode, or a tagged union object.
///
/// Used by tool choice: `"auto"` or `{"type":"function","name":…}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ModeOrObject<M, U> {
    /// String form.
    Mode(M),
    /// Object form.
    Object(U),
}

impl<M, U> Serialize for ModeOrObject<M, U>
where
    M: Serialize,
    U: TaggedUnion,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Mode(mode) => mode.serialize(serializer),
            Self::Object(object) => serialize_union(object, serializer),
        }
    }
}

impl<'de, M, U> Deserialize<'de> for ModeOrObject<M, U>
where
    M: DeserializeOwned,
    U: TaggedUnion,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match value {
            mode @ Value::String(_) => serde_json::from_value(mode)
                .map(Self::Mode)
                .map_err(|err| de_error(WireError::from(err))),
            object @ Value::Object(_) => decode_variant(object).map(Self::Object).map_err(de_error),
            other => Err(de_error(WireError::MalformedPayload(format!(
                "expected mode string or object, found {}",
                WireKind::of(&other)
            )))),
        }
    }
}
