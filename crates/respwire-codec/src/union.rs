// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Union value container: tag dispatch, exclusivity and emptiness policy.
//!
//! Decode order for one union object:
//! 1. the union's normalization rules (if enabled for the call),
//! 2. discriminator lookup (falling back to the union's default tag),
//! 3. exclusivity check against sibling variants' declared key sets,
//! 4. variant payload decode,
//! 5. embedded-tag consistency check.
//!
//! Encode runs the same checks in reverse so a hand-built value can never
//! emit a document its own decoder would reject.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::WireError;
use crate::normalize::{apply_rules, NormalizationRule, RuleContext};
use crate::registry::VariantRegistry;
use crate::resolver::WireKind;
use crate::scope;

/// Name of the discriminator member on every union object.
pub const DISCRIMINATOR: &str = "type";

/// Whether the surrounding context tolerates an absent union value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emptiness {
    /// Absent is encoded as, and decoded from, wire `null`.
    #[default]
    Allowed,
    /// Absent is an [`WireError::EmptyRequiredUnion`].
    Required,
}

/// A closed sum type dispatched by its `type` member.
///
/// Usually implemented through [`crate::wire_union!`].
pub trait TaggedUnion: Sized + 'static {
    /// Union name used in errors and diagnostics.
    const NAME: &'static str;

    /// The union's registry.
    fn registry() -> &'static VariantRegistry<Self>;

    /// Wire tag of the active variant.
    fn tag(&self) -> &'static str;

    /// Encodes the active variant's payload (without the container-owned tag).
    fn encode_payload(&self) -> Result<Value, WireError>;

    /// Tag carried inside the payload, for variants that embed one.
    fn embedded_tag(&self) -> Option<&str> {
        None
    }

    /// Legacy-shape rules run before dispatch.
    fn normalization_rules() -> &'static [&'static dyn NormalizationRule] {
        &[]
    }
}

/// Decodes `value` as `U`, mapping wire `null` per `emptiness`.
///
/// # Errors
/// Any [`WireError`]; see the module docs for the order of checks.
pub fn decode_union<U: TaggedUnion>(value: Value, emptiness: Emptiness) -> Result<Oneof<U>, WireError> {
    match value {
        Value::Null => match emptiness {
            Emptiness::Allowed => Ok(Oneof::empty()),
            Emptiness::Required => Err(WireError::EmptyRequiredUnion { union: U::NAME }),
        },
        other => decode_variant(other).map(Oneof::of),
    }
}

/// Decodes a value that must hold exactly one variant.
///
/// # Errors
/// [`WireError::EmptyRequiredUnion`] on `null`, otherwise as [`decode_union`].
pub fn decode_variant<U: TaggedUnion>(value: Value) -> Result<U, WireError> {
    let mut object = match value {
        Value::Object(object) => object,
        Value::Null => return Err(WireError::EmptyRequiredUnion { union: U::NAME }),
        other => {
            return Err(WireError::MalformedPayload(format!(
                "{}: expected object, found {}",
                U::NAME,
                WireKind::of(&other)
            )))
        }
    };
    normalize::<U>(&mut object);

    let registry = U::registry();
    let tag = match object.get(DISCRIMINATOR) {
        Some(Value::String(tag)) => tag.clone(),
        Some(other) => {
            return Err(WireError::MalformedPayload(format!(
                "{}: `type` must be a string, found {}",
                U::NAME,
                WireKind::of(other)
            )))
        }
        None => match registry.default_tag() {
            Some(tag) => tag.to_owned(),
            None => return Err(WireError::MissingDiscriminator { union: U::NAME }),
        },
    };
    let Some(entry) = registry.get(&tag) else {
        return Err(WireError::UnsupportedVariant { union: U::NAME, tag });
    };
    tracing::trace!(union = U::NAME, tag = entry.tag(), variant = entry.type_name(), "dispatch");
    registry.check_exclusive(entry, &object)?;

    if entry.embeds_tag() {
        object
            .entry(DISCRIMINATOR)
            .or_insert_with(|| Value::String(tag.clone()));
    } else {
        object.remove(DISCRIMINATOR);
    }
    let decoded = entry.decode(object)?;
    if let Some(found) = decoded.embedded_tag() {
        if found != tag {
            return Err(WireError::TypeTagMismatch {
                union: U::NAME,
                expected: tag,
                found: found.to_owned(),
            });
        }
    }
    Ok(decoded)
}

/// Encodes one variant with its discriminator.
///
/// # Errors
/// [`WireError::TypeTagMismatch`] when an embedded tag disagrees with the
/// variant, [`WireError::MultipleVariantsSet`] when the payload populates a
/// sibling's keys, [`WireError::MalformedPayload`] for non-object payloads.
pub fn encode_union<U: TaggedUnion>(value: &U) -> Result<Value, WireError> {
    let tag = value.tag();
    let registry = U::registry();
    let Some(entry) = registry.get(tag) else {
        return Err(WireError::UnsupportedVariant {
            union: U::NAME,
            tag: tag.to_owned(),
        });
    };
    let mut object = match value.encode_payload()? {
        Value::Object(object) => object,
        other => {
            return Err(WireError::MalformedPayload(format!(
                "{}: variant `{tag}` encoded as {}",
                U::NAME,
                WireKind::of(&other)
            )))
        }
    };
    if entry.embeds_tag() {
        match object.get(DISCRIMINATOR) {
            Some(Value::String(found)) if found != tag => {
                return Err(WireError::TypeTagMismatch {
                    union: U::NAME,
                    expected: tag.to_owned(),
                    found: found.clone(),
                })
            }
            Some(Value::String(_)) => {}
            _ => {
                object.insert(DISCRIMINATOR.to_owned(), Value::String(tag.to_owned()));
            }
        }
    } else {
        object.insert(DISCRIMINATOR.to_owned(), Value::String(tag.to_owned()));
    }
    registry.check_exclusive(entry, &object)?;
    Ok(Value::Object(object))
}

fn normalize<U: TaggedUnion>(object: &mut Map<String, Value>) {
    let rules = U::normalization_rules();
    if rules.is_empty() || !scope::normalization_enabled() {
        return;
    }
    let ids = scope::id_source();
    let ctx = RuleContext::new(U::NAME, ids.as_ref());
    for diagnostic in apply_rules(rules, object, &ctx) {
        scope::report(diagnostic);
    }
}

/// Reads the top-level `type` member without building a document tree.
///
/// Returns `Ok(None)` when the object has no discriminator.
///
/// # Errors
/// [`WireError::MalformedPayload`] if `bytes` is not a JSON object or `type`
/// is not a string.
pub fn peek_tag(bytes: &[u8]) -> Result<Option<String>, WireError> {
    #[derive(Deserialize)]
    struct TagPeek<'a> {
        #[serde(rename = "type", borrow, default)]
        tag: Option<Cow<'a, str>>,
    }
    let peek: TagPeek<'_> = serde_json::from_slice(bytes)?;
    Ok(peek.tag.map(Cow::into_owned))
}

/// Serializes a union through [`encode_union`], for `Serialize` impls.
pub fn serialize_union<U, S>(value: &U, serializer: S) -> Result<S::Ok, S::Error>
where
    U: TaggedUnion,
    S: Serializer,
{
    match encode_union(value) {
        Ok(encoded) => encoded.serialize(serializer),
        Err(err) => Err(ser_error(err)),
    }
}

/// Deserializes a required union through [`decode_variant`], for
/// `Deserialize` impls.
pub fn deserialize_union<'de, U, D>(deserializer: D) -> Result<U, D::Error>
where
    U: TaggedUnion,
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    decode_variant(value).map_err(de_error)
}

/// Converts a typed error into a serde deserialize error, keeping the typed
/// form in the active scope so the entry point can return it.
pub fn de_error<E: serde::de::Error>(err: WireError) -> E {
    scope::stash_error(&err);
    E::custom(err)
}

/// Serialize-side counterpart of [`de_error`].
pub fn ser_error<E: serde::ser::Error>(err: WireError) -> E {
    scope::stash_error(&err);
    E::custom(err)
}

/// Zero-or-one union holder.
///
/// Mutation is wipe-and-set only: there is no mutable access to the active
/// variant's payload through the holder.
#[derive(Clone, PartialEq)]
pub struct Oneof<U> {
    active: Option<U>,
}

impl<U> Default for Oneof<U> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<U: fmt::Debug> fmt::Debug for Oneof<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Oneof").field(&self.active).finish()
    }
}

impl<U: TaggedUnion> Oneof<U> {
    /// Holder with no active variant.
    pub fn empty() -> Self {
        Self { active: None }
    }

    /// Holder with `value` active.
    pub fn of(value: U) -> Self {
        Self { active: Some(value) }
    }

    /// Replaces the active variant, returning the previous one.
    pub fn set(&mut self, value: U) -> Option<U> {
        self.active.replace(value)
    }

    /// Clears the holder, returning the previous variant.
    pub fn clear(&mut self) -> Option<U> {
        self.active.take()
    }

    /// Moves the active variant out.
    pub fn take(&mut self) -> Option<U> {
        self.clear()
    }

    /// Active variant.
    pub fn get(&self) -> Option<&U> {
        self.active.as_ref()
    }

    /// Returns `true` when nothing is active.
    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }

    /// Tag of the active variant.
    pub fn tag(&self) -> Option<&'static str> {
        self.active.as_ref().map(TaggedUnion::tag)
    }

    /// Consumes the holder.
    pub fn into_inner(self) -> Option<U> {
        self.active
    }

    /// Encodes the holder, mapping emptiness per `emptiness`.
    ///
    /// # Errors
    /// [`WireError::EmptyRequiredUnion`] for an empty required value, or any
    /// error from [`encode_union`].
    pub fn encode(&self, emptiness: Emptiness) -> Result<Value, WireError> {
        match (&self.active, emptiness) {
            (Some(value), _) => encode_union(value),
            (None, Emptiness::Allowed) => Ok(Value::Null),
            (None, Emptiness::Required) => Err(WireError::EmptyRequiredUnion { union: U::NAME }),
        }
    }
}

impl<U: TaggedUnion> From<U> for Oneof<U> {
    fn from(value: U) -> Self {
        Self::of(value)
    }
}

impl<U: TaggedUnion> Serialize for Oneof<U> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.active {
            Some(value) => serialize_union(value, serializer),
            None => serializer.serialize_unit(),
        }
    }
}

impl<'de, U: TaggedUnion> Deserialize<'de> for Oneof<U> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        decode_union(value, Emptiness::Allowed).map_err(de_error)
    }
}

/// Untyped multi-slot construction surface, one slot per tag.
///
/// Mirrors producers that model a oneof as several optional fields. Nothing
/// stops a caller from filling two slots; [`OneofSlots::encode`] and
/// [`OneofSlots::into_oneof`] count them and reject the result.
pub struct OneofSlots<U> {
    slots: Vec<U>,
}

impl<U> Default for OneofSlots<U> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<U: fmt::Debug> fmt::Debug for OneofSlots<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.slots).finish()
    }
}

impl<U: TaggedUnion> OneofSlots<U> {
    /// Creates an empty slot set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills the slot for `value`'s tag, returning what that slot held.
    pub fn fill(&mut self, value: U) -> Option<U> {
        let tag = value.tag();
        match self.slots.iter().position(|slot| slot.tag() == tag) {
            Some(index) => Some(std::mem::replace(&mut self.slots[index], value)),
            None => {
                self.slots.push(value);
                None
            }
        }
    }

    /// Empties the slot for `tag`.
    pub fn clear(&mut self, tag: &str) -> Option<U> {
        let index = self.slots.iter().position(|slot| slot.tag() == tag)?;
        Some(self.slots.remove(index))
    }

    /// Tags of the populated slots, sorted.
    pub fn populated(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.slots.iter().map(TaggedUnion::tag).collect();
        tags.sort_unstable();
        tags
    }

    /// Number of populated slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` when no slot is populated.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Collapses the slots into a strict holder.
    ///
    /// # Errors
    /// [`WireError::MultipleVariantsSet`] when two or more slots are populated,
    /// [`WireError::EmptyRequiredUnion`] when none is and `emptiness` requires one.
    pub fn into_oneof(mut self, emptiness: Emptiness) -> Result<Oneof<U>, WireError> {
        match self.slots.len() {
            0 => match emptiness {
                Emptiness::Allowed => Ok(Oneof::empty()),
                Emptiness::Required => Err(WireError::EmptyRequiredUnion { union: U::NAME }),
            },
            1 => Ok(Oneof { active: self.slots.pop() }),
            _ => Err(self.conflict()),
        }
    }

    /// Encodes the slots after counting them.
    ///
    /// # Errors
    /// As [`Self::into_oneof`], plus any error from [`encode_union`].
    pub fn encode(&self, emptiness: Emptiness) -> Result<Value, WireError> {
        match self.slots.as_slice() {
            [] => match emptiness {
                Emptiness::Allowed => Ok(Value::Null),
                Emptiness::Required => Err(WireError::EmptyRequiredUnion { union: U::NAME }),
            },
            [only] => encode_union(only),
            _ => Err(self.conflict()),
        }
    }

    fn conflict(&self) -> WireError {
        WireError::MultipleVariantsSet {
            union: U::NAME,
            tags: self.populated().into_iter().map(str::to_owned).collect(),
        }
    }
}
