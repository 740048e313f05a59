// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Discriminator registry: the closed mapping from wire tag to variant decoder.
//!
//! Each union owns one registry, built once and then read-only. Lookups are by
//! the literal `type` string found on the wire. Besides the decode routine an
//! entry records:
//! - whether the variant embeds its own `type` field (checked for consistency
//!   against the dispatch tag),
//! - optionally, the variant's top-level key set, which the container uses to
//!   reject objects that populate sibling variants at the same time.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{RegistryError, WireError};
use crate::union::DISCRIMINATOR;

/// Boxed decode routine turning a raw object into a union value.
pub type DecodeFn<U> = Box<dyn Fn(Map<String, Value>) -> Result<U, WireError> + Send + Sync>;

/// Static description of one variant, used at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSpec {
    /// Wire tag.
    pub tag: &'static str,
    /// Rust payload type name, for tooling and error context.
    pub type_name: &'static str,
    /// Known top-level keys of the variant, when the union enforces exclusivity.
    pub keys: Option<&'static [&'static str]>,
    /// Whether the payload carries its own copy of the tag.
    pub embeds_tag: bool,
}

impl VariantSpec {
    /// Spec for a variant with no key set and no embedded tag.
    pub const fn new(tag: &'static str, type_name: &'static str) -> Self {
        Self {
            tag,
            type_name,
            keys: None,
            embeds_tag: false,
        }
    }

    /// Declares the variant's top-level keys (without `type`).
    pub const fn with_keys(mut self, keys: &'static [&'static str]) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Marks the variant as carrying its own discriminator.
    pub const fn embedding(mut self) -> Self {
        self.embeds_tag = true;
        self
    }
}

/// Registered variant: spec plus decode routine.
pub struct VariantEntry<U> {
    spec: VariantSpec,
    decode: DecodeFn<U>,
}

impl<U> VariantEntry<U> {
    /// Wire tag of this variant.
    pub fn tag(&self) -> &'static str {
        self.spec.tag
    }

    /// Payload type name.
    pub fn type_name(&self) -> &'static str {
        self.spec.type_name
    }

    /// Declared key set, if the union enforces exclusivity.
    pub fn keys(&self) -> Option<&'static [&'static str]> {
        self.spec.keys
    }

    /// Returns `true` if the payload carries its own `type` field.
    pub fn embeds_tag(&self) -> bool {
        self.spec.embeds_tag
    }

    /// Runs the variant's decode routine over `object`.
    pub fn decode(&self, object: Map<String, Value>) -> Result<U, WireError> {
        (self.decode)(object)
    }
}

impl<U> fmt::Debug for VariantEntry<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantEntry").field("spec", &self.spec).finish_non_exhaustive()
    }
}

/// Closed tag → variant map for one union.
pub struct VariantRegistry<U> {
    union: &'static str,
    entries: BTreeMap<&'static str, VariantEntry<U>>,
    default_tag: Option<&'static str>,
    conflicts: Vec<RegistryError>,
}

impl<U: 'static> VariantRegistry<U> {
    /// Creates an empty registry for the union named `union`.
    pub fn new(union: &'static str) -> Self {
        Self {
            union,
            entries: BTreeMap::new(),
            default_tag: None,
            conflicts: Vec::new(),
        }
    }

    /// Registers a serde-decodable payload `V`, wrapped into the union by `wrap`.
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicateTag`] if the tag is already taken.
    pub fn register<V>(&mut self, spec: VariantSpec, wrap: fn(V) -> U) -> Result<(), RegistryError>
    where
        V: DeserializeOwned + 'static,
    {
        self.register_with(
            spec,
            Box::new(move |object| {
                serde_json::from_value::<V>(Value::Object(object))
                    .map(wrap)
                    .map_err(WireError::from)
            }),
        )
    }

    /// Registers a hand-written decode routine.
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicateTag`] if the tag is already taken.
    pub fn register_with(&mut self, spec: VariantSpec, decode: DecodeFn<U>) -> Result<(), RegistryError> {
        if self.entries.contains_key(spec.tag) {
            return Err(RegistryError::DuplicateTag {
                union: self.union,
                tag: spec.tag,
            });
        }
        self.entries.insert(spec.tag, VariantEntry { spec, decode });
        Ok(())
    }

    /// Declares the tag assumed when an object carries no `type`.
    ///
    /// # Errors
    /// Returns [`RegistryError::UnknownDefault`] if `tag` is not registered.
    pub fn set_default_tag(&mut self, tag: &'static str) -> Result<(), RegistryError> {
        if !self.entries.contains_key(tag) {
            return Err(RegistryError::UnknownDefault {
                union: self.union,
                tag,
            });
        }
        self.default_tag = Some(tag);
        Ok(())
    }

    /// Keeps a registration failure for later inspection.
    ///
    /// Statically declared registries are built inside `OnceLock` initializers
    /// where errors cannot propagate; they are recorded here and asserted empty
    /// by each union's tests.
    pub fn note_conflict(&mut self, err: RegistryError) {
        tracing::error!(%err, "variant registry conflict");
        self.conflicts.push(err);
    }

    /// Registration failures recorded by [`Self::note_conflict`].
    pub fn conflicts(&self) -> &[RegistryError] {
        &self.conflicts
    }

    /// Union name.
    pub fn union(&self) -> &'static str {
        self.union
    }

    /// Entry registered for `tag`.
    pub fn get(&self, tag: &str) -> Option<&VariantEntry<U>> {
        self.entries.get(tag)
    }

    /// Returns `true` if `tag` is registered.
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Default tag, if the union defines one.
    pub fn default_tag(&self) -> Option<&'static str> {
        self.default_tag
    }

    /// Registered tags in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// Number of registered variants.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Union of every declared variant key set.
    pub fn reserved_keys(&self) -> BTreeSet<&'static str> {
        self.entries
            .values()
            .filter_map(VariantEntry::keys)
            .flat_map(|keys| keys.iter().copied())
            .collect()
    }

    /// Rejects objects that populate keys owned only by sibling variants.
    ///
    /// A key conflicts when it is not part of `entry`'s declared key set but is
    /// declared by another variant. Variants without a declared key set are not
    /// checked.
    pub fn check_exclusive(&self, entry: &VariantEntry<U>, object: &Map<String, Value>) -> Result<(), WireError> {
        let Some(own) = entry.keys() else {
            return Ok(());
        };
        let mut clashing: BTreeSet<&'static str> = BTreeSet::new();
        for key in object.keys() {
            if key == DISCRIMINATOR || own.contains(&key.as_str()) {
                continue;
            }
            for other in self.entries.values() {
                if other.tag() == entry.tag() {
                    continue;
                }
                if other.keys().is_some_and(|keys| keys.contains(&key.as_str())) {
                    clashing.insert(other.tag());
                }
            }
        }
        if clashing.is_empty() {
            return Ok(());
        }
        clashing.insert(entry.tag());
        Err(WireError::MultipleVariantsSet {
            union: self.union,
            tags: clashing.into_iter().map(str::to_owned).collect(),
        })
    }
}

impl<U> fmt::Debug for VariantRegistry<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariantRegistry")
            .field("union", &self.union)
            .field("tags", &self.entries.keys().collect::<Vec<_>>())
            .field("default_tag", &self.default_tag)
            .finish_non_exhaustive()
    }
}
