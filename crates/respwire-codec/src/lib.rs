// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! respwire-codec: discriminated-union codec core.
//!
//! Wire documents are JSON objects whose `type` member selects one payload
//! shape out of a closed set. This crate owns the machinery shared by every
//! such union: the tag registry, the oneof container, shape-discriminated
//! fields, per-union legacy normalization, and passthrough of unknown keys.
//! Concrete schemas live in `respwire-schema`.
#![forbid(unsafe_code)]

mod codec;
pub mod config;
mod error;
mod extension;
mod ids;
mod macros;
mod normalize;
mod registry;
mod resolver;
mod scope;
mod union;

/// Scoped decode/encode entry points.
pub use codec::{Decoded, WireCodec};
/// Configuration model and storage port.
pub use config::{CodecConfig, ConfigError, ConfigService, ConfigStore};
/// Error kinds.
pub use error::{RegistryError, WireError, WireErrorKind};
/// Unknown-key passthrough.
pub use extension::{Extensible, Extensions};
/// Identifier sources used by normalization.
pub use ids::{global_id_source, install_global_id_source, IdSource, IdSourceKind, RandomIds, SequentialIds, RANDOM_ID_BYTES};
/// Legacy-shape normalization.
pub use normalize::{apply_rules, Diagnostic, NormalizationRule, RuleContext};
/// Explicit alternatives inside a decode scope.
pub use scope::attempt;
/// Tag registry.
pub use registry::{DecodeFn, VariantEntry, VariantRegistry, VariantSpec};
/// Shape-discriminated fields.
pub use resolver::{ModeOrObject, TextOrList, TextOrListSlots, WireKind};
/// Union container.
pub use union::{
    de_error, decode_union, decode_variant, deserialize_union, encode_union, peek_tag, serialize_union, Emptiness, Oneof,
    OneofSlots, TaggedUnion, DISCRIMINATOR, ser_error,
};

#[doc(hidden)]
pub mod __private {
    pub use serde;
    pub use serde_json;
}
