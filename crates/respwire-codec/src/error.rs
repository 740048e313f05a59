// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error kinds surfaced by the union codec.
//!
//! Every error is returned directly to the immediate caller. Nothing here is
//! retried or silently repaired; the only local recovery in the codec is the
//! normalization path, which reports through [`crate::Diagnostic`] instead.

use thiserror::Error;

/// Errors produced while decoding or encoding union documents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// The object had no `type` member and the union has no default tag.
    #[error("{union}: missing discriminator `type`")]
    MissingDiscriminator {
        /// Union being decoded.
        union: &'static str,
    },
    /// The `type` member named a tag the union does not register.
    #[error("{union}: unsupported variant `{tag}`")]
    UnsupportedVariant {
        /// Union being decoded.
        union: &'static str,
        /// Tag found on the wire.
        tag: String,
    },
    /// More than one variant was populated at once.
    ///
    /// Reachable only at the untyped boundary: multi-slot construction or a
    /// wire object carrying key sets that belong to sibling variants.
    #[error("{union}: mutually exclusive variants set together: {}", tags.join(", "))]
    MultipleVariantsSet {
        /// Union being decoded or encoded.
        union: &'static str,
        /// Tags of every variant found populated (sorted).
        tags: Vec<String>,
    },
    /// No variant was populated where the context requires one.
    #[error("{union}: required union is empty")]
    EmptyRequiredUnion {
        /// Union being encoded or decoded.
        union: &'static str,
    },
    /// A variant's own embedded `type` disagrees with the dispatch tag.
    #[error("{union}: embedded type `{found}` does not match dispatch tag `{expected}`")]
    TypeTagMismatch {
        /// Union being decoded or encoded.
        union: &'static str,
        /// Tag used for dispatch.
        expected: String,
        /// Tag embedded in the variant payload.
        found: String,
    },
    /// A stream event that must be sequenced carried no `sequence_number`.
    #[error("{union}: event `{tag}` has no sequence_number")]
    MissingSequence {
        /// Union of the event.
        union: &'static str,
        /// Tag of the event.
        tag: String,
    },
    /// The document was not well-formed for the expected shape.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Fieldless view of [`WireError`] for mapping at the transport boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireErrorKind {
    /// See [`WireError::MissingDiscriminator`].
    MissingDiscriminator,
    /// See [`WireError::UnsupportedVariant`].
    UnsupportedVariant,
    /// See [`WireError::MultipleVariantsSet`].
    MultipleVariantsSet,
    /// See [`WireError::EmptyRequiredUnion`].
    EmptyRequiredUnion,
    /// See [`WireError::TypeTagMismatch`].
    TypeTagMismatch,
    /// See [`WireError::MissingSequence`].
    MissingSequence,
    /// See [`WireError::MalformedPayload`].
    MalformedPayload,
}

impl WireError {
    /// Returns the fieldless kind of this error.
    pub fn kind(&self) -> WireErrorKind {
        match self {
            Self::MissingDiscriminator { .. } => WireErrorKind::MissingDiscriminator,
            Self::UnsupportedVariant { .. } => WireErrorKind::UnsupportedVariant,
            Self::MultipleVariantsSet { .. } => WireErrorKind::MultipleVariantsSet,
            Self::EmptyRequiredUnion { .. } => WireErrorKind::EmptyRequiredUnion,
            Self::TypeTagMismatch { .. } => WireErrorKind::TypeTagMismatch,
            Self::MissingSequence { .. } => WireErrorKind::MissingSequence,
            Self::MalformedPayload(_) => WireErrorKind::MalformedPayload,
        }
    }

    pub(crate) fn malformed(err: impl std::fmt::Display) -> Self {
        Self::MalformedPayload(err.to_string())
    }
}

impl From<serde_json::Error> for WireError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err)
    }
}

/// Errors returned when registering variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Attempted to register two variants under the same tag.
    #[error("{union}: duplicate variant registration for tag `{tag}`")]
    DuplicateTag {
        /// Union owning the registry.
        union: &'static str,
        /// Tag registered twice.
        tag: &'static str,
    },
    /// The declared default tag is not registered.
    #[error("{union}: default tag `{tag}` is not registered")]
    UnknownDefault {
        /// Union owning the registry.
        union: &'static str,
        /// Declared default tag.
        tag: &'static str,
    },
}
