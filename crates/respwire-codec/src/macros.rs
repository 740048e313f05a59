// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Declarative union generation.

/// Declares a tag-dispatched union.
///
/// Generates the enum, a `TAGS` constant, a lazily built
/// [`VariantRegistry`](crate::VariantRegistry), the
/// [`TaggedUnion`](crate::TaggedUnion) impl, and serde impls routed through the
/// union container.
///
/// Per variant, `keys [..]` declares its top-level keys for the exclusivity
/// check and `embeds field` names the payload field that repeats the tag.
/// After the body, `default = "tag";` sets the absent-`type` fallback and
/// `rules = &[..];` attaches normalization rules.
///
/// ```
/// use respwire_codec::{wire_union, Extensions};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// pub struct Note {
///     #[serde(flatten)]
///     pub extensions: Extensions,
///     pub text: String,
/// }
///
/// wire_union! {
///     /// Example union.
///     #[derive(Debug, Clone, PartialEq)]
///     pub enum Part: "Part" {
///         /// A note.
///         "note" => Note(Note) keys ["text"],
///     }
///     default = "note";
/// }
///
/// let part: Part = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
/// assert_eq!(Part::TAGS, ["note"]);
/// assert!(matches!(part, Part::Note(_)));
/// ```
#[macro_export]
macro_rules! wire_union {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $wire:literal {
            $(
                $(#[$vmeta:meta])*
                $tag:literal => $variant:ident($payload:ty)
                    $( keys [$($key:literal),* $(,)?] )?
                    $( embeds $field:ident )?
            ),+ $(,)?
        }
        $( default = $default:literal; )?
        $( rules = $rules:expr; )?
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant($payload),
            )+
        }

        impl $name {
            /// Every wire tag of this union, in declaration order.
            pub const TAGS: &'static [&'static str] = &[$($tag),+];
        }

        impl $crate::TaggedUnion for $name {
            const NAME: &'static str = $wire;

            fn registry() -> &'static $crate::VariantRegistry<Self> {
                static REGISTRY: ::std::sync::OnceLock<$crate::VariantRegistry<$name>> =
                    ::std::sync::OnceLock::new();
                REGISTRY.get_or_init(|| {
                    let mut registry = $crate::VariantRegistry::new($wire);
                    $(
                        let spec = $crate::__wire_embedding!(
                            $crate::VariantSpec::new($tag, stringify!($payload))
                                $( .with_keys(&[$($key),*]) )?
                            $(, $field)?
                        );
                        if let Err(err) = registry.register::<$payload>(spec, $name::$variant) {
                            registry.note_conflict(err);
                        }
                    )+
                    $(
                        if let Err(err) = registry.set_default_tag($default) {
                            registry.note_conflict(err);
                        }
                    )?
                    registry
                })
            }

            fn tag(&self) -> &'static str {
                match self {
                    $( Self::$variant(_) => $tag, )+
                }
            }

            fn encode_payload(&self) -> ::core::result::Result<$crate::__private::serde_json::Value, $crate::WireError> {
                match self {
                    $(
                        Self::$variant(payload) => {
                            $crate::__private::serde_json::to_value(payload).map_err($crate::WireError::from)
                        }
                    )+
                }
            }

            fn embedded_tag(&self) -> ::core::option::Option<&str> {
                match self {
                    $( Self::$variant(payload) => $crate::__wire_embedded!(payload $(, $field)?), )+
                }
            }

            $(
                fn normalization_rules() -> &'static [&'static dyn $crate::NormalizationRule] {
                    $rules
                }
            )?
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                $crate::serialize_union(self, serializer)
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                $crate::deserialize_union(deserializer)
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __wire_embedded {
    ($payload:ident) => {{
        let _ = $payload;
        ::core::option::Option::None
    }};
    ($payload:ident, $field:ident) => {
        ::core::option::Option::Some($payload.$field.as_str())
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __wire_embedding {
    ($spec:expr) => {
        $spec
    };
    ($spec:expr, $field:ident) => {
        $spec.embedding()
    };
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use crate::{Extensions, TaggedUnion, WireError};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Circle {
        #[serde(flatten)]
        extensions: Extensions,
        radius: f64,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Square {
        #[serde(flatten)]
        extensions: Extensions,
        #[serde(rename = "type")]
        kind: String,
        side: f64,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Empty {
        #[serde(flatten)]
        extensions: Extensions,
    }

    crate::wire_union! {
        #[derive(Debug, Clone, PartialEq)]
        enum Shape: "Shape" {
            "circle" => Circle(Circle) keys ["radius"],
            "square" => Square(Square) keys ["side"] embeds kind,
            "square_legacy" => LegacySquare(Square) embeds kind,
            "point" => Point(Empty) keys [],
        }
    }

    #[test]
    fn generated_registry_is_complete() {
        let registry = Shape::registry();
        assert!(registry.conflicts().is_empty());
        assert_eq!(registry.len(), Shape::TAGS.len());
        assert_eq!(registry.default_tag(), None);
        assert!(registry.get("square").unwrap().embeds_tag());
        assert!(!registry.get("circle").unwrap().embeds_tag());
    }

    #[test]
    fn generated_serde_round_trips() {
        let raw = json!({ "type": "circle", "radius": 2.0, "x_vendor": "kept" });
        let shape: Shape = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(shape.tag(), "circle");
        assert_eq!(serde_json::to_value(&shape).unwrap(), raw);
    }

    #[test]
    fn same_payload_under_two_tags_keeps_its_own_tag() {
        let shape: Shape = serde_json::from_value(json!({ "type": "square_legacy", "side": 1.0 })).unwrap();
        let Shape::LegacySquare(square) = &shape else {
            panic!("wrong variant: {shape:?}");
        };
        assert_eq!(square.kind, "square_legacy");
        assert_eq!(shape.embedded_tag(), Some("square_legacy"));
    }

    #[test]
    fn payload_less_variant_rejects_sibling_keys() {
        let point: Shape = serde_json::from_value(json!({ "type": "point" })).unwrap();
        assert_eq!(serde_json::to_value(&point).unwrap(), json!({ "type": "point" }));

        let err = crate::decode_variant::<Shape>(json!({ "type": "point", "radius": 1.0 })).unwrap_err();
        assert_eq!(
            err,
            WireError::MultipleVariantsSet {
                union: "Shape",
                tags: vec!["circle".into(), "point".into()]
            }
        );
    }

    #[test]
    fn missing_type_without_default_is_rejected() {
        let err = crate::decode_variant::<Shape>(json!({ "radius": 1.0 })).unwrap_err();
        assert_eq!(err, WireError::MissingDiscriminator { union: "Shape" });
    }
}
