// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Compatibility layer for unions whose producers omit discriminators or use
//! legacy shapes.
//!
//! A [`NormalizationRule`] is an explicit per-union policy: a predicate over the
//! raw object plus a rewrite into the canonical shape. Rules run before the
//! ordinary dispatch in [`crate::union`], never inside it, so each one can be
//! audited (and disabled through [`crate::CodecConfig`]) on its own.
//!
//! Contract for implementors:
//! - `rewrite` must be idempotent: applied to its own output it changes nothing
//!   and returns `None`.
//! - A rewrite that changes the object returns exactly one [`Diagnostic`].

use serde::Serialize;
use serde_json::{Map, Value};

use crate::ids::IdSource;

/// Informational report of an anomaly the codec repaired locally.
///
/// Diagnostics are data returned with the decode result, not errors; the
/// caller decides whether to surface or suppress them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Name of the rule that fired.
    pub rule: &'static str,
    /// Union the rule is scoped to.
    pub union: &'static str,
    /// Human readable description of the anomaly.
    pub message: String,
    /// Canonical fields the rule had to synthesize.
    pub synthesized: Vec<&'static str>,
}

/// Inputs available to a rule while rewriting.
pub struct RuleContext<'a> {
    union: &'static str,
    ids: &'a dyn IdSource,
}

impl<'a> RuleContext<'a> {
    /// Creates a context for rules scoped to `union`.
    pub fn new(union: &'static str, ids: &'a dyn IdSource) -> Self {
        Self { union, ids }
    }

    /// Union the running rule belongs to.
    pub fn union(&self) -> &'static str {
        self.union
    }

    /// Draws a fresh identifier from the active id source.
    pub fn fresh_id(&self, prefix: &str) -> String {
        self.ids.next_id(prefix)
    }
}

/// One legacy-shape rewrite scoped to a single union.
pub trait NormalizationRule: Send + Sync {
    /// Stable rule name, echoed in [`Diagnostic::rule`].
    fn name(&self) -> &'static str;

    /// Returns `true` when the raw object is in scope for this rule.
    fn applies(&self, object: &Map<String, Value>) -> bool;

    /// Rewrites `object` into canonical form.
    ///
    /// Returns `None` when the object was already canonical.
    fn rewrite(&self, object: &mut Map<String, Value>, ctx: &RuleContext<'_>) -> Option<Diagnostic>;
}

/// Runs `rules` in order over `object`, collecting one diagnostic per rewrite.
pub fn apply_rules(
    rules: &[&dyn NormalizationRule],
    object: &mut Map<String, Value>,
    ctx: &RuleContext<'_>,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for rule in rules {
        if !rule.applies(object) {
            continue;
        }
        if let Some(diagnostic) = rule.rewrite(object, ctx) {
            tracing::debug!(
                union = ctx.union(),
                rule = rule.name(),
                synthesized = ?diagnostic.synthesized,
                "normalized legacy shape"
            );
            diagnostics.push(diagnostic);
        }
    }
    diagnostics
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use serde_json::json;

    struct DefaultKind;

    impl NormalizationRule for DefaultKind {
        fn name(&self) -> &'static str {
            "default_kind"
        }

        fn applies(&self, object: &Map<String, Value>) -> bool {
            object.contains_key("legacy")
        }

        fn rewrite(&self, object: &mut Map<String, Value>, ctx: &RuleContext<'_>) -> Option<Diagnostic> {
            if object.contains_key("id") {
                return None;
            }
            object.insert("id".into(), Value::String(ctx.fresh_id("obj")));
            Some(Diagnostic {
                rule: self.name(),
                union: ctx.union(),
                message: "legacy object without id".into(),
                synthesized: vec!["id"],
            })
        }
    }

    #[test]
    fn rewrite_fires_once_and_is_idempotent() {
        let ids = SequentialIds::default();
        let ctx = RuleContext::new("Sample", &ids);
        let rules: [&dyn NormalizationRule; 1] = [&DefaultKind];

        let Value::Object(mut object) = json!({ "legacy": true }) else {
            unreachable!()
        };
        let first = apply_rules(&rules, &mut object, &ctx);
        assert_eq!(first.len(), 1);
        assert_eq!(object["id"], json!("obj_000001"));

        let snapshot = object.clone();
        let second = apply_rules(&rules, &mut object, &ctx);
        assert!(second.is_empty());
        assert_eq!(object, snapshot);
    }

    #[test]
    fn rules_out_of_scope_are_skipped() {
        let ids = SequentialIds::default();
        let ctx = RuleContext::new("Sample", &ids);
        let rules: [&dyn NormalizationRule; 1] = [&DefaultKind];
        let Value::Object(mut object) = json!({ "modern": true }) else {
            unreachable!()
        };
        assert!(apply_rules(&rules, &mut object, &ctx).is_empty());
        assert!(!object.contains_key("id"));
    }
}
