// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-call decode/encode scope.
//!
//! Union values nested inside ordinary records are decoded through serde, whose
//! error channel only carries strings and has no slot for side data. The scope
//! is the explicit channel that the top-level entry point opens for one call:
//! it supplies the id source and normalization switch, collects diagnostics,
//! and keeps the first typed [`WireError`] so it reaches the caller intact.
//!
//! Scopes are thread-local and nest; a union decoded with no open scope still
//! works, using the global id source and discarding diagnostics.

use std::cell::RefCell;
use std::sync::Arc;

use crate::error::WireError;
use crate::ids::{global_id_source, IdSource};
use crate::normalize::Diagnostic;

struct Frame {
    ids: Arc<dyn IdSource>,
    normalize: bool,
    diagnostics: Vec<Diagnostic>,
    error: Option<WireError>,
}

thread_local! {
    static FRAMES: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Settings a scope is opened with.
#[derive(Clone)]
pub(crate) struct ScopeSettings {
    pub(crate) ids: Arc<dyn IdSource>,
    pub(crate) normalize: bool,
}

/// What a finished scope hands back to its entry point.
pub(crate) struct ScopeReport {
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) error: Option<WireError>,
}

/// Open scope; closes itself on drop if [`ScopeGuard::finish`] was not called.
pub(crate) struct ScopeGuard {
    depth: usize,
    finished: bool,
}

impl ScopeGuard {
    pub(crate) fn enter(settings: ScopeSettings) -> Self {
        let depth = FRAMES.with(|frames| {
            let mut frames = frames.borrow_mut();
            frames.push(Frame {
                ids: settings.ids,
                normalize: settings.normalize,
                diagnostics: Vec::new(),
                error: None,
            });
            frames.len()
        });
        Self {
            depth,
            finished: false,
        }
    }

    pub(crate) fn finish(mut self) -> ScopeReport {
        self.finished = true;
        let frame = pop_to(self.depth);
        frame.map_or_else(
            || ScopeReport {
                diagnostics: Vec::new(),
                error: None,
            },
            |frame| ScopeReport {
                diagnostics: frame.diagnostics,
                error: frame.error,
            },
        )
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        if !self.finished {
            let _discarded = pop_to(self.depth);
        }
    }
}

fn pop_to(depth: usize) -> Option<Frame> {
    FRAMES.with(|frames| {
        let mut frames = frames.borrow_mut();
        if frames.len() != depth {
            return None;
        }
        frames.pop()
    })
}

/// Records a diagnostic in the innermost scope (dropped when none is open).
pub(crate) fn report(diagnostic: Diagnostic) {
    let delivered = FRAMES.with(|frames| {
        frames.borrow_mut().last_mut().is_some_and(|frame| {
            frame.diagnostics.push(diagnostic);
            true
        })
    });
    if !delivered {
        tracing::trace!("diagnostic raised outside a decode scope was discarded");
    }
}

/// Keeps `err` as the scope's typed failure unless one is already recorded.
pub(crate) fn stash_error(err: &WireError) {
    FRAMES.with(|frames| {
        if let Some(frame) = frames.borrow_mut().last_mut() {
            if frame.error.is_none() {
                frame.error = Some(err.clone());
            }
        }
    });
}

/// Runs one alternative of a decode that may fall back to another shape.
///
/// A typed error stashed by `trial` is withdrawn when `trial` succeeds, so an
/// alternative that was tried and abandoned cannot be reported for a document
/// that decoded on another path.
pub fn attempt<R, E>(trial: impl FnOnce() -> Result<R, E>) -> Result<R, E> {
    let clean_before = FRAMES.with(|frames| frames.borrow().last().map(|frame| frame.error.is_none()));
    let outcome = trial();
    if outcome.is_ok() && clean_before == Some(true) {
        FRAMES.with(|frames| {
            if let Some(frame) = frames.borrow_mut().last_mut() {
                frame.error = None;
            }
        });
    }
    outcome
}

/// Id source of the innermost scope, or the process-wide one.
pub(crate) fn id_source() -> Arc<dyn IdSource> {
    FRAMES
        .with(|frames| frames.borrow().last().map(|frame| Arc::clone(&frame.ids)))
        .unwrap_or_else(global_id_source)
}

/// Whether legacy-shape normalization is enabled for the current call.
pub(crate) fn normalization_enabled() -> bool {
    FRAMES.with(|frames| frames.borrow().last().is_none_or(|frame| frame.normalize))
}
