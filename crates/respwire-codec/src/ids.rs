// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Process-wide identifier source used when normalization synthesizes ids.
//!
//! The source is the only shared mutable state touched by decode, so every
//! implementation must be safe under concurrent access.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Random bytes per generated identifier (48 hex characters).
pub const RANDOM_ID_BYTES: usize = 24;

/// Generator of fresh, unique identifiers.
pub trait IdSource: Send + Sync {
    /// Returns a new identifier of the form `{prefix}_{suffix}`.
    fn next_id(&self, prefix: &str) -> String;
}

/// Identifiers drawn from the thread-local RNG (`msg_<48 hex>`).
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&self, prefix: &str) -> String {
        let mut bytes = [0u8; RANDOM_ID_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        format!("{prefix}_{}", hex::encode(bytes))
    }
}

/// Monotonic counter identifiers (`msg_000001`, `msg_000002`, ...).
///
/// Reproducible across runs; intended for tooling and tests.
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    /// Creates a counter whose first identifier uses `start`.
    pub const fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}_{n:06}")
    }
}

/// Configurable choice of identifier source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdSourceKind {
    /// [`RandomIds`].
    #[default]
    Random,
    /// [`SequentialIds`] starting at 1.
    Sequential,
}

impl IdSourceKind {
    /// Builds a fresh source of this kind.
    pub fn build(self) -> Arc<dyn IdSource> {
        match self {
            Self::Random => Arc::new(RandomIds),
            Self::Sequential => Arc::new(SequentialIds::default()),
        }
    }
}

impl fmt::Display for IdSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => f.write_str("random"),
            Self::Sequential => f.write_str("sequential"),
        }
    }
}

static GLOBAL_IDS: OnceLock<Arc<dyn IdSource>> = OnceLock::new();

/// Install the process-wide identifier source.
///
/// Uses `OnceLock` internally, so the first successful call wins in concurrent
/// scenarios. Returns the rejected source if one was already installed (or the
/// default was already materialized by a decode).
pub fn install_global_id_source(source: Arc<dyn IdSource>) -> Result<(), Arc<dyn IdSource>> {
    GLOBAL_IDS.set(source)
}

/// Returns the process-wide identifier source, defaulting to [`RandomIds`].
pub fn global_id_source() -> Arc<dyn IdSource> {
    Arc::clone(GLOBAL_IDS.get_or_init(|| Arc::new(RandomIds)))
}
