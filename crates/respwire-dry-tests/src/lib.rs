// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for respwire crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`ids`] - Scripted identifier source and deterministic codecs
//! - [`fixtures`] - Wire documents for the canonical decode scenarios

pub mod config;
pub mod fixtures;
pub mod ids;

// Re-export commonly used items at crate root for convenience
pub use config::InMemoryConfigStore;
pub use ids::{codec_with_ids, deterministic_codec, ScriptedIds};
