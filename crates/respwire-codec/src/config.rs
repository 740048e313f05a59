// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Codec configuration and its storage port.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::ids::IdSourceKind;

/// Key under which [`CodecConfig`] is persisted.
pub const CODEC_CONFIG_KEY: &str = "codec";

/// Default ceiling on a single input document (32 MiB).
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 32 * 1024 * 1024;

/// Tunables for [`crate::WireCodec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Run per-union legacy-shape rules before dispatch.
    pub normalize_legacy_shapes: bool,
    /// Inputs larger than this fail before parsing.
    pub max_document_bytes: usize,
    /// Identifier source used when normalization synthesizes ids.
    pub id_source: IdSourceKind,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            normalize_legacy_shapes: true,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            id_source: IdSourceKind::Random,
        }
    }
}

/// Where codec settings live between runs, keyed by logical name.
///
/// Implementations map a missing key to [`ConfigError::NotFound`] so the
/// service can fall back to defaults.
pub trait ConfigStore {
    /// Raw stored bytes for `key`.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Replaces the stored bytes for `key`.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Failures while reading or writing codec settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Nothing stored under the key.
    #[error("not found")]
    NotFound,
    /// Store I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Stored bytes are not a valid settings document.
    #[error("invalid config document: {0}")]
    Serde(#[from] serde_json::Error),
    /// Store-specific failure, such as an unusable key.
    #[error("{0}")]
    Other(String),
}

/// JSON settings on top of a [`ConfigStore`].
#[derive(Debug)]
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Wraps `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the wrapped store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: ConfigStore> ConfigService<S> {
    /// Reads the document stored under `key`.
    ///
    /// A missing key and an empty blob both read as `Ok(None)`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        let bytes = match self.store.load_raw(key) {
            Err(ConfigError::NotFound) => return Ok(None),
            other => other?,
        };
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Writes `value` under `key` as pretty JSON.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ConfigError> {
        let document = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &document)?;
        tracing::debug!(key, bytes = document.len(), "saved config");
        Ok(())
    }

    /// Effective codec configuration: the stored one, or defaults when absent.
    pub fn codec_config(&self) -> Result<CodecConfig, ConfigError> {
        let config = self.load::<CodecConfig>(CODEC_CONFIG_KEY)?;
        tracing::debug!(stored = config.is_some(), "loaded codec config");
        Ok(config.unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapStore(RefCell<HashMap<String, Vec<u8>>>);

    impl ConfigStore for MapStore {
        fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
            self.0.borrow().get(key).cloned().ok_or(ConfigError::NotFound)
        }

        fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
            self.0.borrow_mut().insert(key.to_owned(), data.to_vec());
            Ok(())
        }
    }

    #[test]
    fn missing_config_yields_defaults() {
        let service = ConfigService::new(MapStore::default());
        assert_eq!(service.codec_config().unwrap(), CodecConfig::default());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let store = MapStore::default();
        store.save_raw(CODEC_CONFIG_KEY, br#"{"id_source":"sequential"}"#).unwrap();
        let config = ConfigService::new(store).codec_config().unwrap();
        assert_eq!(config.id_source, IdSourceKind::Sequential);
        assert!(config.normalize_legacy_shapes);
        assert_eq!(config.max_document_bytes, DEFAULT_MAX_DOCUMENT_BYTES);
    }

    #[test]
    fn saved_config_loads_back() {
        let service = ConfigService::new(MapStore::default());
        let config = CodecConfig {
            normalize_legacy_shapes: false,
            max_document_bytes: 1024,
            id_source: IdSourceKind::Sequential,
        };
        service.save(CODEC_CONFIG_KEY, &config).unwrap();
        assert_eq!(service.codec_config().unwrap(), config);
    }

    #[test]
    fn corrupt_config_is_a_serde_error() {
        let store = MapStore::default();
        store.save_raw(CODEC_CONFIG_KEY, b"{not json").unwrap();
        let err = ConfigService::new(store).codec_config().unwrap_err();
        assert!(matches!(err, ConfigError::Serde(_)));
    }
}
