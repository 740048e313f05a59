// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory config store fake for testing without filesystem I/O.

use respwire_codec::config::CODEC_CONFIG_KEY;
use respwire_codec::{CodecConfig, ConfigError, ConfigStore};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory implementation of [`ConfigStore`] for testing.
///
/// Clones share state, so a test can hand one clone to a
/// [`ConfigService`](respwire_codec::ConfigService) and inspect the other.
/// Load and save attempts are counted before any failure check.
///
/// # Example
///
/// ```
/// use respwire_codec::{CodecConfig, ConfigService};
/// use respwire_dry_tests::InMemoryConfigStore;
///
/// let store = InMemoryConfigStore::new();
/// let service = ConfigService::new(store.clone());
///
/// assert_eq!(service.codec_config().unwrap(), CodecConfig::default());
/// assert_eq!(store.load_count(), 1);
/// assert_eq!(store.save_count(), 0);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryConfigStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    blobs: BTreeMap<String, Vec<u8>>,
    load_count: usize,
    save_count: usize,
    fail_on_load: bool,
    fail_on_save: bool,
}

impl InMemoryConfigStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `config` under the codec key.
    pub fn with_codec_config(config: &CodecConfig) -> Result<Self, ConfigError> {
        let store = Self::new();
        store.insert(CODEC_CONFIG_KEY, serde_json::to_vec(config)?);
        Ok(store)
    }

    /// Place a raw blob without counting it as a save.
    pub fn insert(&self, key: &str, blob: impl Into<Vec<u8>>) {
        self.lock().blobs.insert(key.to_owned(), blob.into());
    }

    /// Make every subsequent load fail (or stop failing).
    pub fn set_fail_on_load(&self, fail: bool) {
        self.lock().fail_on_load = fail;
    }

    /// Make every subsequent save fail (or stop failing).
    pub fn set_fail_on_save(&self, fail: bool) {
        self.lock().fail_on_save = fail;
    }

    /// Load attempts so far.
    pub fn load_count(&self) -> usize {
        self.lock().load_count
    }

    /// Save attempts so far.
    pub fn save_count(&self) -> usize {
        self.lock().save_count
    }

    /// Stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.lock().blobs.keys().cloned().collect()
    }

    /// Raw blob stored under `key`, without counting a load.
    pub fn peek(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().blobs.get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let mut inner = self.lock();
        inner.load_count += 1;
        if inner.fail_on_load {
            return Err(ConfigError::Other("simulated load failure".into()));
        }
        inner.blobs.get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut inner = self.lock();
        inner.save_count += 1;
        if inner.fail_on_save {
            return Err(ConfigError::Other("simulated save failure".into()));
        }
        inner.blobs.insert(key.to_owned(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use respwire_codec::{ConfigService, IdSourceKind};

    #[test]
    fn preloaded_codec_config_is_effective() {
        let config = CodecConfig {
            id_source: IdSourceKind::Sequential,
            ..CodecConfig::default()
        };
        let store = InMemoryConfigStore::with_codec_config(&config).unwrap();
        let service = ConfigService::new(store.clone());
        assert_eq!(service.codec_config().unwrap(), config);
        assert_eq!(store.load_count(), 1);
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn clones_share_blobs_and_counters() {
        let a = InMemoryConfigStore::new();
        let b = a.clone();
        a.save_raw("codec", b"{}").unwrap();
        assert_eq!(b.load_raw("codec").unwrap(), b"{}");
        assert_eq!((a.save_count(), a.load_count()), (1, 1));
        assert_eq!(b.keys(), ["codec"]);
    }

    #[test]
    fn failures_are_counted_and_store_nothing() {
        let store = InMemoryConfigStore::new();
        store.set_fail_on_save(true);
        assert!(matches!(store.save_raw("codec", b"{}"), Err(ConfigError::Other(_))));
        assert_eq!(store.save_count(), 1);
        assert!(store.peek("codec").is_none());

        store.set_fail_on_load(true);
        let service = ConfigService::new(store.clone());
        assert!(matches!(service.codec_config(), Err(ConfigError::Other(_))));
        assert_eq!(store.load_count(), 1);
    }

    #[test]
    fn corrupt_blob_surfaces_serde_error() {
        let store = InMemoryConfigStore::new();
        store.insert(CODEC_CONFIG_KEY, b"{not json".to_vec());
        let service = ConfigService::new(store);
        assert!(matches!(service.codec_config(), Err(ConfigError::Serde(_))));
    }
}
