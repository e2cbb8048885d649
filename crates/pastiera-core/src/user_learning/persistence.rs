use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ngram::{BigramTable, TrigramTable};
use crate::store::{KeyValueStore, StoreError};

use super::UserLearningStore;

pub const BIGRAMS_KEY: &str = "user_learning.bigrams";
pub const TRIGRAMS_KEY: &str = "user_learning.trigrams";

/// Blobs written by this build carry `{"version": 1, "table": ...}`.
/// A bare nested map is the unversioned legacy layout (version 0).
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("malformed {key}: {source}")]
    Malformed {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported {key} version: {version}")]
    UnsupportedVersion { key: &'static str, version: u32 },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct VersionedOut<'a, T> {
    version: u32,
    table: &'a T,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Blob<T> {
    Versioned { version: u32, table: T },
    Legacy(T),
}

/// Serialized tables, detached from the store so they can be written
/// without holding a lock on the learning data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedTables {
    pub bigrams: String,
    pub trigrams: String,
}

impl EncodedTables {
    pub fn write_to(&self, store: &mut dyn KeyValueStore) -> Result<(), PersistError> {
        store.put_string(BIGRAMS_KEY, &self.bigrams)?;
        store.put_string(TRIGRAMS_KEY, &self.trigrams)?;
        Ok(())
    }
}

fn encode<T: Serialize>(table: &T) -> Result<String, PersistError> {
    Ok(serde_json::to_string(&VersionedOut {
        version: FORMAT_VERSION,
        table,
    })?)
}

fn decode<T: DeserializeOwned>(key: &'static str, raw: &str) -> Result<T, PersistError> {
    let blob: Blob<T> =
        serde_json::from_str(raw).map_err(|source| PersistError::Malformed { key, source })?;
    match blob {
        Blob::Versioned { version, table } if version == FORMAT_VERSION => Ok(table),
        Blob::Versioned { version, .. } => Err(PersistError::UnsupportedVersion { key, version }),
        Blob::Legacy(table) => {
            debug!(key, "migrating legacy user-learning blob");
            Ok(table)
        }
    }
}

fn read_table<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &'static str,
) -> Result<Option<T>, PersistError> {
    match store.get_string(key)? {
        Some(raw) => decode(key, &raw).map(Some),
        None => Ok(None),
    }
}

impl UserLearningStore {
    pub fn encode(&self) -> Result<EncodedTables, PersistError> {
        Ok(EncodedTables {
            bigrams: encode(&self.bigrams)?,
            trigrams: encode(&self.trigrams)?,
        })
    }

    pub fn try_persist(&self, store: &mut dyn KeyValueStore) -> Result<(), PersistError> {
        self.encode()?.write_to(store)
    }

    /// Replace each table whose blob is present and valid. A missing blob
    /// leaves its table as is; the first failure aborts before anything is
    /// replaced.
    pub fn try_load(&mut self, store: &dyn KeyValueStore) -> Result<(), PersistError> {
        let bigrams: Option<BigramTable> = read_table(store, BIGRAMS_KEY)?;
        let trigrams: Option<TrigramTable> = read_table(store, TRIGRAMS_KEY)?;
        if let Some(table) = bigrams {
            self.bigrams = table;
        }
        if let Some(table) = trigrams {
            self.trigrams = table;
        }
        Ok(())
    }

    /// Best effort: failures are logged and otherwise ignored.
    pub fn persist(&self, store: &mut dyn KeyValueStore) {
        if let Err(e) = self.try_persist(store) {
            warn!("failed to persist user learning: {e}");
        }
    }

    /// Best effort: on failure the in-memory tables are left untouched.
    pub fn load(&mut self, store: &dyn KeyValueStore) {
        match self.try_load(store) {
            Ok(()) => debug!(
                bigrams = self.bigram_count(),
                trigrams = self.trigram_count(),
                "user learning loaded"
            ),
            Err(e) => warn!("failed to load user learning: {e}"),
        }
    }

    /// Forget everything, in memory and in `store`.
    pub fn clear(&mut self, store: &mut dyn KeyValueStore) {
        self.bigrams.clear();
        self.trigrams.clear();
        for key in [BIGRAMS_KEY, TRIGRAMS_KEY] {
            if let Err(e) = store.remove(key) {
                warn!(key, "failed to remove user learning: {e}");
            }
        }
    }
}
