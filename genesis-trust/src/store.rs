//! Persisted certificate pins.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tempfile::Builder;
use tracing::{debug, info, warn};

use crate::endpoint::StableId;
use crate::error::TrustStoreError;
use crate::fingerprint::Fingerprint;

/// On-disk format version written by [`FileTrustStore`].
pub const TRUST_STORE_VERSION: u32 = 1;

/// One confirmed pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustRecord {
    pub stable_id: StableId,
    pub fingerprint: Fingerprint,
}

/// Mapping from endpoint stable id to its confirmed certificate fingerprint.
pub trait TrustStore: Send + Sync {
    /// The pin for `stable_id`, if one is stored and non-blank.
    fn fingerprint(&self, stable_id: &StableId) -> Result<Option<Fingerprint>, TrustStoreError>;

    /// Record a confirmed pin, replacing any previous one.
    fn pin(&self, stable_id: &StableId, fingerprint: &Fingerprint) -> Result<(), TrustStoreError>;

    /// Remove a pin. Returns whether one existed.
    fn forget(&self, stable_id: &StableId) -> Result<bool, TrustStoreError>;

    /// All pins, ordered by stable id.
    fn records(&self) -> Result<Vec<TrustRecord>, TrustStoreError>;
}

impl<T: TrustStore + ?Sized> TrustStore for &T {
    fn fingerprint(&self, stable_id: &StableId) -> Result<Option<Fingerprint>, TrustStoreError> {
        (**self).fingerprint(stable_id)
    }

    fn pin(&self, stable_id: &StableId, fingerprint: &Fingerprint) -> Result<(), TrustStoreError> {
        (**self).pin(stable_id, fingerprint)
    }

    fn forget(&self, stable_id: &StableId) -> Result<bool, TrustStoreError> {
        (**self).forget(stable_id)
    }

    fn records(&self) -> Result<Vec<TrustRecord>, TrustStoreError> {
        (**self).records()
    }
}

impl<T: TrustStore + ?Sized> TrustStore for Arc<T> {
    fn fingerprint(&self, stable_id: &StableId) -> Result<Option<Fingerprint>, TrustStoreError> {
        (**self).fingerprint(stable_id)
    }

    fn pin(&self, stable_id: &StableId, fingerprint: &Fingerprint) -> Result<(), TrustStoreError> {
        (**self).pin(stable_id, fingerprint)
    }

    fn forget(&self, stable_id: &StableId) -> Result<bool, TrustStoreError> {
        (**self).forget(stable_id)
    }

    fn records(&self) -> Result<Vec<TrustRecord>, TrustStoreError> {
        (**self).records()
    }
}

/// In-memory store, for tests and embedders that persist pins elsewhere.
#[derive(Debug, Default)]
pub struct MemoryTrustStore {
    pins: RwLock<BTreeMap<StableId, Fingerprint>>,
}

impl MemoryTrustStore {
    pub fn with_records(records: impl IntoIterator<Item = TrustRecord>) -> Self {
        let pins = records
            .into_iter()
            .map(|record| (record.stable_id, record.fingerprint))
            .collect();
        Self {
            pins: RwLock::new(pins),
        }
    }
}

impl TrustStore for MemoryTrustStore {
    fn fingerprint(&self, stable_id: &StableId) -> Result<Option<Fingerprint>, TrustStoreError> {
        Ok(self.pins.read().get(stable_id).cloned())
    }

    fn pin(&self, stable_id: &StableId, fingerprint: &Fingerprint) -> Result<(), TrustStoreError> {
        self.pins
            .write()
            .insert(stable_id.clone(), fingerprint.clone());
        Ok(())
    }

    fn forget(&self, stable_id: &StableId) -> Result<bool, TrustStoreError> {
        Ok(self.pins.write().remove(stable_id).is_some())
    }

    fn records(&self) -> Result<Vec<TrustRecord>, TrustStoreError> {
        Ok(self
            .pins
            .read()
            .iter()
            .map(|(stable_id, fingerprint)| TrustRecord {
                stable_id: stable_id.clone(),
                fingerprint: fingerprint.clone(),
            })
            .collect())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TrustDocument {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    pins: BTreeMap<String, String>,
}

fn default_version() -> u32 {
    TRUST_STORE_VERSION
}

impl Default for TrustDocument {
    fn default() -> Self {
        Self {
            version: TRUST_STORE_VERSION,
            pins: BTreeMap::new(),
        }
    }
}

/// JSON-file backed store.
///
/// Every lookup reads the file so pins confirmed by another process are seen
/// immediately. Writes replace the file atomically through a temporary file
/// in the same directory, under an advisory lock on `<path>.lock` held for
/// the whole load-modify-persist cycle.
#[derive(Debug)]
pub struct FileTrustStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTrustStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<TrustDocument, TrustStoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "trust store not found; starting empty");
                return Ok(TrustDocument::default());
            }
            Err(source) => {
                return Err(TrustStoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let document: TrustDocument =
            serde_json::from_str(&content).map_err(|source| TrustStoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        if document.version > TRUST_STORE_VERSION {
            return Err(TrustStoreError::UnsupportedVersion {
                path: self.path.clone(),
                found: document.version,
            });
        }
        Ok(document)
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Exclusive lock shared with other processes. Released when the
    /// returned file is dropped.
    fn lock_for_write(&self) -> Result<File, TrustStoreError> {
        let lock_path = self.lock_path();
        let lock_error = |source: std::io::Error| TrustStoreError::Lock {
            path: lock_path.clone(),
            source,
        };
        fs::create_dir_all(self.parent_dir()).map_err(lock_error)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(lock_error)?;
        FileExt::lock_exclusive(&file).map_err(lock_error)?;
        Ok(file)
    }

    fn write_atomic(&self, document: &TrustDocument) -> Result<(), TrustStoreError> {
        let write_error = |source: std::io::Error| TrustStoreError::Write {
            path: self.path.clone(),
            source,
        };
        let parent = self.parent_dir();
        fs::create_dir_all(&parent).map_err(write_error)?;

        let contents = serde_json::to_vec_pretty(document).map_err(TrustStoreError::Encode)?;
        let mut temp_file = Builder::new()
            .prefix(".tls-pins")
            .tempfile_in(&parent)
            .map_err(write_error)?;
        temp_file.write_all(&contents).map_err(write_error)?;
        temp_file.as_file_mut().sync_all().map_err(write_error)?;
        temp_file
            .persist(&self.path)
            .map_err(|error| write_error(error.error))?;
        Ok(())
    }

    fn update<R>(
        &self,
        apply: impl FnOnce(&mut TrustDocument) -> R,
    ) -> Result<R, TrustStoreError> {
        let _guard = self.write_lock.lock();
        let _file_lock = self.lock_for_write()?;
        let mut document = self.load()?;
        let result = apply(&mut document);
        document.version = TRUST_STORE_VERSION;
        self.write_atomic(&document)?;
        Ok(result)
    }
}

impl TrustStore for FileTrustStore {
    fn fingerprint(&self, stable_id: &StableId) -> Result<Option<Fingerprint>, TrustStoreError> {
        let document = self.load()?;
        Ok(document
            .pins
            .get(stable_id.as_str())
            .and_then(Fingerprint::new))
    }

    fn pin(&self, stable_id: &StableId, fingerprint: &Fingerprint) -> Result<(), TrustStoreError> {
        self.update(|document| {
            document
                .pins
                .insert(stable_id.to_string(), fingerprint.as_str().to_owned());
        })?;
        info!(stable_id = %stable_id, fingerprint = %fingerprint, "pinned gateway certificate");
        Ok(())
    }

    fn forget(&self, stable_id: &StableId) -> Result<bool, TrustStoreError> {
        let removed = self.update(|document| document.pins.remove(stable_id.as_str()).is_some())?;
        if removed {
            info!(stable_id = %stable_id, "removed gateway certificate pin");
        }
        Ok(removed)
    }

    fn records(&self) -> Result<Vec<TrustRecord>, TrustStoreError> {
        let document = self.load()?;
        let mut records = Vec::with_capacity(document.pins.len());
        for (raw_id, raw_fingerprint) in document.pins {
            let Some(fingerprint) = Fingerprint::new(&raw_fingerprint) else {
                continue;
            };
            match StableId::parse(raw_id) {
                Ok(stable_id) => records.push(TrustRecord {
                    stable_id,
                    fingerprint,
                }),
                Err(error) => warn!(%error, "skipping trust record with malformed stable id"),
            }
        }
        Ok(records)
    }
}

/// Import `stableId → fingerprint` pairs kept by an older settings format.
///
/// Blank fingerprints, malformed ids, and ids that already carry a pin are
/// skipped. Returns the number of pins written.
pub fn migrate_legacy_pins<S, I>(store: &S, legacy: I) -> Result<usize, TrustStoreError>
where
    S: TrustStore + ?Sized,
    I: IntoIterator<Item = (String, String)>,
{
    let mut imported = 0;
    for (raw_id, raw_fingerprint) in legacy {
        let Some(fingerprint) = Fingerprint::new(&raw_fingerprint) else {
            continue;
        };
        let stable_id = match StableId::parse(raw_id) {
            Ok(stable_id) => stable_id,
            Err(error) => {
                warn!(%error, "skipping legacy pin with malformed stable id");
                continue;
            }
        };
        if store.fingerprint(&stable_id)?.is_some() {
            continue;
        }
        store.pin(&stable_id, &fingerprint)?;
        imported += 1;
    }
    if imported > 0 {
        info!(imported, "migrated legacy gateway certificate pins");
    }
    Ok(imported)
}
