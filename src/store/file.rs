//! File-based store implementation.

use std::collections::BTreeMap;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{DynamicStore, ProviderError, StoredValue};

/// Current store file format version.
///
/// Increment this when making breaking changes to the format.
const STORE_FILE_VERSION: u32 = 1;

/// On-disk store file format.
///
/// Uses JSON for readability and debugging. Incompatible versions are
/// reported as [`ProviderError::Corrupted`] rather than migrated.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    /// Format version for future compatibility.
    version: u32,

    /// Unix timestamp when the file was saved.
    /// For debugging purposes only; not used in logic.
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_at: Option<String>,

    /// Records keyed by dot-path.
    #[serde(default)]
    records: BTreeMap<String, StoredValue>,
}

/// Returns the current Unix timestamp as a string.
fn unix_timestamp_now() -> String {
    use std::time::SystemTime;

    let duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();

    format!("{}", duration.as_secs())
}

/// JSON-file implementation of [`DynamicStore`].
///
/// Every mutation is a read-modify-write of the whole file, serialized by
/// an internal lock so concurrent writers in one process never lose
/// records.
///
/// # Atomic Writes
///
/// Uses write-to-temp-then-rename pattern to prevent corruption:
/// 1. Write to `{path}.tmp`
/// 2. Rename `{path}.tmp` to `{path}`
///
/// This ensures the file is either fully written or not written at all.
///
/// # Cancellation
///
/// A mutation runs on the blocking pool and owns the lock until the file
/// is renamed into place. Dropping the calling future does not stop it,
/// but any later mutation waits for it, so writes land in call order.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    /// Creates a store backed by the file at `path`.
    ///
    /// The file is created on first write; a missing file reads as empty.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the path to the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<StoreFile, ProviderError> {
        let content = tokio::fs::read_to_string(&self.path).await;
        decode(&self.path, content)
    }

    /// Applies `change` to the file contents and saves the result.
    ///
    /// `change` returns `false` when there is nothing to write.
    async fn mutate<F>(&self, change: F) -> Result<(), ProviderError>
    where
        F: FnOnce(&mut StoreFile) -> bool + Send + 'static,
    {
        let guard = Arc::clone(&self.write_lock).lock_owned().await;
        let path = self.path.clone();

        // Use spawn_blocking to avoid blocking the async runtime
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let mut file = decode(&path, std::fs::read_to_string(&path))?;
            if change(&mut file) {
                save_blocking(&path, file)
            } else {
                Ok(())
            }
        })
        .await
        .map_err(|e| ProviderError::Backend(Box::new(e)))?
    }
}

fn decode(path: &Path, content: io::Result<String>) -> Result<StoreFile, ProviderError> {
    let content = match content {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(StoreFile {
                version: STORE_FILE_VERSION,
                ..StoreFile::default()
            });
        }
        Err(e) => return Err(ProviderError::Io(e)),
    };

    let file: StoreFile = serde_json::from_str(&content).map_err(|e| ProviderError::Corrupted {
        reason: format!("Invalid JSON in '{}': {e}", path.display()),
    })?;

    if file.version != STORE_FILE_VERSION {
        return Err(ProviderError::Corrupted {
            reason: format!(
                "Incompatible version: expected {STORE_FILE_VERSION}, got {}",
                file.version
            ),
        });
    }
    Ok(file)
}

fn save_blocking(path: &Path, mut file: StoreFile) -> Result<(), ProviderError> {
    file.version = STORE_FILE_VERSION;
    file.saved_at = Some(unix_timestamp_now());
    let content = serde_json::to_string_pretty(&file).map_err(ProviderError::Serialize)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(ProviderError::Io)?;
        }
    }

    // Append .tmp instead of replacing extension to avoid conflicts
    // (e.g., dynamic.json -> dynamic.json.tmp, not dynamic.tmp)
    let temp_path = PathBuf::from(format!("{}.tmp", path.display()));

    std::fs::write(&temp_path, content).map_err(ProviderError::Io)?;
    std::fs::rename(&temp_path, path).map_err(ProviderError::Io)?;

    Ok(())
}

impl DynamicStore for FileStore {
    async fn get_one(&self, key: &str) -> Result<Option<StoredValue>, ProviderError> {
        Ok(self.read().await?.records.remove(key))
    }

    async fn set_one(&self, key: &str, value: &str) -> Result<(), ProviderError> {
        let key = key.to_string();
        let record = StoredValue::dynamic(value);
        self.mutate(move |file| {
            file.records.insert(key, record);
            true
        })
        .await
    }

    async fn list_all(&self) -> Result<BTreeMap<String, String>, ProviderError> {
        Ok(self
            .read()
            .await?
            .records
            .into_iter()
            .filter(|(_, record)| record.is_dynamic)
            .map(|(key, record)| (key, record.value))
            .collect())
    }

    async fn delete_one(&self, key: &str) -> Result<(), ProviderError> {
        let key = key.to_string();
        self.mutate(move |file| file.records.remove(&key).is_some())
            .await
    }
}
