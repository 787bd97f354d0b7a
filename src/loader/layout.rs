//! Configuration directory layout (layers 2 to 4).

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::defaults;

use super::LoadError;

/// Location of the base file, domain files and drop-in directory.
///
/// ```text
/// config/
/// ├── default.toml        layer 2 (base)
/// ├── database.toml       layer 3 (domain files, filename order)
/// ├── server.toml
/// └── conf.d/             layer 4 (drop-ins, filename order)
///     └── 10-local.toml
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayout {
    dir: PathBuf,
    base_file: String,
    drop_in_dir: String,
}

impl ConfigLayout {
    /// Uses the default file names inside `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            base_file: defaults::BASE_FILE.to_string(),
            drop_in_dir: defaults::DROP_IN_DIR.to_string(),
        }
    }

    /// Overrides the base file name.
    #[must_use]
    pub fn with_base_file(mut self, name: impl Into<String>) -> Self {
        self.base_file = name.into();
        self
    }

    /// Overrides the drop-in directory name.
    #[must_use]
    pub fn with_drop_in_dir(mut self, name: impl Into<String>) -> Self {
        self.drop_in_dir = name.into();
        self
    }

    /// Configuration directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the base file.
    #[must_use]
    pub fn base_path(&self) -> PathBuf {
        self.dir.join(&self.base_file)
    }

    /// Path of the drop-in directory.
    #[must_use]
    pub fn drop_in_path(&self) -> PathBuf {
        self.dir.join(&self.drop_in_dir)
    }

    /// Domain files: top-level `*.toml` other than the base file, sorted.
    pub(crate) async fn domain_files(&self) -> Result<Vec<PathBuf>, LoadError> {
        list_files(&self.dir, Some(&self.base_file)).await
    }

    /// Drop-in files: `*.toml` in the drop-in directory, sorted.
    pub(crate) async fn drop_in_files(&self) -> Result<Vec<PathBuf>, LoadError> {
        list_files(&self.drop_in_path(), None).await
    }
}

async fn list_files(dir: &Path, exclude: Option<&str>) -> Result<Vec<PathBuf>, LoadError> {
    let read_dir_error = |source| LoadError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(dir = %dir.display(), "Config directory not found, skipping");
            return Ok(Vec::new());
        }
        Err(e) => return Err(read_dir_error(e)),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_dir_error)? {
        let path = entry.path();
        let is_toml = path
            .extension()
            .is_some_and(|ext| ext == defaults::FILE_EXTENSION);
        let excluded = exclude.is_some_and(|name| entry.file_name() == name);
        if !is_toml || excluded {
            continue;
        }
        // Follows symlinks; directories named *.toml are skipped
        let is_file = tokio::fs::metadata(&path)
            .await
            .map_err(read_dir_error)?
            .is_file();
        if is_file {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Reads one TOML file into a value tree; `None` if it does not exist.
pub(crate) async fn read_file(path: &Path) -> Result<Option<Value>, LoadError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(LoadError::FileRead {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    // TOML documents are always tables, so this yields an object
    let tree: Value = toml::from_str(&content).map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;
    Ok(Some(tree))
}
