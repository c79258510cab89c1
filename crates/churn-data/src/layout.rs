//! On-disk layout of the data directory and the file helpers shared by the
//! stores that live in it.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use churn_core::{ChurnError, Result};
use tempfile::NamedTempFile;

const LOCAL_SOURCE_FILE: &str = "churn.csv";
const LAST_UPDATE_FILE: &str = "last-update.json";
const HISTORY_DIR: &str = "history";

/// Paths inside a data directory.
///
/// ```text
/// <root>/churn.csv
/// <root>/last-update.json
/// <root>/history/index.json
/// <root>/history/<snapshot-id>.csv
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn local_source(&self) -> PathBuf {
        self.root.join(LOCAL_SOURCE_FILE)
    }

    pub fn last_update(&self) -> PathBuf {
        self.root.join(LAST_UPDATE_FILE)
    }

    pub fn history_dir(&self) -> PathBuf {
        self.root.join(HISTORY_DIR)
    }
}

/// Modification time of `path`, `None` when it cannot be read.
pub fn file_mtime(path: &Path) -> Option<DateTime<Utc>> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}

/// Read `path` as text, replacing invalid UTF-8.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| ChurnError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write `contents` to a uniquely named temporary sibling and rename it over
/// `path`, creating parent directories as needed. Readers see either the old
/// or the new file; concurrent writers never share a temporary file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let write_err = |source| ChurnError::FileWrite {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(contents).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
