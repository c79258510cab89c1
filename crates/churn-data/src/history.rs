//! Snapshot history.
//!
//! Every upload is kept as an immutable copy addressed by a timestamp-derived
//! id. [`SnapshotHistory`] is the contract the resolver consumes;
//! [`FileHistory`] implements it over `<data>/history/`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use churn_core::time_utils::{is_valid_snapshot_id, snapshot_id_for};
use churn_core::{ChurnError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::layout::{file_mtime, write_atomic};

/// Maximum number of entries kept in the index.
pub const HISTORY_LIMIT: usize = 60;

const INDEX_FILE: &str = "index.json";

/// Serializes index updates within the process.
static INDEX_LOCK: Mutex<()> = Mutex::new(());

// ── Types ─────────────────────────────────────────────────────────────────────

/// One recorded upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub uploaded_at: DateTime<Utc>,
    /// Name of the file as uploaded.
    pub filename: String,
}

/// What the resolver needs to know about a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotMetadata {
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryIndex {
    entries: Vec<HistoryEntry>,
}

/// Read access to recorded snapshots.
pub trait SnapshotHistory: Send + Sync {
    /// Whether a snapshot with this id can be read.
    fn exists(&self, id: &str) -> bool;
    /// Raw bytes of the snapshot.
    fn read(&self, id: &str) -> Result<Vec<u8>>;
    /// Upload time of the snapshot, if known.
    fn metadata(&self, id: &str) -> Option<SnapshotMetadata>;
    /// Known snapshots, most recent first.
    fn list(&self) -> Vec<HistoryEntry>;
}

// ── FileHistory ───────────────────────────────────────────────────────────────

/// Snapshot history stored as `<dir>/<id>.csv` plus `<dir>/index.json`.
#[derive(Debug, Clone)]
pub struct FileHistory {
    dir: PathBuf,
}

impl FileHistory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the snapshot file for `id`.
    pub fn snapshot_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", id))
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    /// Load the index; a missing or malformed index reads as empty.
    fn read_index(&self) -> Vec<HistoryEntry> {
        let path = self.index_path();
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Vec::new();
        };
        match serde_json::from_str::<HistoryIndex>(&content) {
            Ok(index) => index.entries,
            Err(e) => {
                warn!("Ignoring unreadable history index {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    fn write_index(&self, entries: Vec<HistoryEntry>) -> Result<()> {
        let json = serde_json::to_string_pretty(&HistoryIndex { entries })?;
        write_atomic(&self.index_path(), json.as_bytes())
    }

    /// Store `contents` as a new snapshot uploaded at `now`.
    ///
    /// The new entry goes to the front of the index, which is then trimmed to
    /// [`HISTORY_LIMIT`] entries. Snapshot files of trimmed entries are left
    /// on disk. Concurrent recorders in one process never drop each other's
    /// entries.
    pub fn record(
        &self,
        contents: &[u8],
        filename: &str,
        now: DateTime<Utc>,
    ) -> Result<HistoryEntry> {
        let entry = HistoryEntry {
            id: snapshot_id_for(now),
            uploaded_at: now,
            filename: filename.to_string(),
        };

        write_atomic(&self.snapshot_path(&entry.id), contents)?;

        let _guard = INDEX_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.read_index();
        entries.retain(|e| e.id != entry.id);
        entries.insert(0, entry.clone());
        entries.truncate(HISTORY_LIMIT);
        self.write_index(entries)?;

        debug!("Recorded snapshot {} ({} bytes)", entry.id, contents.len());
        Ok(entry)
    }
}

impl SnapshotHistory for FileHistory {
    fn exists(&self, id: &str) -> bool {
        is_valid_snapshot_id(id) && self.snapshot_path(id).is_file()
    }

    fn read(&self, id: &str) -> Result<Vec<u8>> {
        let path = self.snapshot_path(id);
        std::fs::read(&path).map_err(|source| ChurnError::FileRead { path, source })
    }

    /// Upload time from the index, else the snapshot file's modification time.
    fn metadata(&self, id: &str) -> Option<SnapshotMetadata> {
        let uploaded_at = self
            .read_index()
            .into_iter()
            .find(|e| e.id == id)
            .map(|e| e.uploaded_at)
            .or_else(|| file_mtime(&self.snapshot_path(id)))?;
        Some(SnapshotMetadata { uploaded_at })
    }

    fn list(&self) -> Vec<HistoryEntry> {
        let mut entries = self.read_index();
        entries.truncate(HISTORY_LIMIT);
        entries
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
