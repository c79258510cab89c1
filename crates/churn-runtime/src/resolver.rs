//! Source selection.
//!
//! [`SnapshotResolver::load_dataset`] decides which raw text feeds the
//! pipeline and what provenance it carries:
//!
//! 1. a requested snapshot that passes id validation and exists in history;
//! 2. the configured remote URL, when it delivers a non-empty body;
//! 3. the local source file.
//!
//! Only a failure of the final local read is returned to the caller; the
//! other sources degrade silently to the next one.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use churn_core::models::{Dataset, DatasetMeta, SourceKind};
use churn_core::time_utils::is_valid_snapshot_id;
use churn_core::Result;
use churn_data::builder::build_dataset_from_text;
use churn_data::history::SnapshotHistory;
use churn_data::last_update::LastUpdate;
use churn_data::layout::{file_mtime, read_text, DataLayout};
use tracing::{debug, info, warn};

use crate::remote::RemoteSource;

// ── Configuration ─────────────────────────────────────────────────────────────

/// Where the resolver looks for raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub local_source_path: PathBuf,
    /// Remote export URL; `None` disables the remote source.
    pub remote_source_url: Option<String>,
    pub last_update_path: PathBuf,
    /// Request timeout for the remote fetch.
    pub fetch_timeout: Option<Duration>,
}

impl SourceConfig {
    /// Local paths from `layout`, no remote.
    pub fn from_layout(layout: &DataLayout) -> Self {
        Self {
            local_source_path: layout.local_source(),
            remote_source_url: None,
            last_update_path: layout.last_update(),
            fetch_timeout: None,
        }
    }

    pub fn with_remote(mut self, url: Option<String>, timeout: Option<Duration>) -> Self {
        self.remote_source_url = url.filter(|u| !u.trim().is_empty());
        self.fetch_timeout = timeout;
        self
    }
}

// ── SnapshotResolver ──────────────────────────────────────────────────────────

pub struct SnapshotResolver {
    config: SourceConfig,
    history: Arc<dyn SnapshotHistory>,
    remote: Option<RemoteSource>,
}

impl SnapshotResolver {
    pub fn new(config: SourceConfig, history: Arc<dyn SnapshotHistory>) -> Result<Self> {
        let remote = config
            .remote_source_url
            .as_deref()
            .map(|url| RemoteSource::new(url, config.fetch_timeout))
            .transpose()?;
        Ok(Self {
            config,
            history,
            remote,
        })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Resolve the raw source and build the dataset from it.
    pub async fn load_dataset(&self, snapshot: Option<&str>) -> Result<Dataset> {
        let (raw, meta) = self.resolve_source(snapshot).await?;
        let dataset = build_dataset_from_text(&raw, meta);
        info!(
            "Loaded {} rows for {} directors from {} source",
            dataset.rows.len(),
            dataset.directors.len(),
            dataset.meta.source
        );
        Ok(dataset)
    }

    /// Pick the raw text and its provenance.
    pub async fn resolve_source(&self, snapshot: Option<&str>) -> Result<(String, DatasetMeta)> {
        if let Some(found) = snapshot.and_then(|id| self.read_snapshot(id)) {
            return Ok(found);
        }

        if let Some(remote) = &self.remote {
            match remote.fetch().await {
                Ok(raw) => {
                    let meta = DatasetMeta {
                        source: SourceKind::Remote,
                        last_updated: self.local_last_updated(),
                        snapshot_id: None,
                    };
                    return Ok((raw, meta));
                }
                Err(e) => warn!("Falling back to local source: {}", e),
            }
        }

        let raw = read_text(&self.config.local_source_path)?;
        Ok((raw, DatasetMeta::local(self.local_last_updated())))
    }

    /// Snapshot text and meta, `None` when the id is unusable.
    fn read_snapshot(&self, requested: &str) -> Option<(String, DatasetMeta)> {
        let id = requested.trim();
        if !is_valid_snapshot_id(id) || !self.history.exists(id) {
            debug!("Ignoring unknown snapshot id {:?}", requested);
            return None;
        }
        let bytes = match self.history.read(id) {
            Ok(b) => b,
            Err(e) => {
                warn!("Snapshot {} could not be read: {}", id, e);
                return None;
            }
        };
        let meta = DatasetMeta {
            source: SourceKind::Snapshot,
            last_updated: self.history.metadata(id).map(|m| m.uploaded_at),
            snapshot_id: Some(id.to_string()),
        };
        Some((String::from_utf8_lossy(&bytes).into_owned(), meta))
    }

    /// Explicit last-update record, else the local file's modification time.
    fn local_last_updated(&self) -> Option<DateTime<Utc>> {
        LastUpdate::load_from(&self.config.last_update_path)
            .or_else(|| file_mtime(&self.config.local_source_path))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
