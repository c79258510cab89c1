//! Recording a new source file.
//!
//! An accepted upload replaces the local source, is kept as a snapshot and
//! stamps the last-update record, all with the same upload time.

use chrono::{DateTime, Utc};
use churn_core::{ChurnError, Result};
use tracing::info;

use crate::history::{FileHistory, HistoryEntry};
use crate::last_update::LastUpdate;
use crate::layout::{write_atomic, DataLayout};

/// Largest accepted upload (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Check name and size of an upload before anything is written.
pub fn validate_upload(filename: &str, size: usize) -> Result<()> {
    if !filename.to_lowercase().ends_with(".csv") {
        return Err(ChurnError::InvalidUpload(format!(
            "expected a .csv file, got \"{}\"",
            filename
        )));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ChurnError::UploadTooLarge {
            size,
            max: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

/// Record `contents` as the new local source and as a snapshot.
pub fn record_upload(
    layout: &DataLayout,
    filename: &str,
    contents: &[u8],
    now: DateTime<Utc>,
) -> Result<HistoryEntry> {
    validate_upload(filename, contents.len())?;

    write_atomic(&layout.local_source(), contents)?;
    let entry = FileHistory::new(layout.history_dir()).record(contents, filename, now)?;
    LastUpdate::save_to(&layout.last_update(), now)?;

    info!(
        "Recorded upload {} as snapshot {} ({} bytes)",
        filename,
        entry.id,
        contents.len()
    );
    Ok(entry)
}
