//! The explicit "last update" record written alongside the local source.

use std::path::Path;

use chrono::{DateTime, Utc};
use churn_core::time_utils::{parse_timestamp, to_record_timestamp};
use churn_core::Result;
use serde::{Deserialize, Serialize};

use crate::layout::write_atomic;

/// Contents of `last-update.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl LastUpdate {
    /// Load the recorded update time.
    ///
    /// Returns `None` when the file is absent, malformed or carries no
    /// readable timestamp.
    pub fn load_from(path: &Path) -> Option<DateTime<Utc>> {
        let content = std::fs::read_to_string(path).ok()?;
        let record: LastUpdate = serde_json::from_str(&content).ok()?;
        parse_timestamp(record.updated_at.as_deref()?)
    }

    /// Atomically record `ts` as the last update time.
    pub fn save_to(path: &Path, ts: DateTime<Utc>) -> Result<()> {
        let record = LastUpdate {
            updated_at: Some(to_record_timestamp(ts)),
        };
        let json = serde_json::to_string_pretty(&record)?;
        write_atomic(path, json.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("last-update.json");
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 14, 0, 5).unwrap();

        LastUpdate::save_to(&path, ts).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"updatedAt\": \"2024-03-09T14:00:05.000Z\""));
        assert_eq!(LastUpdate::load_from(&path), Some(ts));
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = TempDir::new().unwrap();
        assert!(LastUpdate::load_from(&tmp.path().join("last-update.json")).is_none());
    }

    #[test]
    fn test_load_malformed_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("last-update.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(LastUpdate::load_from(&path).is_none());

        std::fs::write(&path, r#"{"updatedAt": 12}"#).unwrap();
        assert!(LastUpdate::load_from(&path).is_none());

        std::fs::write(&path, r#"{"other": "x"}"#).unwrap();
        assert!(LastUpdate::load_from(&path).is_none());
    }
}
