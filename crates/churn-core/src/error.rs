use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the churn pipeline.
#[derive(Error, Debug)]
pub enum ChurnError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be written or moved into place.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed or produced.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A parsed row is too narrow to carry the identity columns.
    #[error("Row has {columns} columns, at least {required} required")]
    RowShape { columns: usize, required: usize },

    /// An uploaded file was rejected before being recorded.
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// An uploaded file exceeds the accepted size.
    #[error("Upload of {size} bytes exceeds the {max} byte limit")]
    UploadTooLarge { size: usize, max: usize },

    /// No director in the dataset matches the requested name or slug.
    #[error("Unknown director: {0}")]
    UnknownDirector(String),

    /// The remote source could not deliver usable text.
    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),
}

/// Convenience alias used throughout the churn crates.
pub type Result<T> = std::result::Result<T, ChurnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ChurnError::FileRead {
            path: PathBuf::from("/data/churn.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/data/churn.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_row_shape() {
        let err = ChurnError::RowShape {
            columns: 2,
            required: 3,
        };
        assert_eq!(err.to_string(), "Row has 2 columns, at least 3 required");
    }

    #[test]
    fn test_error_display_upload_too_large() {
        let err = ChurnError::UploadTooLarge { size: 10, max: 5 };
        assert_eq!(err.to_string(), "Upload of 10 bytes exceeds the 5 byte limit");
    }

    #[test]
    fn test_error_display_unknown_director() {
        let err = ChurnError::UnknownDirector("south".to_string());
        assert_eq!(err.to_string(), "Unknown director: south");
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: ChurnError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
