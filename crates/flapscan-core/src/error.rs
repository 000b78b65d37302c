use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by flapscan.
#[derive(Error, Debug)]
pub enum ScanError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A device timestamp could not be turned into a calendar time.
    #[error("Invalid timestamp \"{value}\" for year {year}")]
    TimestampParse { value: String, year: i32 },

    /// Chronological ordering was requested without a year to anchor it.
    #[error("A reference year is required to order device timestamps")]
    MissingReferenceYear,

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The session collaborator could not deliver command output for a node.
    #[error("Failed to fetch \"{command}\" from {node}: {message}")]
    Fetch {
        node: String,
        command: String,
        message: String,
    },

    /// The capture directory does not exist.
    #[error("Capture directory not found: {0}")]
    CaptureDirNotFound(PathBuf),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScanError {
    /// `true` for errors raised by the command source rather than by parsing.
    pub fn is_upstream(&self) -> bool {
        matches!(self, ScanError::Fetch { .. } | ScanError::FileRead { .. })
    }
}

/// Convenience alias used throughout the flapscan crates.
pub type Result<T> = std::result::Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ScanError::FileRead {
            path: PathBuf::from("/captures/HQ-01/show_int_des.txt"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/captures/HQ-01/show_int_des.txt"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_timestamp_parse() {
        let err = ScanError::TimestampParse {
            value: "Foo 99 10:00:00".to_string(),
            year: 2024,
        };
        assert_eq!(
            err.to_string(),
            "Invalid timestamp \"Foo 99 10:00:00\" for year 2024"
        );
    }

    #[test]
    fn test_error_display_missing_year() {
        let msg = ScanError::MissingReferenceYear.to_string();
        assert!(msg.contains("reference year"));
    }

    #[test]
    fn test_error_display_fetch() {
        let err = ScanError::Fetch {
            node: "CA4-01".to_string(),
            command: "show int des | i LR".to_string(),
            message: "timeout".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to fetch \"show int des | i LR\" from CA4-01: timeout"
        );
        assert!(err.is_upstream());
    }

    #[test]
    fn test_error_display_config() {
        let err = ScanError::Config("category name must not be empty".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: category name must not be empty"
        );
        assert!(!err.is_upstream());
    }

    #[test]
    fn test_error_display_capture_dir_not_found() {
        let err = ScanError::CaptureDirNotFound(PathBuf::from("/missing/dir"));
        assert_eq!(err.to_string(), "Capture directory not found: /missing/dir");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ScanError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: ScanError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
