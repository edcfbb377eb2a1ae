//! Error types for prodlog.
//!
//! This module defines all error types used throughout the prodlog crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for prodlog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to read the data file.
    #[error("failed to read data file {path}: {source}")]
    StorageRead {
        /// Path to the data file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: csv::Error,
    },

    /// Failed to write the data file.
    #[error("failed to write data file {path}: {source}")]
    StorageWrite {
        /// Path to the data file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: csv::Error,
    },

    /// A CSV encoding or decoding step failed outside of a file operation.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row in the data file could not be decoded.
    #[error("malformed row at line {line}, column '{column}': {message}")]
    MalformedRow {
        /// 1-based line number in the file (the header is line 1).
        line: u64,
        /// Column name the bad value was found in.
        column: String,
        /// Description of what went wrong.
        message: String,
    },

    /// The data file header lacks a required column.
    #[error("data file is missing column '{column}'")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },

    /// A positional delete referenced a row that does not exist.
    #[error("row {index} is out of range (table has {len} rows)")]
    RowOutOfRange {
        /// The requested row index.
        index: usize,
        /// Number of rows in the table.
        len: usize,
    },

    /// No record carries the requested id.
    #[error("no record with id {id}")]
    RecordNotFound {
        /// The requested id.
        id: u64,
    },

    // === Form Errors ===
    /// A form field holds an unacceptable value.
    #[error("invalid {field}: {message}")]
    InvalidField {
        /// Name of the field.
        field: &'static str,
        /// Description of the problem.
        message: String,
    },

    /// Interactive input ended before the form was complete.
    #[error("input ended before the entry was complete")]
    InputAborted,

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for prodlog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid field error.
    #[must_use]
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }

    /// Create a malformed row error.
    #[must_use]
    pub fn malformed_row(line: u64, column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedRow {
            line,
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this error was caused by a reference to a row or record
    /// that does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RowOutOfRange { .. } | Self::RecordNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_out_of_range_display() {
        let err = Error::RowOutOfRange { index: 7, len: 3 };
        assert_eq!(err.to_string(), "row 7 is out of range (table has 3 rows)");
    }

    #[test]
    fn test_record_not_found_display() {
        let err = Error::RecordNotFound { id: 42 };
        assert_eq!(err.to_string(), "no record with id 42");
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::RowOutOfRange { index: 0, len: 0 }.is_not_found());
        assert!(Error::RecordNotFound { id: 1 }.is_not_found());
        assert!(!Error::InputAborted.is_not_found());
    }

    #[test]
    fn test_invalid_field_display() {
        let err = Error::invalid_field("shift", "unknown option 'night'");
        assert_eq!(err.to_string(), "invalid shift: unknown option 'night'");
    }

    #[test]
    fn test_malformed_row_display() {
        let err = Error::malformed_row(4, "Quantity", "invalid digit found in string");
        let msg = err.to_string();
        assert!(msg.contains("line 4"));
        assert!(msg.contains("'Quantity'"));
        assert!(msg.contains("invalid digit"));
    }

    #[test]
    fn test_missing_column_display() {
        let err = Error::MissingColumn {
            column: "Date".to_string(),
        };
        assert_eq!(err.to_string(), "data file is missing column 'Date'");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "form.shifts must not be empty".to_string(),
        };
        assert!(err.to_string().contains("form.shifts"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }

    #[test]
    fn test_input_aborted_display() {
        assert_eq!(
            Error::InputAborted.to_string(),
            "input ended before the entry was complete"
        );
    }
}
