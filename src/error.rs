//! Unified error hierarchy for FatigueGuard
//!
//! Missing or sparse data is never an error in this crate: absent reports are
//! represented as `None` metrics and gray statuses. The types here cover the
//! genuinely exceptional paths (store access, file import/export,
//! configuration) plus per-record validation failures, which the engine logs
//! and skips rather than propagating.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all FatigueGuard operations
#[derive(Debug, Error)]
pub enum FatigueError {
    /// Record store errors
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    /// Import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// A single record failed validation
    #[error("Invalid record: {0}")]
    Record(#[from] RecordError),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Validation failure for one daily record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Training minutes below zero
    #[error("negative training minutes on {date}: {minutes}")]
    NegativeMinutes { date: NaiveDate, minutes: i32 },

    /// A bounded field outside its allowed range
    #[error("{field} out of range on {date}: {value} (allowed {min}-{max})")]
    OutOfRange {
        date: NaiveDate,
        field: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },
}

/// Record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A record already exists for this player and date
    #[error("Duplicate record: {player_id} on {date}")]
    Duplicate { player_id: String, date: NaiveDate },

    /// A stored row could not be turned into a record
    #[error("Invalid row: {0}")]
    InvalidRow(String),

    /// Invalid query range
    #[error("Invalid date range: {start} to {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Record import errors
#[derive(Debug, Error)]
pub enum ImportError {
    /// No importer handles this file
    #[error("Unsupported format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// CSV reader error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required column is absent from the header row
    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    /// A field value could not be parsed
    #[error("Parse error on line {line}, field {field}: {reason}")]
    Parse {
        line: u64,
        field: String,
        reason: String,
    },

    /// IO error while reading the file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for FatigueGuard operations
pub type Result<T> = std::result::Result<T, FatigueError>;

impl FatigueError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            FatigueError::Record(_) => ErrorSeverity::Warning,
            FatigueError::Store(StoreError::Duplicate { .. }) => ErrorSeverity::Warning,
            FatigueError::Import(ImportError::UnsupportedFormat { .. }) => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            FatigueError::Import(ImportError::UnsupportedFormat { path }) => {
                format!(
                    "Could not import {}: only .csv and .json record files are supported",
                    path.display()
                )
            }
            FatigueError::Import(ImportError::MissingColumn { column }) => {
                format!("The record file has no '{}' column", column)
            }
            FatigueError::Store(StoreError::Sqlite(_)) => {
                "Unable to read the record database. Please check the database path.".to_string()
            }
            FatigueError::Store(StoreError::Duplicate { player_id, date }) => {
                format!("Player {} already has a report for {}", player_id, date)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// The operation failed
    Error,
    /// The input was partly unusable, nothing was lost
    Warning,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 23).unwrap()
    }

    #[test]
    fn test_error_severity() {
        let err = FatigueError::Record(RecordError::NegativeMinutes {
            date: date(),
            minutes: -5,
        });
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let err = FatigueError::Configuration("bad threshold".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Error);

        let err = FatigueError::Store(StoreError::Duplicate {
            player_id: "p1".to_string(),
            date: date(),
        });
        assert_eq!(err.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_user_messages() {
        let err = FatigueError::Import(ImportError::UnsupportedFormat {
            path: PathBuf::from("records.xlsx"),
        });
        assert!(err.user_message().contains("records.xlsx"));

        let err = FatigueError::Store(StoreError::Duplicate {
            player_id: "p1".to_string(),
            date: date(),
        });
        assert!(err.user_message().contains("2024-09-23"));
    }

    #[test]
    fn test_record_error_display() {
        let err = RecordError::OutOfRange {
            date: date(),
            field: "srpe_score",
            value: 11,
            min: 1,
            max: 10,
        };
        assert_eq!(
            err.to_string(),
            "srpe_score out of range on 2024-09-23: 11 (allowed 1-10)"
        );
    }
}
