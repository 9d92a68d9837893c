use std::path::Path;
use std::str::FromStr;

use crate::error::FatigueError;

pub mod csv;
pub mod json;

pub use self::csv::{export_history_csv, export_status_csv, write_history_csv, write_status_csv};
pub use self::json::{export_json, write_json};

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// Format implied by a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for ExportFormat {
    type Err = FatigueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(FatigueError::Export(format!("Unsupported format: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("pdf".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::from_path(Path::new("out/trend.csv")), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_path(Path::new("trend")), None);
    }
}
