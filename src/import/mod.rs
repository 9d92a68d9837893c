use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::ImportError;
use crate::models::DailyRecord;

pub mod csv;
pub mod json;

/// Trait for reading daily records from different file formats
pub trait RecordImporter: Send + Sync {
    /// Check if this importer can handle the given file
    fn can_import(&self, file_path: &Path) -> bool;

    /// Read every record in the file
    ///
    /// Values are parsed but not range-checked; callers validate before
    /// storing.
    fn import_file(&self, file_path: &Path) -> Result<Vec<DailyRecord>, ImportError>;

    /// Get the format name for this importer
    fn format_name(&self) -> &'static str;
}

pub(crate) fn has_extension(file_path: &Path, expected: &str) -> bool {
    file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(expected))
        .unwrap_or(false)
}

/// Records read from a directory, plus the files that could not be read
#[derive(Debug, Default)]
pub struct DirectoryImport {
    pub records: Vec<DailyRecord>,
    pub files_read: usize,
    pub failures: Vec<(PathBuf, ImportError)>,
}

/// Manager for coordinating different import formats
pub struct ImportManager {
    importers: Vec<Box<dyn RecordImporter>>,
}

impl ImportManager {
    /// Create a new import manager with all available importers
    pub fn new() -> Self {
        let importers: Vec<Box<dyn RecordImporter>> = vec![
            Box::new(csv::CsvImporter::new()),
            Box::new(json::JsonImporter::new()),
        ];

        Self { importers }
    }

    /// Import a single file, detecting the format from its extension
    pub fn import_file(&self, file_path: &Path) -> Result<Vec<DailyRecord>, ImportError> {
        let importer = self
            .importers
            .iter()
            .find(|importer| importer.can_import(file_path))
            .ok_or_else(|| ImportError::UnsupportedFormat {
                path: file_path.to_path_buf(),
            })?;

        let records = importer.import_file(file_path)?;
        info!(
            path = %file_path.display(),
            format = importer.format_name(),
            records = records.len(),
            "Imported records"
        );
        Ok(records)
    }

    /// Import every supported file in a directory, sorted by file name
    ///
    /// A file that fails to parse is reported in `failures` and does not
    /// stop the others.
    pub fn import_directory(&self, dir_path: &Path) -> Result<DirectoryImport, ImportError> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir_path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && self.can_import_file(path))
            .collect();
        files.sort();

        let mut result = DirectoryImport::default();
        for file_path in files {
            match self.import_file(&file_path) {
                Ok(mut records) => {
                    result.records.append(&mut records);
                    result.files_read += 1;
                }
                Err(e) => {
                    warn!(path = %file_path.display(), error = %e, "Failed to import file");
                    result.failures.push((file_path, e));
                }
            }
        }

        Ok(result)
    }

    /// Check if this manager can import a given file
    pub fn can_import_file(&self, file_path: &Path) -> bool {
        self.importers.iter().any(|importer| importer.can_import(file_path))
    }
}

impl Default for ImportManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_dispatch_by_extension() {
        let manager = ImportManager::new();
        assert!(manager.can_import_file(Path::new("week.csv")));
        assert!(manager.can_import_file(Path::new("WEEK.JSON")));
        assert!(!manager.can_import_file(Path::new("week.xlsx")));
    }

    #[test]
    fn test_unsupported_file() {
        let err = ImportManager::new().import_file(Path::new("week.xlsx")).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_import_directory_collects_and_reports() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("a.csv"),
            "player_id,date,rhr\np1,2024-09-01,52\np1,2024-09-02,51\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("b.json"),
            r#"[{"player_id": "p2", "record_date": "2024-09-01", "training_minutes": 60, "srpe_score": 5}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let result = ImportManager::new().import_directory(dir.path()).unwrap();
        assert_eq!(result.files_read, 2);
        assert_eq!(result.records.len(), 3);
        assert_eq!(result.failures.len(), 1);
        assert!(result.failures[0].0.ends_with("broken.json"));
    }
}
