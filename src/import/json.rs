use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::ImportError;
use crate::import::{has_extension, RecordImporter};
use crate::models::DailyRecord;

/// Either a bare array of records or an object wrapping one
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordDocument {
    List(Vec<DailyRecord>),
    Wrapped { records: Vec<DailyRecord> },
}

/// JSON importer for `DailyRecord` documents
#[derive(Debug, Default)]
pub struct JsonImporter;

impl JsonImporter {
    pub fn new() -> Self {
        JsonImporter
    }

    pub fn read_records<R: Read>(&self, source: R) -> Result<Vec<DailyRecord>, ImportError> {
        let document: RecordDocument = serde_json::from_reader(source)?;
        Ok(match document {
            RecordDocument::List(records) | RecordDocument::Wrapped { records } => records,
        })
    }
}

impl RecordImporter for JsonImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        has_extension(file_path, "json")
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<DailyRecord>, ImportError> {
        let reader = BufReader::new(File::open(file_path)?);
        self.read_records(reader)
    }

    fn format_name(&self) -> &'static str {
        "JSON"
    }
}
