use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::ImportError;
use crate::import::{has_extension, RecordImporter};
use crate::models::DailyRecord;

/// Accepted date layouts, tried in order
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%Y%m%d"];

/// CSV importer with flexible column mapping
///
/// Header names are matched case-insensitively after replacing spaces and
/// dashes with underscores, and common aliases are accepted (`rhr`, `rpe`,
/// `date`, ...). Unknown columns are ignored.
pub struct CsvImporter {
    column_mapping: HashMap<String, &'static str>,
}

impl CsvImporter {
    pub fn new() -> Self {
        let mut column_mapping = HashMap::new();

        Self::add_mapping(&mut column_mapping, "player_id", &["player_id", "player", "athlete", "athlete_id", "user_id"]);
        Self::add_mapping(&mut column_mapping, "record_date", &["record_date", "date", "day"]);
        Self::add_mapping(
            &mut column_mapping,
            "rhr_bpm",
            &["rhr_bpm", "rhr", "resting_hr", "resting_heart_rate", "morning_hr"],
        );
        Self::add_mapping(&mut column_mapping, "sleep_quality", &["sleep_quality", "sleep"]);
        Self::add_mapping(&mut column_mapping, "stress_level", &["stress_level", "stress"]);
        Self::add_mapping(&mut column_mapping, "fatigue_level", &["fatigue_level", "fatigue"]);
        Self::add_mapping(&mut column_mapping, "muscle_soreness", &["muscle_soreness", "soreness"]);
        Self::add_mapping(&mut column_mapping, "mood", &["mood"]);
        Self::add_mapping(
            &mut column_mapping,
            "training_minutes",
            &["training_minutes", "minutes", "duration", "duration_min", "training_time"],
        );
        Self::add_mapping(&mut column_mapping, "srpe_score", &["srpe_score", "srpe", "rpe", "session_rpe"]);
        Self::add_mapping(&mut column_mapping, "feedback", &["feedback", "notes", "comment"]);

        Self { column_mapping }
    }

    fn add_mapping(mapping: &mut HashMap<String, &'static str>, standard: &'static str, variations: &[&str]) {
        for variation in variations {
            mapping.insert(variation.to_lowercase(), standard);
        }
    }

    fn normalize_column_name(&self, name: &str) -> Option<&'static str> {
        let normalized = name.trim().to_lowercase().replace([' ', '-'], "_");
        self.column_mapping.get(&normalized).copied()
    }

    pub fn parse_date(value: &str) -> Option<NaiveDate> {
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
    }

    /// Read records from any CSV source with a header row
    pub fn read_records<R: Read>(&self, source: R) -> Result<Vec<DailyRecord>, ImportError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        let headers = reader.headers()?.clone();
        let columns: HashMap<&'static str, usize> = headers
            .iter()
            .enumerate()
            .filter_map(|(i, header)| self.normalize_column_name(header).map(|name| (name, i)))
            .fold(HashMap::new(), |mut acc, (name, i)| {
                acc.entry(name).or_insert(i);
                acc
            });

        for required in ["player_id", "record_date"] {
            if !columns.contains_key(required) {
                return Err(ImportError::MissingColumn {
                    column: required.to_string(),
                });
            }
        }

        let mut records = Vec::new();
        for result in reader.records() {
            let row = result?;
            if row.iter().all(str::is_empty) {
                continue;
            }
            records.push(RowParser { row: &row, columns: &columns }.parse()?);
        }

        Ok(records)
    }
}

impl Default for CsvImporter {
    fn default() -> Self {
        Self::new()
    }
}

struct RowParser<'a> {
    row: &'a StringRecord,
    columns: &'a HashMap<&'static str, usize>,
}

impl RowParser<'_> {
    fn line(&self) -> u64 {
        self.row.position().map(|p| p.line()).unwrap_or(0)
    }

    fn value(&self, field: &str) -> Option<&str> {
        self.columns
            .get(field)
            .and_then(|&i| self.row.get(i))
            .filter(|v| !v.is_empty())
    }

    fn error(&self, field: &str, reason: impl Into<String>) -> ImportError {
        ImportError::Parse {
            line: self.line(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    fn int(&self, field: &str) -> Result<Option<i32>, ImportError> {
        self.value(field)
            .map(|v| v.parse::<i32>().map_err(|e| self.error(field, format!("'{}': {}", v, e))))
            .transpose()
    }

    fn parse(&self) -> Result<DailyRecord, ImportError> {
        let player_id = self
            .value("player_id")
            .ok_or_else(|| self.error("player_id", "empty player id"))?;

        let raw_date = self
            .value("record_date")
            .ok_or_else(|| self.error("record_date", "empty date"))?;
        let record_date =
            CsvImporter::parse_date(raw_date).ok_or_else(|| self.error("record_date", format!("unrecognized date '{}'", raw_date)))?;

        let mut record = DailyRecord::new(player_id, record_date);
        record.rhr_bpm = self.int("rhr_bpm")?;
        record.sleep_quality = self.int("sleep_quality")?;
        record.stress_level = self.int("stress_level")?;
        record.fatigue_level = self.int("fatigue_level")?;
        record.muscle_soreness = self.int("muscle_soreness")?;
        record.mood = self.int("mood")?;
        record.training_minutes = self.int("training_minutes")?;
        record.srpe_score = self.int("srpe_score")?;
        record.feedback = self.value("feedback").map(str::to_string);

        Ok(record)
    }
}

impl RecordImporter for CsvImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        has_extension(file_path, "csv")
    }

    fn import_file(&self, file_path: &Path) -> Result<Vec<DailyRecord>, ImportError> {
        let file = std::fs::File::open(file_path)?;
        self.read_records(file)
    }

    fn format_name(&self) -> &'static str {
        "CSV"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn read(input: &str) -> Result<Vec<DailyRecord>, ImportError> {
        CsvImporter::new().read_records(input.as_bytes())
    }

    #[test]
    fn test_full_row() {
        let records = read(
            "player_id,record_date,rhr_bpm,sleep_quality,stress_level,fatigue_level,muscle_soreness,mood,training_minutes,srpe_score,feedback\n\
             p1,2024-09-23,52,4,3,4,2,5,60,8,felt good\n",
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.player_id, "p1");
        assert_eq!(r.record_date, NaiveDate::from_ymd_opt(2024, 9, 23).unwrap());
        assert_eq!(r.rhr_bpm, Some(52));
        assert_eq!(r.muscle_soreness, Some(2));
        assert_eq!(r.training_load_au(), 480);
        assert_eq!(r.feedback.as_deref(), Some("felt good"));
    }

    #[test]
    fn test_aliases_and_header_normalization() {
        let records = read("Athlete,Date,Resting HR,RPE,Minutes\np7,2024/09/23,61,6,45\n").unwrap();

        let r = &records[0];
        assert_eq!(r.player_id, "p7");
        assert_eq!(r.rhr_bpm, Some(61));
        assert_eq!(r.srpe_score, Some(6));
        assert_eq!(r.training_minutes, Some(45));
    }

    #[test]
    fn test_empty_cells_are_absent() {
        let records = read("player,date,rhr,rpe,minutes\np1,2024-09-23,,,\n").unwrap();

        let r = &records[0];
        assert_eq!(r.rhr_bpm, None);
        assert_eq!(r.srpe_score, None);
        assert_eq!(r.training_minutes, None);
        assert!(!r.is_rest_day());

        let rest = read("player,date,minutes\np1,2024-09-23,0\n").unwrap();
        assert!(rest[0].is_rest_day());
    }

    #[test]
    fn test_missing_required_column() {
        let err = read("date,rhr\n2024-09-23,50\n").unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn { ref column } if column == "player_id"));
    }

    #[test]
    fn test_bad_number_reports_line() {
        let err = read("player,date,rhr\np1,2024-09-23,50\np1,2024-09-24,fast\n").unwrap_err();
        match err {
            ImportError::Parse { line, field, .. } => {
                assert_eq!(line, 3);
                assert_eq!(field, "rhr_bpm");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_date() {
        let err = read("player,date\np1,yesterday\n").unwrap_err();
        assert!(matches!(err, ImportError::Parse { ref field, .. } if field == "record_date"));
    }

    #[test]
    fn test_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 9, 23);
        assert_eq!(CsvImporter::parse_date("2024-09-23"), expected);
        assert_eq!(CsvImporter::parse_date("23.09.2024"), expected);
        assert_eq!(CsvImporter::parse_date("20240923"), expected);
        assert_eq!(CsvImporter::parse_date("09/23/2024"), None);
    }

    #[test]
    fn test_import_file() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "player_id,record_date,training_minutes,srpe_score").unwrap();
        writeln!(file, "p1,2024-09-23,90,7").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "p1,2024-09-24,0,").unwrap();

        let importer = CsvImporter::new();
        assert!(importer.can_import(file.path()));

        let records = importer.import_file(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].training_load_au(), 630);
    }
}
