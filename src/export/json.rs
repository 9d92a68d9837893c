use std::io::Write;
use std::path::Path;

use crate::error::{FatigueError, Result};

/// Write any serializable value as pretty JSON
pub fn write_json<T, W>(data: &T, mut writer: W) -> Result<()>
where
    T: serde::Serialize + ?Sized,
    W: Write,
{
    let json_data = serde_json::to_string_pretty(data).map_err(|e| FatigueError::Export(e.to_string()))?;
    writer.write_all(json_data.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Export any serializable data structure to a JSON file
pub fn export_json<T, P>(data: &T, output_path: P) -> Result<()>
where
    T: serde::Serialize + ?Sized,
    P: AsRef<Path>,
{
    let file = std::fs::File::create(output_path)?;
    write_json(data, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FatigueMetricsEngine;
    use crate::models::DailyRecord;
    use chrono::NaiveDate;
    use tempfile::NamedTempFile;

    #[test]
    fn test_export_status() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 28).unwrap();
        let records = vec![DailyRecord::new("p1", date).with_training(60, 8)];
        let status = FatigueMetricsEngine::new().evaluate("p1", date, &records);

        let temp_file = NamedTempFile::new().unwrap();
        export_json(&status, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("\"player_id\": \"p1\""));
        assert!(content.contains("\"load_au\": 480"));
        assert!(content.contains("\"risk_level\": \"black\""));
        assert!(content.contains("\"cause\": \"acwr\""));
        assert!(content.contains("\"level\": 3"));
    }

    #[test]
    fn test_write_json_slice() {
        let mut buffer = Vec::new();
        write_json(&[1, 2, 3][..], &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "[\n  1,\n  2,\n  3\n]\n");
    }
}
