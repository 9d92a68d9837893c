use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::error::{FatigueError, Result};
use crate::models::{FatigueHistoryPoint, FatigueStatus};

fn csv_error(e: csv::Error) -> FatigueError {
    FatigueError::Export(e.to_string())
}

/// One row of the ACWR trend export
#[derive(Serialize)]
struct HistoryRow {
    date: NaiveDate,
    acute_load: Decimal,
    chronic_load: Decimal,
    acwr: Option<Decimal>,
    risk_level: String,
}

/// One row per player of a status export
#[derive(Serialize)]
struct StatusRow<'a> {
    player_id: &'a str,
    date: NaiveDate,
    overall_level: u8,
    overall_label: &'static str,
    cause: Option<&'static str>,
    acwr: Option<Decimal>,
    acwr_status: String,
    rhr_bpm: Option<i32>,
    rhr_difference: Option<Decimal>,
    rhr_status: String,
    wellness_total: Option<u32>,
    wellness_status: Option<String>,
    srpe_load_au: Option<u32>,
    srpe_status: Option<String>,
    rest_day: bool,
    completeness_pct: u8,
}

impl<'a> From<&'a FatigueStatus> for StatusRow<'a> {
    fn from(status: &'a FatigueStatus) -> Self {
        let metrics = &status.metrics;
        StatusRow {
            player_id: &status.player_id,
            date: status.date,
            overall_level: status.overall.level.rank(),
            overall_label: status.overall.level.label(),
            cause: status.overall.cause.map(|kind| kind.label()),
            acwr: metrics.acwr.rounded_ratio(),
            acwr_status: metrics.acwr.risk_level.to_string(),
            rhr_bpm: metrics.rhr.current_rhr,
            rhr_difference: metrics.rhr.difference.map(|d| d.round_dp(1)),
            rhr_status: metrics.rhr.status.to_string(),
            wellness_total: metrics.wellness.as_ref().map(|w| w.total),
            wellness_status: metrics.wellness.as_ref().map(|w| w.status.to_string()),
            srpe_load_au: metrics.srpe.as_ref().map(|s| s.load_au),
            srpe_status: metrics.srpe.as_ref().map(|s| s.status.to_string()),
            rest_day: status.is_rest_day,
            completeness_pct: status.completeness.percentage(),
        }
    }
}

/// Write the ACWR trend as CSV, loads and ratios rounded to two decimals
pub fn write_history_csv<W: Write>(points: &[FatigueHistoryPoint], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for point in points {
        csv_writer
            .serialize(HistoryRow {
                date: point.date,
                acute_load: point.acute_load.round_dp(2),
                chronic_load: point.chronic_load.round_dp(2),
                acwr: point.acwr.map(|r| r.round_dp(2)),
                risk_level: point.risk_level.to_string(),
            })
            .map_err(csv_error)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Export the ACWR trend to a CSV file
pub fn export_history_csv<P: AsRef<Path>>(points: &[FatigueHistoryPoint], output_path: P) -> Result<()> {
    let file = std::fs::File::create(output_path)?;
    write_history_csv(points, file)
}

/// Write one summary row per evaluated player
pub fn write_status_csv<W: Write>(statuses: &[FatigueStatus], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for status in statuses {
        csv_writer.serialize(StatusRow::from(status)).map_err(csv_error)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Export player statuses to a CSV file
pub fn export_status_csv<P: AsRef<Path>>(statuses: &[FatigueStatus], output_path: P) -> Result<()> {
    let file = std::fs::File::create(output_path)?;
    write_status_csv(statuses, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FatigueMetricsEngine;
    use crate::models::DailyRecord;
    use crate::window::days_before;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 28).unwrap()
    }

    #[test]
    fn test_history_csv() {
        let records: Vec<_> = (0..30)
            .map(|d| DailyRecord::new("p1", days_before(date(), d)).with_training(50, 2))
            .collect();
        let history = FatigueMetricsEngine::new().history("p1", date(), 2, &records);

        let mut buffer = Vec::new();
        write_history_csv(&history, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "date,acute_load,chronic_load,acwr,risk_level");
        assert_eq!(lines[1], "2024-09-27,100,100,1,green");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_gray_history_has_empty_ratio() {
        let history = FatigueMetricsEngine::new().history("p1", date(), 1, &[]);

        let mut buffer = Vec::new();
        write_history_csv(&history, &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();

        let row = output.lines().nth(1).unwrap();
        assert!(row.starts_with("2024-09-28,"));
        assert!(row.ends_with(",,gray"));
    }

    #[test]
    fn test_status_csv() {
        let records = vec![DailyRecord::new("p1", date()).with_training(60, 8)];
        let status = FatigueMetricsEngine::new().evaluate("p1", date(), &records);

        let mut buffer = Vec::new();
        write_status_csv(&[status], &mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        let mut lines = output.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("player_id,date,overall_level,overall_label,cause,acwr"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("p1,2024-09-28,3,High risk,ACWR,4,black"));
        assert!(row.contains(",480,yellow,"));
    }
}
