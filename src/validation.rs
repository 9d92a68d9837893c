use crate::error::RecordError;
use crate::models::DailyRecord;

/// Plausible resting heart rate range in bpm
pub const RHR_RANGE: (i32, i32) = (30, 220);
/// Wellness sub-score range
pub const WELLNESS_RANGE: (i32, i32) = (1, 5);
/// sRPE range
pub const SRPE_RANGE: (i32, i32) = (1, 10);
/// Minutes in a day
pub const MAX_TRAINING_MINUTES: i32 = 24 * 60;

/// Validate daily records before aggregation
pub struct RecordValidator;

impl RecordValidator {
    /// Validate a single record
    pub fn validate(record: &DailyRecord) -> Result<(), RecordError> {
        let date = record.record_date;

        if let Some(minutes) = record.training_minutes.filter(|m| *m < 0) {
            return Err(RecordError::NegativeMinutes { date, minutes });
        }
        Self::check_range(date, "training_minutes", record.training_minutes, (0, MAX_TRAINING_MINUTES))?;

        Self::check_range(date, "rhr_bpm", record.rhr_bpm, RHR_RANGE)?;
        Self::check_range(date, "srpe_score", record.srpe_score, SRPE_RANGE)?;

        Self::check_range(date, "sleep_quality", record.sleep_quality, WELLNESS_RANGE)?;
        Self::check_range(date, "stress_level", record.stress_level, WELLNESS_RANGE)?;
        Self::check_range(date, "fatigue_level", record.fatigue_level, WELLNESS_RANGE)?;
        Self::check_range(date, "muscle_soreness", record.muscle_soreness, WELLNESS_RANGE)?;
        Self::check_range(date, "mood", record.mood, WELLNESS_RANGE)?;

        Ok(())
    }

    /// Split records into valid ones and rejected ones with their reasons
    pub fn partition(records: &[DailyRecord]) -> (Vec<&DailyRecord>, Vec<(&DailyRecord, RecordError)>) {
        let mut valid = Vec::with_capacity(records.len());
        let mut rejected = Vec::new();

        for record in records {
            match Self::validate(record) {
                Ok(()) => valid.push(record),
                Err(e) => rejected.push((record, e)),
            }
        }

        (valid, rejected)
    }

    fn check_range(
        date: chrono::NaiveDate,
        field: &'static str,
        value: Option<i32>,
        (min, max): (i32, i32),
    ) -> Result<(), RecordError> {
        match value {
            Some(v) if !(min..=max).contains(&v) => Err(RecordError::OutOfRange {
                date,
                field,
                value: v,
                min,
                max,
            }),
            _ => Ok(()),
        }
    }
}
