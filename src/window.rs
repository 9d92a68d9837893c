//! Immutable, validated slice of one player's history
//!
//! Every metric branch reads from a `RecordWindow` rather than from the raw
//! record list, so filtering (other players, out-of-range dates), validation
//! and duplicate handling happen exactly once per evaluation.

use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::models::DailyRecord;
use crate::validation::RecordValidator;

/// The date `days` calendar days before `date`, saturating at the earliest date
pub fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

/// Validated records of one player keyed by date
#[derive(Debug, Clone)]
pub struct RecordWindow {
    player_id: String,
    start: NaiveDate,
    end: NaiveDate,
    records: BTreeMap<NaiveDate, DailyRecord>,
    rejected: usize,
}

impl RecordWindow {
    /// Build a window over `start..=end` from records in any order
    ///
    /// Records of other players or outside the range are ignored. Records that
    /// fail validation are logged and skipped. When a date appears more than
    /// once the first record wins.
    pub fn build(player_id: &str, start: NaiveDate, end: NaiveDate, records: &[DailyRecord]) -> Self {
        let mut window = BTreeMap::new();
        let mut rejected = 0;

        for record in records {
            if record.player_id != player_id {
                debug!(
                    expected = player_id,
                    found = %record.player_id,
                    "Ignoring record of another player"
                );
                continue;
            }
            if record.record_date < start || record.record_date > end {
                continue;
            }
            if let Err(e) = RecordValidator::validate(record) {
                warn!(player_id, date = %record.record_date, error = %e, "Skipping malformed record");
                rejected += 1;
                continue;
            }
            if window.contains_key(&record.record_date) {
                warn!(player_id, date = %record.record_date, "Duplicate record for date, keeping the first");
                continue;
            }
            window.insert(record.record_date, record.clone());
        }

        debug!(
            player_id,
            %start,
            %end,
            records = window.len(),
            rejected,
            "Built record window"
        );

        RecordWindow {
            player_id: player_id.to_string(),
            start,
            end,
            records: window,
            rejected,
        }
    }

    /// Build a window of `days` calendar days ending at `end` inclusive
    pub fn ending_at(player_id: &str, end: NaiveDate, days: u16, records: &[DailyRecord]) -> Self {
        let start = days_before(end, u64::from(days.max(1)) - 1);
        Self::build(player_id, start, end, records)
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Record for a date, if one was reported and valid
    pub fn get(&self, date: NaiveDate) -> Option<&DailyRecord> {
        self.records.get(&date)
    }

    /// Records within `start..=end` in date order
    pub fn range(&self, start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = &DailyRecord> {
        let upper = end.max(start);
        self.records.range(start..=upper).map(|(_, r)| r).filter(move |_| start <= end)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records dropped by validation
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}
