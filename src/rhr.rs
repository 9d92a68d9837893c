//! Resting heart rate drift
//!
//! Morning resting heart rate is compared with the player's own baseline, the
//! mean of the preceding days' readings (the current day is never part of its
//! own baseline). A sustained rise above baseline is a classic autonomic
//! fatigue or illness signal.
//!
//! # Canonical bands
//!
//! Classification uses the magnitude of the deviation:
//!
//! | \|difference\| (bpm) | status |
//! |---------------------|--------|
//! | <= 5                | green  |
//! | (5, 10]             | yellow |
//! | (10, 15]            | orange |
//! | > 15                | red    |

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::risk::RiskLevel;
use crate::window::{days_before, RecordWindow};

/// RHR status relative to baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RhrStatus {
    Green,
    Yellow,
    Orange,
    Red,
    /// No reading today or no baseline yet
    Gray,
}

impl RhrStatus {
    /// Determine status from the signed deviation
    pub fn from_difference(difference: Decimal, config: &RhrConfig) -> Self {
        let magnitude = difference.abs();

        if magnitude <= config.green_max {
            RhrStatus::Green
        } else if magnitude <= config.yellow_max {
            RhrStatus::Yellow
        } else if magnitude <= config.orange_max {
            RhrStatus::Orange
        } else {
            RhrStatus::Red
        }
    }

    pub fn severity(&self) -> RiskLevel {
        match self {
            RhrStatus::Gray => RiskLevel::NoData,
            RhrStatus::Green => RiskLevel::Low,
            RhrStatus::Yellow | RhrStatus::Orange => RiskLevel::Moderate,
            RhrStatus::Red => RiskLevel::High,
        }
    }
}

impl fmt::Display for RhrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RhrStatus::Green => write!(f, "green"),
            RhrStatus::Yellow => write!(f, "yellow"),
            RhrStatus::Orange => write!(f, "orange"),
            RhrStatus::Red => write!(f, "red"),
            RhrStatus::Gray => write!(f, "gray"),
        }
    }
}

/// RHR evaluation for one reference date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhrMetric {
    /// Today's reading
    pub current_rhr: Option<i32>,

    /// Mean of the prior readings in the baseline window
    pub baseline_rhr: Option<Decimal>,

    /// current - baseline, positive means elevated
    pub difference: Option<Decimal>,

    pub status: RhrStatus,
}

/// RHR baseline and band configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RhrConfig {
    /// Days before the reference date averaged into the baseline (default: 7)
    pub baseline_window_days: u16,

    /// Prior readings required for a usable baseline (default: 1)
    pub min_baseline_days: u16,

    /// Largest |difference| still green (default: 5)
    pub green_max: Decimal,

    /// Largest |difference| still yellow (default: 10)
    pub yellow_max: Decimal,

    /// Largest |difference| still orange (default: 15)
    pub orange_max: Decimal,
}

impl Default for RhrConfig {
    fn default() -> Self {
        RhrConfig {
            baseline_window_days: 7,
            min_baseline_days: 1,
            green_max: dec!(5),
            yellow_max: dec!(10),
            orange_max: dec!(15),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RhrEvaluator {
    config: RhrConfig,
}

impl RhrEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RhrConfig) -> Self {
        RhrEvaluator { config }
    }

    pub fn config(&self) -> &RhrConfig {
        &self.config
    }

    /// Evaluate the window's end date against its baseline
    pub fn evaluate(&self, window: &RecordWindow) -> RhrMetric {
        let date = window.end();
        let current_rhr = window.get(date).and_then(|r| r.rhr_bpm);
        let baseline_rhr = self.baseline(window);

        match (current_rhr, baseline_rhr) {
            (Some(current), Some(baseline)) => {
                let difference = Decimal::from(current) - baseline;
                RhrMetric {
                    current_rhr,
                    baseline_rhr,
                    difference: Some(difference),
                    status: RhrStatus::from_difference(difference, &self.config),
                }
            }
            _ => RhrMetric {
                current_rhr,
                baseline_rhr,
                difference: None,
                status: RhrStatus::Gray,
            },
        }
    }

    /// Mean RHR over the baseline window, excluding the reference date
    pub fn baseline(&self, window: &RecordWindow) -> Option<Decimal> {
        let date = window.end();
        let days = u64::from(self.config.baseline_window_days.max(1));
        let start = days_before(date, days);
        let end = days_before(date, 1);

        let readings: Vec<i32> = window.range(start, end).filter_map(|r| r.rhr_bpm).collect();

        if readings.is_empty() || readings.len() < usize::from(self.config.min_baseline_days) {
            return None;
        }

        let sum: i64 = readings.iter().map(|&v| i64::from(v)).sum();
        Some(Decimal::from(sum) / Decimal::from(readings.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DailyRecord;
    use chrono::NaiveDate;

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 28).unwrap()
    }

    fn rhr_record(days_ago: u64, bpm: i32) -> DailyRecord {
        DailyRecord::new("p1", days_before(reference_date(), days_ago)).with_rhr(bpm)
    }

    fn evaluate(records: &[DailyRecord]) -> RhrMetric {
        let window = RecordWindow::ending_at("p1", reference_date(), 28, records);
        RhrEvaluator::new().evaluate(&window)
    }

    #[test]
    fn test_rhr_status_from_difference() {
        let config = RhrConfig::default();
        assert_eq!(RhrStatus::from_difference(dec!(0), &config), RhrStatus::Green);
        assert_eq!(RhrStatus::from_difference(dec!(5), &config), RhrStatus::Green);
        assert_eq!(RhrStatus::from_difference(dec!(5.1), &config), RhrStatus::Yellow);
        assert_eq!(RhrStatus::from_difference(dec!(10), &config), RhrStatus::Yellow);
        assert_eq!(RhrStatus::from_difference(dec!(12), &config), RhrStatus::Orange);
        assert_eq!(RhrStatus::from_difference(dec!(15), &config), RhrStatus::Orange);
        assert_eq!(RhrStatus::from_difference(dec!(16), &config), RhrStatus::Red);
    }

    #[test]
    fn test_large_drop_uses_magnitude() {
        let config = RhrConfig::default();
        assert_eq!(RhrStatus::from_difference(dec!(-8), &config), RhrStatus::Yellow);
        assert_eq!(RhrStatus::from_difference(dec!(-20), &config), RhrStatus::Red);
    }

    #[test]
    fn test_elevated_rhr() {
        let mut records: Vec<_> = (1..=7).map(|d| rhr_record(d, 50)).collect();
        records.push(rhr_record(0, 62));

        let metric = evaluate(&records);
        assert_eq!(metric.current_rhr, Some(62));
        assert_eq!(metric.baseline_rhr, Some(dec!(50)));
        assert_eq!(metric.difference, Some(dec!(12)));
        assert_eq!(metric.status, RhrStatus::Orange);
    }

    #[test]
    fn test_baseline_excludes_today_and_older_days() {
        let records = vec![
            rhr_record(0, 90),
            rhr_record(1, 50),
            rhr_record(2, 54),
            // Outside the 7-day baseline window
            rhr_record(8, 80),
        ];

        let metric = evaluate(&records);
        assert_eq!(metric.baseline_rhr, Some(dec!(52)));
        assert_eq!(metric.difference, Some(dec!(38)));
        assert_eq!(metric.status, RhrStatus::Red);
    }

    #[test]
    fn test_fractional_baseline() {
        let records = vec![rhr_record(0, 53), rhr_record(1, 50), rhr_record(2, 51), rhr_record(3, 51)];

        let metric = evaluate(&records);
        let baseline = metric.baseline_rhr.unwrap();
        assert_eq!(baseline.round_dp(2), dec!(50.67));
        assert_eq!(metric.status, RhrStatus::Green);
    }

    #[test]
    fn test_no_reading_today_is_gray() {
        let records: Vec<_> = (1..=7).map(|d| rhr_record(d, 50)).collect();

        let metric = evaluate(&records);
        assert_eq!(metric.current_rhr, None);
        assert_eq!(metric.baseline_rhr, Some(dec!(50)));
        assert_eq!(metric.difference, None);
        assert_eq!(metric.status, RhrStatus::Gray);
    }

    #[test]
    fn test_no_baseline_is_gray() {
        let metric = evaluate(&[rhr_record(0, 60)]);
        assert_eq!(metric.current_rhr, Some(60));
        assert_eq!(metric.baseline_rhr, None);
        assert_eq!(metric.difference, None);
        assert_eq!(metric.status, RhrStatus::Gray);
    }

    #[test]
    fn test_min_baseline_days() {
        let evaluator = RhrEvaluator::with_config(RhrConfig {
            min_baseline_days: 3,
            ..RhrConfig::default()
        });
        let records = vec![rhr_record(0, 60), rhr_record(1, 50), rhr_record(2, 50)];
        let window = RecordWindow::ending_at("p1", reference_date(), 28, &records);

        assert_eq!(evaluator.evaluate(&window).status, RhrStatus::Gray);
    }
}
