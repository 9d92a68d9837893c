//! Acute:Chronic Workload Ratio
//!
//! Compares short-term training stress (7-day rolling mean of daily sRPE
//! load) with long-term training capacity (28-day rolling mean). A day without
//! a record contributes 0 load to both windows, so gaps lower the chronic
//! load rather than being excluded from the denominator.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::risk::RiskLevel;
use crate::window::{days_before, RecordWindow};

/// ACWR risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcwrRiskLevel {
    /// Inside the sweet spot
    Green,
    /// Slightly above the sweet spot, or under-loaded
    Yellow,
    /// Danger zone
    Red,
    /// Very high risk
    Black,
    /// No chronic load yet, ratio undefined
    Gray,
}

impl AcwrRiskLevel {
    /// Classify a ratio against configured bands, first match wins
    pub fn classify(ratio: Option<Decimal>, config: &AcwrConfig) -> Self {
        let Some(ratio) = ratio else {
            return AcwrRiskLevel::Gray;
        };

        if ratio >= config.very_high_risk_threshold {
            AcwrRiskLevel::Black
        } else if ratio > config.high_risk_threshold {
            AcwrRiskLevel::Red
        } else if ratio >= config.sweet_spot_min && ratio <= config.sweet_spot_max {
            AcwrRiskLevel::Green
        } else {
            AcwrRiskLevel::Yellow
        }
    }

    /// Classify a ratio against the default bands
    pub fn from_ratio(ratio: Decimal) -> Self {
        Self::classify(Some(ratio), &AcwrConfig::default())
    }

    pub fn severity(&self) -> RiskLevel {
        match self {
            AcwrRiskLevel::Gray => RiskLevel::NoData,
            AcwrRiskLevel::Green => RiskLevel::Low,
            AcwrRiskLevel::Yellow => RiskLevel::Moderate,
            AcwrRiskLevel::Red | AcwrRiskLevel::Black => RiskLevel::High,
        }
    }

    /// Coaching advice for this level
    pub fn recommendation(&self) -> &'static str {
        match self {
            AcwrRiskLevel::Green => "Normal training",
            AcwrRiskLevel::Yellow => "Monitor for 3 days and avoid sharp load increases",
            AcwrRiskLevel::Red => "Reduce load by 30% immediately",
            AcwrRiskLevel::Black => "Very high injury risk, strict load control required",
            AcwrRiskLevel::Gray => "Keep reporting to build a chronic baseline",
        }
    }
}

impl fmt::Display for AcwrRiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcwrRiskLevel::Green => write!(f, "green"),
            AcwrRiskLevel::Yellow => write!(f, "yellow"),
            AcwrRiskLevel::Red => write!(f, "red"),
            AcwrRiskLevel::Black => write!(f, "black"),
            AcwrRiskLevel::Gray => write!(f, "gray"),
        }
    }
}

/// ACWR result for one reference date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcwrMetric {
    /// Mean daily load over the acute window (AU/day)
    pub acute_load: Decimal,

    /// Mean daily load over the chronic window (AU/day)
    pub chronic_load: Decimal,

    /// Acute / chronic, `None` when the chronic load is zero
    pub acwr: Option<Decimal>,

    pub risk_level: AcwrRiskLevel,
}

impl AcwrMetric {
    /// Ratio rounded to two decimals for display
    pub fn rounded_ratio(&self) -> Option<Decimal> {
        self.acwr.map(|r| r.round_dp(2))
    }
}

/// ACWR configuration with customizable windows and bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcwrConfig {
    /// Acute window in days (default: 7)
    pub acute_window_days: u16,

    /// Chronic window in days (default: 28)
    pub chronic_window_days: u16,

    /// Lower bound of the sweet spot, inclusive (default: 0.80)
    pub sweet_spot_min: Decimal,

    /// Upper bound of the sweet spot, inclusive (default: 1.30)
    pub sweet_spot_max: Decimal,

    /// Ratios strictly above this are red (default: 1.50)
    pub high_risk_threshold: Decimal,

    /// Ratios at or above this are black (default: 2.0)
    pub very_high_risk_threshold: Decimal,

    /// Recorded days required in the chronic window before a ratio is reported
    #[serde(default)]
    pub min_history_days: u16,
}

impl Default for AcwrConfig {
    fn default() -> Self {
        AcwrConfig {
            acute_window_days: 7,
            chronic_window_days: 28,
            sweet_spot_min: dec!(0.80),
            sweet_spot_max: dec!(1.30),
            high_risk_threshold: dec!(1.50),
            very_high_risk_threshold: dec!(2.0),
            min_history_days: 0,
        }
    }
}

/// Core ACWR calculation engine
#[derive(Debug, Clone, Default)]
pub struct AcwrCalculator {
    config: AcwrConfig,
}

impl AcwrCalculator {
    /// Create new ACWR calculator with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create new ACWR calculator with custom configuration
    pub fn with_config(config: AcwrConfig) -> Self {
        AcwrCalculator { config }
    }

    pub fn config(&self) -> &AcwrConfig {
        &self.config
    }

    /// Calculate ACWR for the window's end date
    pub fn calculate(&self, window: &RecordWindow) -> AcwrMetric {
        self.calculate_at(window, window.end())
    }

    /// Calculate ACWR for an arbitrary date covered by the window
    ///
    /// Days of the chronic window that fall before the window start count as
    /// absent (0 load), so callers must size the window to cover them.
    pub fn calculate_at(&self, window: &RecordWindow, date: NaiveDate) -> AcwrMetric {
        let acute_days = self.config.acute_window_days.max(1);
        let chronic_days = self.config.chronic_window_days.max(1);

        let (acute_sum, _) = Self::window_load(window, date, acute_days);
        let (chronic_sum, recorded_days) = Self::window_load(window, date, chronic_days);

        let acute_sum = Decimal::from(acute_sum);
        let chronic_sum = Decimal::from(chronic_sum);
        let acute_load = acute_sum / Decimal::from(acute_days);
        let chronic_load = chronic_sum / Decimal::from(chronic_days);

        // (sum_a / n_a) / (sum_c / n_c) with a single division
        let acwr = if chronic_sum > Decimal::ZERO && recorded_days >= usize::from(self.config.min_history_days) {
            Some((acute_sum * Decimal::from(chronic_days)) / (chronic_sum * Decimal::from(acute_days)))
        } else {
            None
        };

        AcwrMetric {
            acute_load,
            chronic_load,
            acwr,
            risk_level: AcwrRiskLevel::classify(acwr, &self.config),
        }
    }

    /// Sum of daily loads over `days` days ending at `date`, and the number of
    /// recorded days in that span
    fn window_load(window: &RecordWindow, date: NaiveDate, days: u16) -> (u64, usize) {
        let start = days_before(date, u64::from(days) - 1);

        window
            .range(start, date)
            .fold((0u64, 0usize), |(sum, count), record| {
                (sum + u64::from(record.training_load_au()), count + 1)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DailyRecord;

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 28).unwrap()
    }

    /// One record per day for the 28 days ending at the reference date;
    /// `load_for(days_ago)` gives (minutes, rpe)
    fn build_history(load_for: impl Fn(u64) -> Option<(i32, i32)>) -> Vec<DailyRecord> {
        (0..28)
            .filter_map(|days_ago| {
                load_for(days_ago).map(|(minutes, rpe)| {
                    DailyRecord::new("p1", days_before(reference_date(), days_ago)).with_training(minutes, rpe)
                })
            })
            .collect()
    }

    fn window(records: &[DailyRecord]) -> RecordWindow {
        RecordWindow::ending_at("p1", reference_date(), 28, records)
    }

    #[test]
    fn test_steady_load_is_sweet_spot() {
        let records = build_history(|_| Some((50, 2)));
        let metric = AcwrCalculator::new().calculate(&window(&records));

        assert_eq!(metric.acute_load, dec!(100));
        assert_eq!(metric.chronic_load, dec!(100));
        assert_eq!(metric.acwr, Some(Decimal::ONE));
        assert_eq!(metric.risk_level, AcwrRiskLevel::Green);
    }

    #[test]
    fn test_cold_start_is_gray() {
        let metric = AcwrCalculator::new().calculate(&window(&[]));

        assert_eq!(metric.acute_load, Decimal::ZERO);
        assert_eq!(metric.chronic_load, Decimal::ZERO);
        assert_eq!(metric.acwr, None);
        assert_eq!(metric.risk_level, AcwrRiskLevel::Gray);
    }

    #[test]
    fn test_rest_days_only_is_gray() {
        let records = build_history(|_| Some((0, 5)));
        let metric = AcwrCalculator::new().calculate(&window(&records));

        assert_eq!(metric.acwr, None);
        assert_eq!(metric.risk_level, AcwrRiskLevel::Gray);
    }

    #[test]
    fn test_absent_days_count_as_zero_load() {
        // Training only on the 14 most recent days
        let records = build_history(|days_ago| if days_ago < 14 { Some((50, 2)) } else { None });
        let metric = AcwrCalculator::new().calculate(&window(&records));

        // acute = 700/7 = 100, chronic = 1400/28 = 50
        assert_eq!(metric.acute_load, dec!(100));
        assert_eq!(metric.chronic_load, dec!(50));
        assert_eq!(metric.acwr, Some(dec!(2)));
        assert_eq!(metric.risk_level, AcwrRiskLevel::Black);
    }

    #[test]
    fn test_spike_in_last_week() {
        // 21 days at 100 AU then 7 days at 300 AU
        let records = build_history(|days_ago| if days_ago < 7 { Some((60, 5)) } else { Some((20, 5)) });
        let metric = AcwrCalculator::new().calculate(&window(&records));

        assert_eq!(metric.acute_load, dec!(300));
        assert_eq!(metric.chronic_load, dec!(150));
        assert_eq!(metric.acwr, Some(dec!(2)));
        assert_eq!(metric.risk_level, AcwrRiskLevel::Black);
    }

    #[test]
    fn test_deload_week_is_yellow() {
        // 21 days at 400 AU then 7 days at 100 AU
        let records = build_history(|days_ago| if days_ago < 7 { Some((20, 5)) } else { Some((80, 5)) });
        let metric = AcwrCalculator::new().calculate(&window(&records));

        // acute 100, chronic (8400 + 700) / 28 = 325
        assert_eq!(metric.chronic_load, dec!(325));
        assert!(metric.acwr.unwrap() < dec!(0.80));
        assert_eq!(metric.risk_level, AcwrRiskLevel::Yellow);
        assert_eq!(metric.rounded_ratio(), Some(dec!(0.31)));
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(AcwrRiskLevel::from_ratio(dec!(0.79)), AcwrRiskLevel::Yellow);
        assert_eq!(AcwrRiskLevel::from_ratio(dec!(0.80)), AcwrRiskLevel::Green);
        assert_eq!(AcwrRiskLevel::from_ratio(dec!(1.30)), AcwrRiskLevel::Green);
        assert_eq!(AcwrRiskLevel::from_ratio(dec!(1.31)), AcwrRiskLevel::Yellow);
        assert_eq!(AcwrRiskLevel::from_ratio(dec!(1.50)), AcwrRiskLevel::Yellow);
        assert_eq!(AcwrRiskLevel::from_ratio(dec!(1.500001)), AcwrRiskLevel::Red);
        assert_eq!(AcwrRiskLevel::from_ratio(dec!(1.99)), AcwrRiskLevel::Red);
        assert_eq!(AcwrRiskLevel::from_ratio(dec!(2.0)), AcwrRiskLevel::Black);
        assert_eq!(AcwrRiskLevel::classify(None, &AcwrConfig::default()), AcwrRiskLevel::Gray);
    }

    #[test]
    fn test_min_history_days() {
        let config = AcwrConfig {
            min_history_days: 7,
            ..AcwrConfig::default()
        };
        let calculator = AcwrCalculator::with_config(config);

        let few = build_history(|days_ago| if days_ago < 3 { Some((60, 5)) } else { None });
        assert_eq!(calculator.calculate(&window(&few)).risk_level, AcwrRiskLevel::Gray);

        let enough = build_history(|days_ago| if days_ago < 7 { Some((60, 5)) } else { None });
        assert!(calculator.calculate(&window(&enough)).acwr.is_some());
    }

    #[test]
    fn test_calculate_at_earlier_date() {
        let records = build_history(|days_ago| if days_ago == 0 { Some((60, 10)) } else { Some((50, 2)) });
        let calculator = AcwrCalculator::new();
        let w = window(&records);

        // The spike on the reference day is invisible one day earlier
        let yesterday = calculator.calculate_at(&w, days_before(reference_date(), 1));
        assert_eq!(yesterday.acute_load, dec!(100));

        let today = calculator.calculate(&w);
        assert!(today.acute_load > yesterday.acute_load);
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(AcwrRiskLevel::Gray.severity(), RiskLevel::NoData);
        assert_eq!(AcwrRiskLevel::Green.severity(), RiskLevel::Low);
        assert_eq!(AcwrRiskLevel::Yellow.severity(), RiskLevel::Moderate);
        assert_eq!(AcwrRiskLevel::Red.severity(), RiskLevel::High);
        assert_eq!(AcwrRiskLevel::Black.severity(), RiskLevel::High);
    }
}
