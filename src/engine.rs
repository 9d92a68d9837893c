//! Fatigue metrics engine
//!
//! Stateless: every call builds a fresh [`RecordWindow`] from the records it
//! is handed (or fetches them from a [`RecordStore`]) and runs the four
//! metric branches over it. The engine holds configuration only, so one
//! instance can be shared across threads.

use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::acwr::AcwrCalculator;
use crate::config::MetricsConfig;
use crate::error::Result;
use crate::metric::MetricKind;
use crate::models::{DailyRecord, DataCompleteness, FatigueHistoryPoint, FatigueMetrics, FatigueStatus, MissingReportStreak};
use crate::rhr::RhrEvaluator;
use crate::risk::RiskCombiner;
use crate::srpe::SrpeEvaluator;
use crate::store::RecordStore;
use crate::wellness::WellnessEvaluator;
use crate::window::{days_before, RecordWindow};

/// Days before the reference date searched for missing reports
pub const MISSING_REPORT_LOOKBACK_DAYS: u16 = 7;

#[derive(Debug, Clone, Default)]
pub struct FatigueMetricsEngine {
    acwr: AcwrCalculator,
    rhr: RhrEvaluator,
    wellness: WellnessEvaluator,
    srpe: SrpeEvaluator,
}

impl FatigueMetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MetricsConfig) -> Self {
        FatigueMetricsEngine {
            acwr: AcwrCalculator::with_config(config.acwr),
            rhr: RhrEvaluator::with_config(config.rhr),
            wellness: WellnessEvaluator::with_config(config.wellness),
            srpe: SrpeEvaluator::with_config(config.srpe),
        }
    }

    /// Calendar days of history one evaluation reads, reference date included
    pub fn lookback_days(&self) -> u16 {
        let baseline = self.rhr.config().baseline_window_days.saturating_add(1);
        self.acwr_span().max(baseline)
    }

    /// Days one ACWR point reads, whichever of its windows is longer
    fn acwr_span(&self) -> u16 {
        let config = self.acwr.config();
        config.chronic_window_days.max(config.acute_window_days).max(1)
    }

    /// First date read by an evaluation for `date`
    pub fn window_start(&self, date: NaiveDate) -> NaiveDate {
        days_before(date, u64::from(self.lookback_days()) - 1)
    }

    /// Compute the four metrics for one player on one day
    ///
    /// `records` may be in any order and may contain other players or dates
    /// outside the lookback window; those are ignored.
    pub fn compute_metrics(&self, player_id: &str, reference_date: NaiveDate, records: &[DailyRecord]) -> FatigueMetrics {
        let window = RecordWindow::ending_at(player_id, reference_date, self.lookback_days(), records);
        self.metrics_for(&window)
    }

    /// Metrics plus overall risk, rest-day flag and completeness
    pub fn evaluate(&self, player_id: &str, reference_date: NaiveDate, records: &[DailyRecord]) -> FatigueStatus {
        let window = RecordWindow::ending_at(player_id, reference_date, self.lookback_days(), records);
        self.status_for(&window)
    }

    /// Fetch the lookback window from a store and evaluate it
    #[instrument(skip(self, store))]
    pub fn evaluate_from_store<S>(&self, store: &S, player_id: &str, reference_date: NaiveDate) -> Result<FatigueStatus>
    where
        S: RecordStore + ?Sized,
    {
        let records = store.records_between(player_id, self.window_start(reference_date), reference_date)?;
        Ok(self.evaluate(player_id, reference_date, &records))
    }

    /// One ACWR point per day for the `days` days ending at `end_date`
    pub fn history(&self, player_id: &str, end_date: NaiveDate, days: u16, records: &[DailyRecord]) -> Vec<FatigueHistoryPoint> {
        if days == 0 {
            return Vec::new();
        }

        let window = RecordWindow::build(player_id, self.history_start(end_date, days), end_date, records);

        let points: Vec<FatigueHistoryPoint> = (0..days)
            .rev()
            .map(|offset| days_before(end_date, u64::from(offset)))
            .map(|date| {
                let metric = self.acwr.calculate_at(&window, date);
                FatigueHistoryPoint {
                    date,
                    acwr: metric.acwr,
                    acute_load: metric.acute_load,
                    chronic_load: metric.chronic_load,
                    risk_level: metric.risk_level,
                }
            })
            .collect();

        debug!(player_id, %end_date, days, "Computed ACWR history");
        points
    }

    /// History with records fetched from a store
    pub fn history_from_store<S>(&self, store: &S, player_id: &str, end_date: NaiveDate, days: u16) -> Result<Vec<FatigueHistoryPoint>>
    where
        S: RecordStore + ?Sized,
    {
        if days == 0 {
            return Ok(Vec::new());
        }
        let records = store.records_between(player_id, self.history_start(end_date, days), end_date)?;
        Ok(self.history(player_id, end_date, days, &records))
    }

    /// Consecutive days without a training report, counted back from the day
    /// before `reference_date`
    pub fn missing_report_streak(&self, player_id: &str, reference_date: NaiveDate, records: &[DailyRecord]) -> MissingReportStreak {
        let end = days_before(reference_date, 1);
        let start = days_before(reference_date, u64::from(MISSING_REPORT_LOOKBACK_DAYS));
        let window = RecordWindow::build(player_id, start, end, records);

        let consecutive_days = (1..=MISSING_REPORT_LOOKBACK_DAYS)
            .map(|offset| days_before(reference_date, u64::from(offset)))
            .take_while(|date| !window.get(*date).is_some_and(DailyRecord::has_training_report))
            .count() as u16;

        if consecutive_days >= MissingReportStreak::REMINDER_THRESHOLD {
            debug!(player_id, %reference_date, consecutive_days, "Player is missing reports");
        }

        MissingReportStreak {
            reference_date,
            consecutive_days,
        }
    }

    fn history_start(&self, end_date: NaiveDate, days: u16) -> NaiveDate {
        let span = u64::from(self.acwr_span());
        days_before(end_date, u64::from(days) - 1 + span - 1)
    }

    fn metrics_for(&self, window: &RecordWindow) -> FatigueMetrics {
        let today = window.get(window.end());

        FatigueMetrics {
            acwr: self.acwr.calculate(window),
            rhr: self.rhr.evaluate(window),
            wellness: self.wellness.evaluate(today),
            srpe: self.srpe.evaluate(today),
        }
    }

    fn status_for(&self, window: &RecordWindow) -> FatigueStatus {
        let metrics = self.metrics_for(window);
        let overall = RiskCombiner::combine(&metrics);
        let completeness = completeness(&metrics);
        let is_rest_day = window.get(window.end()).is_some_and(DailyRecord::is_rest_day);

        FatigueStatus {
            player_id: window.player_id().to_string(),
            date: window.end(),
            overall,
            is_rest_day,
            completeness,
            metrics,
        }
    }
}

fn completeness(metrics: &FatigueMetrics) -> DataCompleteness {
    let missing: Vec<MetricKind> = metrics
        .iter()
        .filter(|metric| !metric.is_established())
        .map(|metric| metric.kind())
        .collect();

    DataCompleteness {
        filled: MetricKind::ALL.len() - missing.len(),
        total: MetricKind::ALL.len(),
        missing,
    }
}
