use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::acwr::{AcwrMetric, AcwrRiskLevel};
use crate::metric::MetricKind;
use crate::rhr::RhrMetric;
use crate::risk::OverallRisk;
use crate::srpe::SrpeMetric;
use crate::wellness::WellnessMetric;

/// One player's self-report for one calendar day
///
/// Raw integer fields are kept signed so that out-of-range values coming from
/// a store can be represented and rejected by validation instead of being
/// silently coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Opaque player identifier owned by the record store
    pub player_id: String,

    /// Calendar day of the report
    pub record_date: NaiveDate,

    /// Resting heart rate on waking, in beats per minute
    #[serde(default)]
    pub rhr_bpm: Option<i32>,

    /// Sleep quality (1-5, higher is better)
    #[serde(default)]
    pub sleep_quality: Option<i32>,

    /// Stress level (1-5, higher is better)
    #[serde(default)]
    pub stress_level: Option<i32>,

    /// Fatigue level (1-5, higher is better)
    #[serde(default)]
    pub fatigue_level: Option<i32>,

    /// Muscle soreness (1-5, higher is better)
    #[serde(default)]
    pub muscle_soreness: Option<i32>,

    /// Mood (1-5, higher is better)
    #[serde(default)]
    pub mood: Option<i32>,

    /// Total training duration for the day
    ///
    /// `Some(0)` is an explicitly logged rest day, `None` means the training
    /// part of the report was left empty.
    #[serde(default)]
    pub training_minutes: Option<i32>,

    /// Session rating of perceived exertion (1-10)
    #[serde(default)]
    pub srpe_score: Option<i32>,

    /// Free text, not used by the metrics engine
    #[serde(default)]
    pub feedback: Option<String>,
}

impl DailyRecord {
    /// Create an empty report for a player and date
    pub fn new(player_id: impl Into<String>, record_date: NaiveDate) -> Self {
        DailyRecord {
            player_id: player_id.into(),
            record_date,
            rhr_bpm: None,
            sleep_quality: None,
            stress_level: None,
            fatigue_level: None,
            muscle_soreness: None,
            mood: None,
            training_minutes: None,
            srpe_score: None,
            feedback: None,
        }
    }

    pub fn with_rhr(mut self, rhr_bpm: i32) -> Self {
        self.rhr_bpm = Some(rhr_bpm);
        self
    }

    pub fn with_training(mut self, minutes: i32, srpe_score: i32) -> Self {
        self.training_minutes = Some(minutes);
        self.srpe_score = Some(srpe_score);
        self
    }

    /// Log the day as an explicit rest day
    pub fn with_rest_day(mut self) -> Self {
        self.training_minutes = Some(0);
        self.srpe_score = None;
        self
    }

    /// Set all five wellness sub-scores
    pub fn with_wellness(mut self, items: WellnessItems) -> Self {
        self.sleep_quality = Some(i32::from(items.sleep));
        self.fatigue_level = Some(i32::from(items.fatigue));
        self.mood = Some(i32::from(items.mood));
        self.stress_level = Some(i32::from(items.stress));
        self.muscle_soreness = Some(i32::from(items.soreness));
        self
    }

    /// Training load in arbitrary units (minutes x sRPE)
    ///
    /// Always derived from the raw fields. Missing minutes or sRPE, a rest
    /// day or a non-positive field contribute 0.
    pub fn training_load_au(&self) -> u32 {
        match (self.training_minutes, self.srpe_score) {
            (Some(minutes), Some(rpe)) if minutes > 0 && rpe > 0 => (minutes as u32).saturating_mul(rpe as u32),
            _ => 0,
        }
    }

    /// True only if the player explicitly logged zero training minutes
    pub fn is_rest_day(&self) -> bool {
        self.training_minutes == Some(0)
    }

    /// True if the day's training part of the report is complete
    ///
    /// A rest day needs no sRPE. A training day needs both minutes and an
    /// sRPE, and an empty training section is no report at all.
    pub fn has_training_report(&self) -> bool {
        match self.training_minutes {
            Some(0) => true,
            Some(_) => self.srpe_score.is_some(),
            None => false,
        }
    }

    /// All five wellness sub-scores, or `None` if any is missing
    pub fn wellness_items(&self) -> Option<WellnessItems> {
        let score = |value: Option<i32>| value.and_then(|v| u8::try_from(v).ok());

        Some(WellnessItems {
            sleep: score(self.sleep_quality)?,
            fatigue: score(self.fatigue_level)?,
            mood: score(self.mood)?,
            stress: score(self.stress_level)?,
            soreness: score(self.muscle_soreness)?,
        })
    }
}

/// The five wellness sub-scores of one report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellnessItems {
    pub sleep: u8,
    pub fatigue: u8,
    pub mood: u8,
    pub stress: u8,
    pub soreness: u8,
}

impl WellnessItems {
    /// Same value for every sub-score
    pub fn uniform(score: u8) -> Self {
        WellnessItems {
            sleep: score,
            fatigue: score,
            mood: score,
            stress: score,
            soreness: score,
        }
    }

    /// Sum of the five sub-scores (5-25 for valid reports)
    pub fn total(&self) -> u32 {
        [self.sleep, self.fatigue, self.mood, self.stress, self.soreness]
            .iter()
            .map(|&v| u32::from(v))
            .sum()
    }
}

/// The four metric branches computed for one player on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueMetrics {
    pub acwr: AcwrMetric,
    pub rhr: RhrMetric,
    /// `None` when no complete wellness report exists for the day
    pub wellness: Option<WellnessMetric>,
    /// `None` when no training report exists for the day
    pub srpe: Option<SrpeMetric>,
}

/// How many of the four metrics could be established for the day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataCompleteness {
    pub filled: usize,
    pub total: usize,
    pub missing: Vec<MetricKind>,
}

impl DataCompleteness {
    pub fn is_complete(&self) -> bool {
        self.filled == self.total
    }

    /// Filled share as a whole percentage
    pub fn percentage(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.filled * 100 + self.total / 2) / self.total) as u8
    }
}

/// Complete fatigue assessment of one player on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueStatus {
    pub player_id: String,
    pub date: NaiveDate,
    pub overall: OverallRisk,
    /// Today's report exists and logs no training
    pub is_rest_day: bool,
    pub completeness: DataCompleteness,
    pub metrics: FatigueMetrics,
}

/// One day of the ACWR trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueHistoryPoint {
    pub date: NaiveDate,
    pub acwr: Option<Decimal>,
    pub acute_load: Decimal,
    pub chronic_load: Decimal,
    pub risk_level: AcwrRiskLevel,
}

/// Days without a training report immediately before a reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingReportStreak {
    pub reference_date: NaiveDate,
    /// Consecutive missing days counted back from yesterday
    pub consecutive_days: u16,
}

impl MissingReportStreak {
    /// Number of missed days that triggers a reminder
    pub const REMINDER_THRESHOLD: u16 = 2;

    pub fn needs_reminder(&self) -> bool {
        self.consecutive_days >= Self::REMINDER_THRESHOLD
    }
}
