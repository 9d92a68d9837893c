use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::DailyRecord;
use crate::risk::RiskLevel;

/// Classification of one day's session load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SrpeStatus {
    Green,
    Yellow,
    Red,
}

impl SrpeStatus {
    pub fn from_load(load_au: u32, config: &SrpeConfig) -> Self {
        if load_au >= config.red_min {
            SrpeStatus::Red
        } else if load_au >= config.yellow_min {
            SrpeStatus::Yellow
        } else {
            SrpeStatus::Green
        }
    }

    pub fn severity(&self) -> RiskLevel {
        match self {
            SrpeStatus::Green => RiskLevel::Low,
            SrpeStatus::Yellow => RiskLevel::Moderate,
            SrpeStatus::Red => RiskLevel::High,
        }
    }
}

impl fmt::Display for SrpeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SrpeStatus::Green => write!(f, "green"),
            SrpeStatus::Yellow => write!(f, "yellow"),
            SrpeStatus::Red => write!(f, "red"),
        }
    }
}

/// Today's session load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrpeMetric {
    /// minutes x sRPE, in arbitrary units
    pub load_au: u32,
    pub status: SrpeStatus,
}

/// Session load thresholds in AU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrpeConfig {
    /// Lowest yellow load (default: 400)
    pub yellow_min: u32,
    /// Lowest red load (default: 800)
    pub red_min: u32,
}

impl Default for SrpeConfig {
    fn default() -> Self {
        SrpeConfig {
            yellow_min: 400,
            red_min: 800,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SrpeEvaluator {
    config: SrpeConfig,
}

impl SrpeEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SrpeConfig) -> Self {
        SrpeEvaluator { config }
    }

    /// Classify today's load
    ///
    /// `None` unless the day carries a complete training report. Only an
    /// explicit rest day (zero minutes) scores 0 AU.
    pub fn evaluate(&self, today: Option<&DailyRecord>) -> Option<SrpeMetric> {
        let record = today.filter(|r| r.has_training_report())?;
        let load_au = record.training_load_au();

        Some(SrpeMetric {
            load_au,
            status: SrpeStatus::from_load(load_au, &self.config),
        })
    }
}
