use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{DailyRecord, WellnessItems};
use crate::risk::RiskLevel;

/// Wellness classification of a total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WellnessStatus {
    Green,
    Yellow,
    Red,
}

impl WellnessStatus {
    pub fn from_total(total: u32, config: &WellnessConfig) -> Self {
        if total >= config.green_min {
            WellnessStatus::Green
        } else if total >= config.yellow_min {
            WellnessStatus::Yellow
        } else {
            WellnessStatus::Red
        }
    }

    pub fn severity(&self) -> RiskLevel {
        match self {
            WellnessStatus::Green => RiskLevel::Low,
            WellnessStatus::Yellow => RiskLevel::Moderate,
            WellnessStatus::Red => RiskLevel::High,
        }
    }
}

impl fmt::Display for WellnessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WellnessStatus::Green => write!(f, "green"),
            WellnessStatus::Yellow => write!(f, "yellow"),
            WellnessStatus::Red => write!(f, "red"),
        }
    }
}

/// Today's wellness score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellnessMetric {
    pub items: WellnessItems,
    /// Sum of the five sub-scores, 5-25
    pub total: u32,
    pub status: WellnessStatus,
}

/// Wellness total thresholds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellnessConfig {
    /// Lowest green total (default: 20)
    pub green_min: u32,
    /// Lowest yellow total (default: 15)
    pub yellow_min: u32,
}

impl Default for WellnessConfig {
    fn default() -> Self {
        WellnessConfig {
            green_min: 20,
            yellow_min: 15,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WellnessEvaluator {
    config: WellnessConfig,
}

impl WellnessEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: WellnessConfig) -> Self {
        WellnessEvaluator { config }
    }

    /// Score today's report, `None` unless all five sub-scores were given
    pub fn evaluate(&self, today: Option<&DailyRecord>) -> Option<WellnessMetric> {
        today.and_then(DailyRecord::wellness_items).map(|items| self.score(items))
    }

    pub fn score(&self, items: WellnessItems) -> WellnessMetric {
        let total = items.total();
        WellnessMetric {
            items,
            total,
            status: WellnessStatus::from_total(total, &self.config),
        }
    }
}
