//! Overall risk from the four independent metric statuses
//!
//! Each status maps to a severity rank (no data 0, green 1, yellow/orange 2,
//! red/black 3). A player's overall level is the highest rank across the
//! metrics, and the metric that produced it is reported as the cause. A day
//! with no report and no ACWR baseline therefore collapses to "no data",
//! never to "low risk".

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::metric::MetricKind;
use crate::models::FatigueMetrics;

/// Severity rank shared by all metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum RiskLevel {
    NoData,
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn rank(&self) -> u8 {
        match self {
            RiskLevel::NoData => 0,
            RiskLevel::Low => 1,
            RiskLevel::Moderate => 2,
            RiskLevel::High => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::NoData => "No data",
            RiskLevel::Low => "Good",
            RiskLevel::Moderate => "Caution",
            RiskLevel::High => "High risk",
        }
    }
}

impl From<RiskLevel> for u8 {
    fn from(level: RiskLevel) -> u8 {
        level.rank()
    }
}

impl TryFrom<u8> for RiskLevel {
    type Error = String;

    fn try_from(rank: u8) -> Result<Self, Self::Error> {
        match rank {
            0 => Ok(RiskLevel::NoData),
            1 => Ok(RiskLevel::Low),
            2 => Ok(RiskLevel::Moderate),
            3 => Ok(RiskLevel::High),
            _ => Err(format!("Invalid risk level: {}", rank)),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Overall level and the metric that triggered it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallRisk {
    pub level: RiskLevel,
    /// Only set for moderate and high levels
    pub cause: Option<MetricKind>,
}

impl OverallRisk {
    pub fn is_at_risk(&self) -> bool {
        self.level >= RiskLevel::Moderate
    }
}

pub struct RiskCombiner;

impl RiskCombiner {
    /// Combine the four statuses into one overall level
    ///
    /// Ties go to the metric listed first (ACWR, RHR, Wellness, sRPE).
    pub fn combine(metrics: &FatigueMetrics) -> OverallRisk {
        let mut level = RiskLevel::NoData;
        let mut cause = None;

        for metric in metrics.iter() {
            let severity = metric.severity();
            if severity > level {
                level = severity;
                cause = Some(metric.kind());
            }
        }

        OverallRisk {
            level,
            cause: cause.filter(|_| level >= RiskLevel::Moderate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acwr::{AcwrMetric, AcwrRiskLevel};
    use crate::models::WellnessItems;
    use crate::rhr::{RhrMetric, RhrStatus};
    use crate::srpe::{SrpeMetric, SrpeStatus};
    use crate::wellness::{WellnessMetric, WellnessStatus};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn metrics(acwr: AcwrRiskLevel, rhr: RhrStatus, wellness: Option<WellnessStatus>, srpe: Option<SrpeStatus>) -> FatigueMetrics {
        FatigueMetrics {
            acwr: AcwrMetric {
                acute_load: Decimal::ZERO,
                chronic_load: Decimal::ZERO,
                acwr: if acwr == AcwrRiskLevel::Gray { None } else { Some(dec!(1.0)) },
                risk_level: acwr,
            },
            rhr: RhrMetric {
                current_rhr: None,
                baseline_rhr: None,
                difference: None,
                status: rhr,
            },
            wellness: wellness.map(|status| WellnessMetric {
                items: WellnessItems::uniform(3),
                total: 15,
                status,
            }),
            srpe: srpe.map(|status| SrpeMetric { load_au: 300, status }),
        }
    }

    #[test]
    fn test_no_data_collapses_to_zero() {
        let overall = RiskCombiner::combine(&metrics(AcwrRiskLevel::Gray, RhrStatus::Gray, None, None));
        assert_eq!(overall.level, RiskLevel::NoData);
        assert_eq!(overall.cause, None);
        assert!(!overall.is_at_risk());
    }

    #[test]
    fn test_stale_green_is_not_no_data() {
        let overall = RiskCombiner::combine(&metrics(AcwrRiskLevel::Green, RhrStatus::Gray, None, None));
        assert_eq!(overall.level, RiskLevel::Low);
        assert_eq!(overall.cause, None);
    }

    #[test]
    fn test_max_severity_wins() {
        let overall = RiskCombiner::combine(&metrics(
            AcwrRiskLevel::Yellow,
            RhrStatus::Green,
            Some(WellnessStatus::Red),
            Some(SrpeStatus::Green),
        ));
        assert_eq!(overall.level, RiskLevel::High);
        assert_eq!(overall.cause, Some(MetricKind::Wellness));
    }

    #[test]
    fn test_tie_goes_to_first_metric() {
        let overall = RiskCombiner::combine(&metrics(
            AcwrRiskLevel::Green,
            RhrStatus::Orange,
            Some(WellnessStatus::Yellow),
            Some(SrpeStatus::Yellow),
        ));
        assert_eq!(overall.level, RiskLevel::Moderate);
        assert_eq!(overall.cause, Some(MetricKind::Rhr));
    }

    #[test]
    fn test_black_acwr_is_high() {
        let overall = RiskCombiner::combine(&metrics(AcwrRiskLevel::Black, RhrStatus::Red, None, None));
        assert_eq!(overall.level, RiskLevel::High);
        assert_eq!(overall.cause, Some(MetricKind::Acwr));
    }

    #[test]
    fn test_risk_level_serializes_as_rank() {
        assert_eq!(serde_json::to_string(&RiskLevel::Moderate).unwrap(), "2");
        let level: RiskLevel = serde_json::from_str("3").unwrap();
        assert_eq!(level, RiskLevel::High);
        assert!(serde_json::from_str::<RiskLevel>("7").is_err());
    }
}
