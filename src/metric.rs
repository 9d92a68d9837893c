//! The four metric kinds as a closed sum type
//!
//! Display code, completeness checks and the risk combiner all dispatch on
//! [`Metric`] by exhaustive match, so adding a metric kind is a compile error
//! everywhere it is not yet handled.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::acwr::AcwrMetric;
use crate::models::FatigueMetrics;
use crate::rhr::RhrMetric;
use crate::risk::RiskLevel;
use crate::srpe::SrpeMetric;
use crate::wellness::WellnessMetric;

/// Identifies one of the four metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Acwr,
    Rhr,
    Wellness,
    Srpe,
}

impl MetricKind {
    /// All kinds in display order
    pub const ALL: [MetricKind; 4] = [MetricKind::Acwr, MetricKind::Rhr, MetricKind::Wellness, MetricKind::Srpe];

    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Acwr => "ACWR",
            MetricKind::Rhr => "RHR",
            MetricKind::Wellness => "Wellness",
            MetricKind::Srpe => "sRPE",
        }
    }

    pub fn full_label(&self) -> &'static str {
        match self {
            MetricKind::Acwr => "Acute:Chronic Workload Ratio",
            MetricKind::Rhr => "Morning resting heart rate",
            MetricKind::Wellness => "Wellness score",
            MetricKind::Srpe => "Today's training load",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::Acwr => "",
            MetricKind::Rhr => "bpm",
            MetricKind::Wellness => "pts",
            MetricKind::Srpe => "AU",
        }
    }

    /// Reference table for the default thresholds
    pub fn reference_bands(&self) -> &'static [ReferenceBand] {
        match self {
            MetricKind::Acwr => ACWR_BANDS,
            MetricKind::Rhr => RHR_BANDS,
            MetricKind::Wellness => WELLNESS_BANDS,
            MetricKind::Srpe => SRPE_BANDS,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "acwr" => Ok(MetricKind::Acwr),
            "rhr" => Ok(MetricKind::Rhr),
            "wellness" => Ok(MetricKind::Wellness),
            "srpe" | "rpe" => Ok(MetricKind::Srpe),
            _ => Err(format!("Unknown metric: {} (expected acwr, rhr, wellness or srpe)", s)),
        }
    }
}

/// One row of a metric's reference table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReferenceBand {
    pub range: &'static str,
    pub status: &'static str,
    pub label: &'static str,
    pub advice: &'static str,
}

const fn band(range: &'static str, status: &'static str, label: &'static str, advice: &'static str) -> ReferenceBand {
    ReferenceBand { range, status, label, advice }
}

static ACWR_BANDS: &[ReferenceBand] = &[
    band("0.80 - 1.30", "green", "Sweet spot", "Normal training"),
    band("1.31 - 1.50", "yellow", "Caution", "Monitor for 3 days and avoid sharp load increases"),
    band("1.51 - 1.99", "red", "Danger zone", "Reduce load by 30% immediately"),
    band(">= 2.0", "black", "Very high risk", "Injury risk is several times baseline, strict load control required"),
    band("< 0.80", "yellow", "Under-loaded", "Too little load can reduce fitness and raise future injury risk"),
    band("N/A", "gray", "No baseline", "No training load recorded in the last 28 days"),
];

static RHR_BANDS: &[ReferenceBand] = &[
    band("within 5 bpm", "green", "Normal", "Recovery is adequate"),
    band("5.1 - 10 bpm", "yellow", "Elevated", "Reduce training volume by 20%"),
    band("10.1 - 15 bpm", "orange", "High", "Light session only, check for illness"),
    band("> 15 bpm", "red", "Severe", "Mandatory rest, strongly associated with overtraining or illness"),
    band("N/A", "gray", "No baseline", "Needs today's reading and at least one reading in the previous 7 days"),
];

static WELLNESS_BANDS: &[ReferenceBand] = &[
    band("20 - 25", "green", "Good", "Stable physical and mental state"),
    band("15 - 19", "yellow", "Watch", "Check sleep quality and stressors"),
    band("5 - 14", "red", "Poor", "Talk with the player and consider adjusting training"),
    band("N/A", "gray", "Not reported", "All five items are required for a score"),
];

static SRPE_BANDS: &[ReferenceBand] = &[
    band("< 400 AU", "green", "Moderate load", "Load within the usual range"),
    band("400 - 799 AU", "yellow", "High load", "Plan recovery for the next session"),
    band(">= 800 AU", "red", "Very high load", "Non-contact injury risk rises sharply"),
    band("N/A", "gray", "Not reported", "Needs training minutes and an RPE rating"),
];

/// A borrowed view of one computed metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric<'a> {
    Acwr(&'a AcwrMetric),
    Rhr(&'a RhrMetric),
    Wellness(Option<&'a WellnessMetric>),
    Srpe(Option<&'a SrpeMetric>),
}

impl<'a> Metric<'a> {
    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::Acwr(_) => MetricKind::Acwr,
            Metric::Rhr(_) => MetricKind::Rhr,
            Metric::Wellness(_) => MetricKind::Wellness,
            Metric::Srpe(_) => MetricKind::Srpe,
        }
    }

    pub fn severity(&self) -> RiskLevel {
        match self {
            Metric::Acwr(m) => m.risk_level.severity(),
            Metric::Rhr(m) => m.status.severity(),
            Metric::Wellness(m) => m.map_or(RiskLevel::NoData, |m| m.status.severity()),
            Metric::Srpe(m) => m.map_or(RiskLevel::NoData, |m| m.status.severity()),
        }
    }

    /// Traffic-light colour name
    pub fn status_name(&self) -> String {
        match self {
            Metric::Acwr(m) => m.risk_level.to_string(),
            Metric::Rhr(m) => m.status.to_string(),
            Metric::Wellness(m) => m.map_or_else(|| "gray".to_string(), |m| m.status.to_string()),
            Metric::Srpe(m) => m.map_or_else(|| "gray".to_string(), |m| m.status.to_string()),
        }
    }

    /// Headline value with unit, "-" when there is nothing to show
    pub fn display_value(&self) -> String {
        match self {
            Metric::Acwr(m) => m.rounded_ratio().map_or_else(|| "-".to_string(), |r| format!("{:.2}", r)),
            Metric::Rhr(m) => match (m.current_rhr, m.difference) {
                (Some(current), Some(diff)) => {
                    let diff = diff.round_dp(1);
                    let sign = if diff.is_sign_positive() && !diff.is_zero() { "+" } else { "" };
                    format!("{} bpm ({}{})", current, sign, diff)
                }
                (Some(current), None) => format!("{} bpm", current),
                _ => "-".to_string(),
            },
            Metric::Wellness(m) => m.map_or_else(|| "-".to_string(), |m| format!("{} / 25", m.total)),
            Metric::Srpe(m) => m.map_or_else(|| "-".to_string(), |m| format!("{} AU", m.load_au)),
        }
    }

    /// The metric produced a classification today
    pub fn is_established(&self) -> bool {
        self.severity() != RiskLevel::NoData
    }
}

impl FatigueMetrics {
    /// Metrics in display order
    pub fn iter(&self) -> impl Iterator<Item = Metric<'_>> {
        MetricKind::ALL.into_iter().map(move |kind| self.get(kind))
    }

    pub fn get(&self, kind: MetricKind) -> Metric<'_> {
        match kind {
            MetricKind::Acwr => Metric::Acwr(&self.acwr),
            MetricKind::Rhr => Metric::Rhr(&self.rhr),
            MetricKind::Wellness => Metric::Wellness(self.wellness.as_ref()),
            MetricKind::Srpe => Metric::Srpe(self.srpe.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acwr::AcwrRiskLevel;
    use crate::rhr::RhrStatus;
    use crate::srpe::SrpeStatus;
    use rust_decimal_macros::dec;

    fn metrics() -> FatigueMetrics {
        FatigueMetrics {
            acwr: AcwrMetric {
                acute_load: dec!(300),
                chronic_load: dec!(250),
                acwr: Some(dec!(1.2)),
                risk_level: AcwrRiskLevel::Green,
            },
            rhr: RhrMetric {
                current_rhr: Some(58),
                baseline_rhr: Some(dec!(51.5)),
                difference: Some(dec!(6.5)),
                status: RhrStatus::Yellow,
            },
            wellness: None,
            srpe: Some(SrpeMetric {
                load_au: 480,
                status: SrpeStatus::Yellow,
            }),
        }
    }

    #[test]
    fn test_iter_in_display_order() {
        let m = metrics();
        let kinds: Vec<_> = m.iter().map(|metric| metric.kind()).collect();
        assert_eq!(kinds, MetricKind::ALL.to_vec());
    }

    #[test]
    fn test_missing_metric_is_gray() {
        let m = metrics();
        let wellness = m.get(MetricKind::Wellness);
        assert_eq!(wellness.status_name(), "gray");
        assert_eq!(wellness.display_value(), "-");
        assert!(!wellness.is_established());
    }

    #[test]
    fn test_display_values() {
        let m = metrics();
        assert_eq!(m.get(MetricKind::Acwr).display_value(), "1.20");
        assert_eq!(m.get(MetricKind::Rhr).display_value(), "58 bpm (+6.5)");
        assert_eq!(m.get(MetricKind::Srpe).display_value(), "480 AU");
    }

    #[test]
    fn test_rhr_without_baseline_display() {
        let mut m = metrics();
        m.rhr.difference = None;
        m.rhr.status = RhrStatus::Gray;
        assert_eq!(m.get(MetricKind::Rhr).display_value(), "58 bpm");
        assert_eq!(m.get(MetricKind::Rhr).severity(), RiskLevel::NoData);
    }

    #[test]
    fn test_every_kind_has_reference_bands() {
        for kind in MetricKind::ALL {
            let bands = kind.reference_bands();
            assert!(!bands.is_empty());
            assert!(bands.iter().any(|b| b.status == "gray"));
        }
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(serde_json::to_string(&MetricKind::Srpe).unwrap(), "\"srpe\"");
        assert_eq!(MetricKind::Rhr.unit(), "bpm");
        assert_eq!("sRPE".parse::<MetricKind>().unwrap(), MetricKind::Srpe);
        assert!("psi".parse::<MetricKind>().is_err());
    }
}
