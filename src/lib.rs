// Library interface for FatigueGuard
// Integration tests and the CLI both go through these modules

pub mod acwr;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod import;
pub mod logging;
pub mod metric;
pub mod models;
pub mod rhr;
pub mod risk;
pub mod srpe;
pub mod store;
pub mod team;
pub mod validation;
pub mod wellness;
pub mod window;

// Re-export commonly used types for convenience
pub use models::*;
pub use acwr::{AcwrCalculator, AcwrConfig, AcwrMetric, AcwrRiskLevel};
pub use rhr::{RhrConfig, RhrEvaluator, RhrMetric, RhrStatus};
pub use wellness::{WellnessConfig, WellnessEvaluator, WellnessMetric, WellnessStatus};
pub use srpe::{SrpeConfig, SrpeEvaluator, SrpeMetric, SrpeStatus};
pub use risk::{OverallRisk, RiskCombiner, RiskLevel};
pub use metric::{Metric, MetricKind, ReferenceBand};
pub use engine::FatigueMetricsEngine;
pub use config::{AppConfig, MetricsConfig};
pub use store::{InMemoryRecordStore, RecordStore, SqliteRecordStore};
pub use team::{evaluate_team, evaluate_team_from_store, PlayerRecords, TeamReport, TeamRiskSummary};
pub use error::{FatigueError, Result};
pub use logging::{LogConfig, LogFileConfig, LogFormat, LogLevel, LogRotation};
