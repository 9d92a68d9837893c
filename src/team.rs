//! Team-wide triage
//!
//! Each player is evaluated independently, so evaluation fans out over rayon.
//! Store reads stay sequential because a store connection is not shared
//! across threads.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::info;

use crate::acwr::AcwrRiskLevel;
use crate::engine::FatigueMetricsEngine;
use crate::error::Result;
use crate::models::{DailyRecord, FatigueStatus, MissingReportStreak};
use crate::store::RecordStore;

/// One player's raw history
#[derive(Debug, Clone)]
pub struct PlayerRecords {
    pub player_id: String,
    pub records: Vec<DailyRecord>,
}

impl PlayerRecords {
    /// Split a mixed record list by player, sorted by player id
    pub fn group(records: impl IntoIterator<Item = DailyRecord>) -> Vec<PlayerRecords> {
        let mut by_player: BTreeMap<String, Vec<DailyRecord>> = BTreeMap::new();
        for record in records {
            by_player.entry(record.player_id.clone()).or_default().push(record);
        }

        by_player
            .into_iter()
            .map(|(player_id, records)| PlayerRecords { player_id, records })
            .collect()
    }
}

/// Status and reporting streak of one player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerAssessment {
    pub status: FatigueStatus,
    pub missing_reports: MissingReportStreak,
}

/// Number of players per ACWR level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeamRiskSummary {
    pub green: usize,
    pub yellow: usize,
    pub red: usize,
    pub black: usize,
    pub gray: usize,
}

impl TeamRiskSummary {
    pub fn from_statuses<'a>(statuses: impl IntoIterator<Item = &'a FatigueStatus>) -> Self {
        statuses.into_iter().fold(Self::default(), |mut summary, status| {
            match status.metrics.acwr.risk_level {
                AcwrRiskLevel::Green => summary.green += 1,
                AcwrRiskLevel::Yellow => summary.yellow += 1,
                AcwrRiskLevel::Red => summary.red += 1,
                AcwrRiskLevel::Black => summary.black += 1,
                AcwrRiskLevel::Gray => summary.gray += 1,
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.green + self.yellow + self.red + self.black + self.gray
    }

    /// Players in the red or black ACWR band
    pub fn at_risk(&self) -> usize {
        self.red + self.black
    }
}

/// Evaluation of a whole team on one day
#[derive(Debug, Clone, Serialize)]
pub struct TeamReport {
    pub date: NaiveDate,
    /// Sorted by player id
    pub players: Vec<PlayerAssessment>,
    pub summary: TeamRiskSummary,
}

impl TeamReport {
    /// Players with a red or black ACWR, black first, then by ratio descending
    pub fn high_risk_players(&self) -> Vec<&FatigueStatus> {
        let mut high_risk: Vec<&FatigueStatus> = self
            .statuses()
            .filter(|s| matches!(s.metrics.acwr.risk_level, AcwrRiskLevel::Red | AcwrRiskLevel::Black))
            .collect();

        high_risk.sort_by(|a, b| {
            let a_black = a.metrics.acwr.risk_level == AcwrRiskLevel::Black;
            let b_black = b.metrics.acwr.risk_level == AcwrRiskLevel::Black;
            b_black
                .cmp(&a_black)
                .then_with(|| by_ratio_desc(a, b))
                .then_with(|| a.player_id.cmp(&b.player_id))
        });
        high_risk
    }

    /// All players, most at-risk overall first
    pub fn priority_order(&self) -> Vec<&FatigueStatus> {
        let mut ordered: Vec<&FatigueStatus> = self.statuses().collect();
        ordered.sort_by(|a, b| {
            b.overall
                .level
                .cmp(&a.overall.level)
                .then_with(|| by_ratio_desc(a, b))
                .then_with(|| a.player_id.cmp(&b.player_id))
        });
        ordered
    }

    /// Players who should be reminded to report
    pub fn needs_reminder(&self) -> Vec<&PlayerAssessment> {
        self.players.iter().filter(|p| p.missing_reports.needs_reminder()).collect()
    }

    pub fn statuses(&self) -> impl Iterator<Item = &FatigueStatus> {
        self.players.iter().map(|p| &p.status)
    }
}

/// Higher ratio first, no ratio last
fn by_ratio_desc(a: &FatigueStatus, b: &FatigueStatus) -> Ordering {
    b.metrics.acwr.acwr.cmp(&a.metrics.acwr.acwr)
}

/// Evaluate every player in parallel
pub fn evaluate_team(engine: &FatigueMetricsEngine, date: NaiveDate, players: &[PlayerRecords]) -> TeamReport {
    let mut assessments: Vec<PlayerAssessment> = players
        .par_iter()
        .map(|player| PlayerAssessment {
            status: engine.evaluate(&player.player_id, date, &player.records),
            missing_reports: engine.missing_report_streak(&player.player_id, date, &player.records),
        })
        .collect();
    assessments.sort_by(|a, b| a.status.player_id.cmp(&b.status.player_id));

    let summary = TeamRiskSummary::from_statuses(assessments.iter().map(|p| &p.status));
    info!(%date, players = summary.total(), at_risk = summary.at_risk(), "Evaluated team");

    TeamReport {
        date,
        players: assessments,
        summary,
    }
}

/// Load every player in the store and evaluate the team
pub fn evaluate_team_from_store<S>(engine: &FatigueMetricsEngine, store: &S, date: NaiveDate) -> Result<TeamReport>
where
    S: RecordStore + ?Sized,
{
    let start = engine.window_start(date);

    let players = store
        .players()?
        .into_iter()
        .map(|player_id| -> Result<PlayerRecords> {
            let records = store.records_between(&player_id, start, date)?;
            Ok(PlayerRecords { player_id, records })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(evaluate_team(engine, date, &players))
}
