//! Record persistence
//!
//! The engine only needs one query: a player's records over an inclusive date
//! range. [`RecordStore`] is that seam. Two implementations ship with the
//! crate, an in-memory map for tests and embedding, and SQLite for the CLI.

pub mod sqlite;

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::StoreError;
use crate::models::DailyRecord;

pub use sqlite::SqliteRecordStore;

/// Source of daily records
pub trait RecordStore {
    /// Records of one player within `start..=end`, ordered by date
    fn records_between(
        &self,
        player_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRecord>, StoreError>;

    /// Every player with at least one record, sorted
    fn players(&self) -> Result<Vec<String>, StoreError>;
}

/// Outcome of a batch write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertSummary {
    pub inserted: usize,
    pub replaced: usize,
    pub skipped: usize,
}

impl InsertSummary {
    pub fn total(&self) -> usize {
        self.inserted + self.replaced + self.skipped
    }
}

/// How a batch write treats an existing (player, date) record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Keep the stored record
    Skip,
    /// Overwrite the stored record
    Replace,
}

pub(crate) fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), StoreError> {
    if start > end {
        return Err(StoreError::InvalidRange { start, end });
    }
    Ok(())
}

/// Map-backed store keyed by player and date
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    records: BTreeMap<(String, NaiveDate), DailyRecord>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, failing if the player already has one for that date
    pub fn insert(&mut self, record: DailyRecord) -> Result<(), StoreError> {
        let key = (record.player_id.clone(), record.record_date);
        if self.records.contains_key(&key) {
            return Err(StoreError::Duplicate {
                player_id: key.0,
                date: key.1,
            });
        }
        self.records.insert(key, record);
        Ok(())
    }

    /// Insert or overwrite, returning the replaced record
    pub fn upsert(&mut self, record: DailyRecord) -> Option<DailyRecord> {
        let key = (record.player_id.clone(), record.record_date);
        self.records.insert(key, record)
    }

    pub fn insert_many(&mut self, records: impl IntoIterator<Item = DailyRecord>, policy: ConflictPolicy) -> InsertSummary {
        let mut summary = InsertSummary::default();

        for record in records {
            let key = (record.player_id.clone(), record.record_date);
            match (self.records.contains_key(&key), policy) {
                (false, _) => {
                    self.records.insert(key, record);
                    summary.inserted += 1;
                }
                (true, ConflictPolicy::Replace) => {
                    self.records.insert(key, record);
                    summary.replaced += 1;
                }
                (true, ConflictPolicy::Skip) => summary.skipped += 1,
            }
        }

        debug!(?summary, "In-memory batch write");
        summary
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<DailyRecord> for InMemoryRecordStore {
    /// Later duplicates overwrite earlier ones
    fn from_iter<I: IntoIterator<Item = DailyRecord>>(iter: I) -> Self {
        let mut store = InMemoryRecordStore::new();
        for record in iter {
            store.upsert(record);
        }
        store
    }
}

impl RecordStore for InMemoryRecordStore {
    fn records_between(
        &self,
        player_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRecord>, StoreError> {
        check_range(start, end)?;

        let lower = (player_id.to_string(), start);
        let upper = (player_id.to_string(), end);
        Ok(self.records.range(lower..=upper).map(|(_, r)| r.clone()).collect())
    }

    fn players(&self) -> Result<Vec<String>, StoreError> {
        let mut players: Vec<String> = self.records.keys().map(|(player, _)| player.clone()).collect();
        players.dedup();
        Ok(players)
    }
}
