use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::path::Path;
use tracing::{debug, info};

use super::{check_range, ConflictPolicy, InsertSummary, RecordStore};
use crate::error::StoreError;
use crate::models::DailyRecord;

const RECORD_COLUMNS: &str = "player_id, record_date, rhr_bpm, sleep_quality, stress_level, fatigue_level, \
     muscle_soreness, mood, training_minutes, srpe_score, feedback";

/// SQLite-backed record store, one row per player and date
pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    /// Create or open a database at the specified path
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path.as_ref())?;
        let store = Self { conn };
        store.init_schema()?;

        info!(path = %db_path.as_ref().display(), "Opened record store");
        Ok(store)
    }

    /// Private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.pragma_update(None, "journal_mode", "WAL")?;
        self.conn.pragma_update(None, "synchronous", "NORMAL")?;

        self.conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS daily_records (
                player_id TEXT NOT NULL,
                record_date DATE NOT NULL,
                rhr_bpm INTEGER,
                sleep_quality INTEGER,
                stress_level INTEGER,
                fatigue_level INTEGER,
                muscle_soreness INTEGER,
                mood INTEGER,
                training_minutes INTEGER,
                srpe_score INTEGER,
                feedback TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,

                PRIMARY KEY (player_id, record_date)
            )
            "#,
            [],
        )?;

        // Team-wide queries by day
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_daily_records_date ON daily_records (record_date)",
            [],
        )?;

        Ok(())
    }

    /// Insert one record, failing if the player already has one for that date
    pub fn insert(&mut self, record: &DailyRecord) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;

        if Self::exists(&tx, &record.player_id, record.record_date)? {
            return Err(StoreError::Duplicate {
                player_id: record.player_id.clone(),
                date: record.record_date,
            });
        }
        Self::write(&tx, record)?;

        tx.commit()?;
        Ok(())
    }

    /// Insert or overwrite one record
    pub fn upsert(&mut self, record: &DailyRecord) -> Result<(), StoreError> {
        Self::write(&self.conn, record)?;
        Ok(())
    }

    /// Write a batch in a single transaction
    pub fn insert_many(&mut self, records: &[DailyRecord], policy: ConflictPolicy) -> Result<InsertSummary, StoreError> {
        let tx = self.conn.transaction()?;
        let mut summary = InsertSummary::default();

        for record in records {
            let exists = Self::exists(&tx, &record.player_id, record.record_date)?;
            match (exists, policy) {
                (true, ConflictPolicy::Skip) => {
                    summary.skipped += 1;
                    continue;
                }
                (true, ConflictPolicy::Replace) => summary.replaced += 1,
                (false, _) => summary.inserted += 1,
            }
            Self::write(&tx, record)?;
        }

        tx.commit()?;
        info!(
            inserted = summary.inserted,
            replaced = summary.replaced,
            skipped = summary.skipped,
            "Stored record batch"
        );
        Ok(summary)
    }

    /// Number of stored records
    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM daily_records", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Latest date with any record
    pub fn latest_date(&self) -> Result<Option<NaiveDate>, StoreError> {
        let date = self
            .conn
            .query_row("SELECT MAX(record_date) FROM daily_records", [], |row| {
                row.get::<_, Option<NaiveDate>>(0)
            })
            .optional()?;
        Ok(date.flatten())
    }

    fn exists(tx: &Transaction<'_>, player_id: &str, date: NaiveDate) -> Result<bool, StoreError> {
        let count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM daily_records WHERE player_id = ?1 AND record_date = ?2",
            params![player_id, date],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn write(conn: &Connection, record: &DailyRecord) -> Result<(), StoreError> {
        conn.execute(
            r#"
            INSERT INTO daily_records (
                player_id, record_date, rhr_bpm, sleep_quality, stress_level, fatigue_level,
                muscle_soreness, mood, training_minutes, srpe_score, feedback, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, CURRENT_TIMESTAMP)
            ON CONFLICT (player_id, record_date) DO UPDATE SET
                rhr_bpm = excluded.rhr_bpm,
                sleep_quality = excluded.sleep_quality,
                stress_level = excluded.stress_level,
                fatigue_level = excluded.fatigue_level,
                muscle_soreness = excluded.muscle_soreness,
                mood = excluded.mood,
                training_minutes = excluded.training_minutes,
                srpe_score = excluded.srpe_score,
                feedback = excluded.feedback,
                updated_at = CURRENT_TIMESTAMP
            "#,
            params![
                record.player_id,
                record.record_date,
                record.rhr_bpm,
                record.sleep_quality,
                record.stress_level,
                record.fatigue_level,
                record.muscle_soreness,
                record.mood,
                record.training_minutes,
                record.srpe_score,
                record.feedback,
            ],
        )?;
        Ok(())
    }

    fn record_from_row(row: &Row) -> rusqlite::Result<DailyRecord> {
        Ok(DailyRecord {
            player_id: row.get("player_id")?,
            record_date: row.get("record_date")?,
            rhr_bpm: row.get("rhr_bpm")?,
            sleep_quality: row.get("sleep_quality")?,
            stress_level: row.get("stress_level")?,
            fatigue_level: row.get("fatigue_level")?,
            muscle_soreness: row.get("muscle_soreness")?,
            mood: row.get("mood")?,
            training_minutes: row.get("training_minutes")?,
            srpe_score: row.get("srpe_score")?,
            feedback: row.get("feedback")?,
        })
    }
}

impl RecordStore for SqliteRecordStore {
    fn records_between(
        &self,
        player_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRecord>, StoreError> {
        check_range(start, end)?;

        let query = format!(
            "SELECT {} FROM daily_records WHERE player_id = ?1 AND record_date BETWEEN ?2 AND ?3 ORDER BY record_date",
            RECORD_COLUMNS
        );
        let mut stmt = self.conn.prepare(&query)?;
        let records = stmt
            .query_map(params![player_id, start, end], Self::record_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| match e {
                rusqlite::Error::FromSqlConversionFailure(_, _, cause) => StoreError::InvalidRow(cause.to_string()),
                other => StoreError::Sqlite(other),
            })?;

        debug!(player_id, %start, %end, count = records.len(), "Loaded records");
        Ok(records)
    }

    fn players(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT player_id FROM daily_records ORDER BY player_id")?;
        let players = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(players)
    }
}
