// SQLite persistence layer for manual forecast overrides.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

/// A persisted override row as stored on disk. Fields are untyped here; the
/// baseball crate converts them into strongly-typed override records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredOverride {
    pub storage_key: String,
    pub org_id: String,
    pub position: String,
    pub year: i32,
    pub player_id: Option<String>,
    pub player_name: Option<String>,
    pub age: u32,
    pub rating: f64,
    pub salary: u64,
    pub state: String,
    pub source: String,
    pub acquisition: Option<String>,
    /// RFC 3339 timestamp of the edit that produced this row.
    pub created_at: String,
}

/// SQLite-backed persistence for override records and key-value planner state.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS overrides (
                storage_key TEXT PRIMARY KEY,
                org_id      TEXT NOT NULL,
                position    TEXT NOT NULL,
                year        INTEGER NOT NULL,
                player_id   TEXT,
                player_name TEXT,
                age         INTEGER NOT NULL DEFAULT 0,
                rating      REAL NOT NULL DEFAULT 0,
                salary      INTEGER NOT NULL DEFAULT 0,
                state       TEXT NOT NULL,
                source      TEXT NOT NULL,
                acquisition TEXT,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_overrides_org_id ON overrides(org_id);

            CREATE TABLE IF NOT EXISTS forecast_state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the connection lock.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock).
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Load every override for one organization, ordered by position then year.
    pub fn load_overrides(&self, org_id: &str) -> Result<Vec<StoredOverride>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT storage_key, org_id, position, year, player_id, player_name,
                        age, rating, salary, state, source, acquisition, created_at
                 FROM overrides WHERE org_id = ?1 ORDER BY position, year",
            )
            .context("failed to prepare load_overrides query")?;

        let rows = stmt
            .query_map(params![org_id], |row| {
                let salary: i64 = row.get(8)?;
                Ok(StoredOverride {
                    storage_key: row.get(0)?,
                    org_id: row.get(1)?,
                    position: row.get(2)?,
                    year: row.get(3)?,
                    player_id: row.get(4)?,
                    player_name: row.get(5)?,
                    age: row.get(6)?,
                    rating: row.get(7)?,
                    salary: salary.max(0) as u64,
                    state: row.get(9)?,
                    source: row.get(10)?,
                    acquisition: row.get(11)?,
                    created_at: row.get(12)?,
                })
            })
            .context("failed to query overrides")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map override rows")?;

        Ok(rows)
    }

    /// Insert or replace a batch of override rows in a single transaction.
    /// A storage key never has more than one live row.
    pub fn upsert_overrides(&self, rows: &[StoredOverride]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .context("failed to begin override transaction")?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO overrides
                        (storage_key, org_id, position, year, player_id, player_name,
                         age, rating, salary, state, source, acquisition, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                     ON CONFLICT(storage_key) DO UPDATE SET
                        org_id = excluded.org_id,
                        position = excluded.position,
                        year = excluded.year,
                        player_id = excluded.player_id,
                        player_name = excluded.player_name,
                        age = excluded.age,
                        rating = excluded.rating,
                        salary = excluded.salary,
                        state = excluded.state,
                        source = excluded.source,
                        acquisition = excluded.acquisition,
                        created_at = excluded.created_at",
                )
                .context("failed to prepare override upsert")?;

            for row in rows {
                let salary = i64::try_from(row.salary).unwrap_or(i64::MAX);
                stmt.execute(params![
                    row.storage_key,
                    row.org_id,
                    row.position,
                    row.year,
                    row.player_id,
                    row.player_name,
                    row.age,
                    row.rating,
                    salary,
                    row.state,
                    row.source,
                    row.acquisition,
                    row.created_at,
                ])
                .with_context(|| format!("failed to upsert override {}", row.storage_key))?;
            }
        }

        tx.commit().context("failed to commit override upsert")?;
        Ok(())
    }

    /// Delete one override by storage key. Returns whether a row was removed.
    pub fn delete_override(&self, storage_key: &str) -> Result<bool> {
        let conn = self.conn();
        let removed = conn
            .execute(
                "DELETE FROM overrides WHERE storage_key = ?1",
                params![storage_key],
            )
            .context("failed to delete override")?;
        Ok(removed > 0)
    }

    /// Delete every override for an organization. Returns the number removed.
    pub fn delete_overrides_for_org(&self, org_id: &str) -> Result<usize> {
        let conn = self.conn();
        let removed = conn
            .execute("DELETE FROM overrides WHERE org_id = ?1", params![org_id])
            .context("failed to delete organization overrides")?;
        Ok(removed)
    }

    /// Persist an arbitrary JSON value under `key`, overwriting any previous value.
    pub fn save_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.conn();
        let json_str =
            serde_json::to_string(value).context("failed to serialize state value")?;
        conn.execute(
            "INSERT OR REPLACE INTO forecast_state (key, value) VALUES (?1, ?2)",
            params![key, json_str],
        )
        .context("failed to save state")?;
        Ok(())
    }

    /// Load a previously saved JSON value by `key`. Returns `None` if the key
    /// does not exist.
    pub fn load_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT value FROM forecast_state WHERE key = ?1")
            .context("failed to prepare load_state query")?;

        let mut rows = stmt
            .query_map(params![key], |row| {
                let json_str: String = row.get(0)?;
                Ok(json_str)
            })
            .context("failed to query forecast state")?;

        match rows.next() {
            Some(row_result) => {
                let json_str = row_result.context("failed to read state row")?;
                let value: serde_json::Value = serde_json::from_str(&json_str)
                    .context("failed to deserialize state value")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
