// SQLite trade ledger and run state.

use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection};

use crate::league::Phase;
use crate::trade::TradeTeams;

/// One executed trade as stored in the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub session_id: String,
    pub season: i32,
    pub phase: Phase,
    pub teams: TradeTeams,
    pub dv: f64,
    pub description: String,
    pub timestamp: String,
}

/// SQLite-backed history of committed trades plus key-value run state.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the ledger at `path` and ensure all tables exist.
    /// Pass `":memory:"` for an ephemeral database.
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
            CREATE TABLE IF NOT EXISTS trades (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id   TEXT NOT NULL,
                season       INTEGER NOT NULL,
                phase        INTEGER NOT NULL,
                user_tid     INTEGER NOT NULL,
                other_tid    INTEGER NOT NULL,
                teams        TEXT NOT NULL,
                dv           REAL NOT NULL,
                description  TEXT NOT NULL,
                timestamp    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE INDEX IF NOT EXISTS idx_trades_session ON trades(session_id);

            CREATE TABLE IF NOT EXISTS run_state (
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

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database mutex poisoned"))
    }

    /// Session ids look like `run_20250614_211503_042`.
    pub fn generate_session_id() -> String {
        chrono::Utc::now()
            .format("run_%Y%m%d_%H%M%S_%3f")
            .to_string()
    }

    pub fn record_trade(
        &self,
        session_id: &str,
        season: i32,
        phase: Phase,
        teams: &TradeTeams,
        dv: f64,
        description: &str,
    ) -> Result<()> {
        let conn = self.conn()?;
        let teams_json = serde_json::to_string(teams).context("failed to serialize trade")?;
        conn.execute(
            "INSERT INTO trades
                (session_id, season, phase, user_tid, other_tid, teams, dv, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                session_id,
                season,
                phase.code(),
                teams[0].tid,
                teams[1].tid,
                teams_json,
                dv,
                description,
            ],
        )
        .context("failed to record trade")?;
        Ok(())
    }

    /// Trades recorded in `session_id`, oldest first.
    pub fn load_trades(&self, session_id: &str) -> Result<Vec<TradeRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT session_id, season, phase, teams, dv, description, timestamp
                 FROM trades WHERE session_id = ?1 ORDER BY id",
            )
            .context("failed to prepare load_trades query")?;

        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i32>(1)?,
                    row.get::<_, i8>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })
            .context("failed to query trades")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map trade rows")?;

        rows.into_iter()
            .map(
                |(session_id, season, phase, teams, dv, description, timestamp)| {
                    let phase = Phase::from_code(phase)
                        .ok_or_else(|| anyhow!("invalid phase code {phase} in ledger"))?;
                    let teams: TradeTeams = serde_json::from_str(&teams)
                        .context("failed to deserialize trade teams")?;
                    Ok(TradeRecord {
                        session_id,
                        season,
                        phase,
                        teams,
                        dv,
                        description,
                        timestamp,
                    })
                },
            )
            .collect()
    }

    pub fn trade_count(&self, session_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM trades WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .context("failed to count trades")?;
        Ok(count as usize)
    }

    /// Persist an arbitrary JSON value under `key`, replacing any previous one.
    pub fn save_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.conn()?;
        let json_str =
            serde_json::to_string(value).context("failed to serialize state value")?;
        conn.execute(
            "INSERT OR REPLACE INTO run_state (key, value) VALUES (?1, ?2)",
            params![key, json_str],
        )
        .context("failed to save state")?;
        Ok(())
    }

    pub fn load_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT value FROM run_state WHERE key = ?1")
            .context("failed to prepare load_state query")?;

        let mut rows = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))
            .context("failed to query run state")?;

        match rows.next() {
            Some(row_result) => {
                let json_str = row_result.context("failed to read state row")?;
                let value = serde_json::from_str(&json_str)
                    .context("failed to deserialize state value")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}
