//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The engine calls store methods and never executes SQL directly.

use crate::{
    error::GameResult,
    event::{EventLogEntry, PlayerLogEntry},
    types::Round,
};
use rusqlite::{params, Connection, OptionalExtension};

pub struct GameStore {
    conn: Connection,
}

impl GameStore {
    /// Open (or create) the game database at `path`.
    pub fn open(path: &str) -> GameResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GameResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GameResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, seed: u64, version: &str) -> GameResult<()> {
        let started_at = chrono::Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, started_at) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, seed as i64, version, started_at],
        )?;
        Ok(())
    }

    pub fn run_seed(&self, run_id: &str) -> GameResult<Option<u64>> {
        let mut stmt = self.conn.prepare("SELECT seed FROM run WHERE run_id = ?1")?;
        let seed = stmt
            .query_row(params![run_id], |row| row.get::<_, i64>(0))
            .optional()?
            .map(|s| s as u64);
        Ok(seed)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> GameResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (run_id, round, event_type, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![entry.run_id, entry.round as i64, entry.event_type, entry.payload],
        )?;
        Ok(())
    }

    pub fn events_for_round(&self, run_id: &str, round: Round) -> GameResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, round, event_type, payload
             FROM event_log WHERE run_id = ?1 AND round = ?2
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![run_id, round as i64], |row| {
                Ok(EventLogEntry {
                    id:         Some(row.get(0)?),
                    run_id:     row.get(1)?,
                    round:      row.get::<_, i64>(2)? as u64,
                    event_type: row.get(3)?,
                    payload:    row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, run_id: &str, event_type: &str) -> GameResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE run_id = ?1 AND event_type = ?2",
            params![run_id, event_type],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ── Player log ─────────────────────────────────────────────

    pub fn append_player_log(&self, entry: &PlayerLogEntry) -> GameResult<()> {
        self.conn.execute(
            "INSERT INTO player_log (run_id, round, player, event_type, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.run_id,
                entry.round as i64,
                entry.player,
                entry.event_type,
                entry.payload,
            ],
        )?;
        Ok(())
    }

    pub fn player_log(&self, run_id: &str, player: &str) -> GameResult<Vec<PlayerLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, round, player, event_type, payload
             FROM player_log WHERE run_id = ?1 AND player = ?2
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![run_id, player], |row| {
                Ok(PlayerLogEntry {
                    id:         Some(row.get(0)?),
                    run_id:     row.get(1)?,
                    round:      row.get::<_, i64>(2)? as u64,
                    player:     row.get(3)?,
                    event_type: row.get(4)?,
                    payload:    row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
