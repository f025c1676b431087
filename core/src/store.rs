//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The engine calls store methods; it never executes SQL directly.
//! Snapshots are stored as opaque JSON; the store never parses them.

use crate::{
    error::GardenResult,
    event::EventLogEntry,
    types::Timestamp,
};
use rusqlite::{params, Connection, OptionalExtension};

pub struct GardenStore {
    conn: Connection,
}

impl GardenStore {
    /// Open (or create) the save database at `path`.
    pub fn open(path: &str) -> GardenResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GardenResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GardenResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Profile ────────────────────────────────────────────────

    /// Register a profile. Re-registering an existing profile is a no-op.
    pub fn ensure_profile(
        &self,
        profile_id: &str,
        seed:       u64,
        version:    &str,
        now:        Timestamp,
    ) -> GardenResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO profile (profile_id, seed, version, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![profile_id, seed as i64, version, now as i64],
        )?;
        Ok(())
    }

    pub fn profile_seed(&self, profile_id: &str) -> GardenResult<Option<u64>> {
        let seed = self.conn
            .query_row(
                "SELECT seed FROM profile WHERE profile_id = ?1",
                params![profile_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(seed.map(|s| s as u64))
    }

    // ── Snapshot ───────────────────────────────────────────────

    /// Replace the profile's saved blob.
    pub fn save_snapshot(
        &self,
        profile_id: &str,
        saved_at:   Timestamp,
        state_json: &str,
    ) -> GardenResult<()> {
        self.conn.execute(
            "INSERT INTO save_slot (profile_id, saved_at, state_json) VALUES (?1, ?2, ?3)
             ON CONFLICT(profile_id) DO UPDATE SET saved_at = ?2, state_json = ?3",
            params![profile_id, saved_at as i64, state_json],
        )?;
        log::debug!("store: snapshot saved for {profile_id} at {saved_at}");
        Ok(())
    }

    /// The profile's saved blob and when it was written, if any.
    pub fn load_snapshot(&self, profile_id: &str) -> GardenResult<Option<(Timestamp, String)>> {
        let row = self.conn
            .query_row(
                "SELECT saved_at, state_json FROM save_slot WHERE profile_id = ?1",
                params![profile_id],
                |row| Ok((row.get::<_, i64>(0)? as u64, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(row)
    }

    pub fn delete_snapshot(&self, profile_id: &str) -> GardenResult<()> {
        self.conn.execute(
            "DELETE FROM save_slot WHERE profile_id = ?1",
            params![profile_id],
        )?;
        Ok(())
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> GardenResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (profile_id, at, event_type, payload)
             VALUES (?1, ?2, ?3, ?4)",
            params![entry.profile_id, entry.at as i64, entry.event_type, entry.payload],
        )?;
        Ok(())
    }

    /// Persist one action's events, and optionally the resulting snapshot,
    /// in a single transaction. Either everything lands or nothing does.
    pub fn commit_action(
        &self,
        entries:  &[EventLogEntry],
        snapshot: Option<(&str, Timestamp, &str)>,
    ) -> GardenResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for entry in entries {
            tx.execute(
                "INSERT INTO event_log (profile_id, at, event_type, payload)
                 VALUES (?1, ?2, ?3, ?4)",
                params![entry.profile_id, entry.at as i64, entry.event_type, entry.payload],
            )?;
        }
        if let Some((profile_id, saved_at, state_json)) = snapshot {
            tx.execute(
                "INSERT INTO save_slot (profile_id, saved_at, state_json) VALUES (?1, ?2, ?3)
                 ON CONFLICT(profile_id) DO UPDATE SET saved_at = ?2, state_json = ?3",
                params![profile_id, saved_at as i64, state_json],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// All events for a profile, oldest first.
    pub fn events_for_profile(&self, profile_id: &str) -> GardenResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, profile_id, at, event_type, payload
             FROM event_log WHERE profile_id = ?1
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![profile_id], |row| {
                Ok(EventLogEntry {
                    id:         Some(row.get(0)?),
                    profile_id: row.get(1)?,
                    at:         row.get::<_, i64>(2)? as u64,
                    event_type: row.get(3)?,
                    payload:    row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, profile_id: &str, event_type: Option<&str>) -> GardenResult<i64> {
        let count: i64 = match event_type {
            Some(t) => self.conn.query_row(
                "SELECT COUNT(*) FROM event_log WHERE profile_id = ?1 AND event_type = ?2",
                params![profile_id, t],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                "SELECT COUNT(*) FROM event_log WHERE profile_id = ?1",
                params![profile_id],
                |row| row.get(0),
            )?,
        };
        Ok(count)
    }
}
