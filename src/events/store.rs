//! SQLite-backed access to the `events` table.

use crate::events::{Event, EventStatus};
use crate::storage::Pool;
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

/// Store handle for event listings.
///
/// The cleanup engine only scans and deletes; the other operations exist for
/// seeding and inspection.
#[derive(Clone)]
pub struct EventStore {
    pool: Pool,
}

impl EventStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn insert(&self, event: &Event) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO events (id, title, status, deadline, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                event.id.to_string(),
                event.title,
                event.status.to_string(),
                event.deadline.map(|d| d.to_rfc3339()),
                event.created_at.to_rfc3339(),
                event.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Result<Option<Event>> {
        let conn = self.pool.get()?;
        let event = conn
            .query_row(
                "SELECT id, title, status, deadline, created_at, updated_at
                 FROM events WHERE id = ?1",
                params![id.to_string()],
                event_from_row,
            )
            .optional()?;
        Ok(event)
    }

    /// All events whose deadline is strictly before `now` and whose status is
    /// not `closed`. Events without a deadline are never selected.
    pub fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, status, deadline, created_at, updated_at
             FROM events
             WHERE deadline IS NOT NULL AND deadline < ?1 AND status != ?2",
        )?;

        let rows = stmt.query_map(
            params![now.to_rfc3339(), EventStatus::Closed.to_string()],
            event_from_row,
        )?;

        let mut events = Vec::new();
        for r in rows {
            events.push(r?);
        }
        Ok(events)
    }

    /// Delete an event by identity. Errors if no such row exists.
    pub fn delete(&self, id: Uuid) -> Result<()> {
        let conn = self.pool.get()?;
        let changed = conn.execute("DELETE FROM events WHERE id = ?1", params![id.to_string()])?;
        if changed == 0 {
            anyhow::bail!("event {} not found", id);
        }
        Ok(())
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    let id_str: String = row.get(0)?;
    let status_str: String = row.get(2)?;
    let deadline_str: Option<String> = row.get(3)?;

    let deadline = match deadline_str {
        Some(s) => Some(parse_timestamp(3, &s)?),
        None => None,
    };

    Ok(Event {
        id: Uuid::parse_str(&id_str)
            .map_err(|e| conversion_error(0, e))?,
        title: row.get(1)?,
        status: status_str
            .parse()
            .map_err(|e: anyhow::Error| conversion_error(2, e))?,
        deadline,
        created_at: parse_timestamp(4, &row.get::<_, String>(4)?)?,
        updated_at: parse_timestamp(5, &row.get::<_, String>(5)?)?,
    })
}

fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn conversion_error(
    idx: usize,
    e: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
}
