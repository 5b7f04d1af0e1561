//! SQLite-backed access to the `scheduled_tasks` table.

use crate::storage::Pool;
use crate::tasks::{RunOutcome, ScheduledTask, TaskType};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

/// Whether an arm call found an existing row or created a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Armed {
    Created,
    Updated,
}

/// Store handle for scheduled-task rows.
#[derive(Clone)]
pub struct TaskStore {
    pool: Pool,
}

impl TaskStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Look up the row for `task_type`, if any.
    pub fn find(&self, task_type: TaskType) -> Result<Option<ScheduledTask>> {
        let conn = self.pool.get()?;
        let task = conn
            .query_row(
                "SELECT task_type, description, enabled, last_run_at, next_run_at,
                        run_time, frequency, last_outcome_json, created_at, updated_at
                 FROM scheduled_tasks WHERE task_type = ?1",
                params![task_type.to_string()],
                task_from_row,
            )
            .optional()?;
        Ok(task)
    }

    /// Set `next_run_at` on the existing row for `task_type`, or create the
    /// row if none exists. Leaves `enabled` and last-run state untouched on
    /// existing rows.
    pub fn arm(
        &self,
        task_type: TaskType,
        next_run: DateTime<Utc>,
        run_time: &str,
        frequency: &str,
        now: DateTime<Utc>,
    ) -> Result<Armed> {
        let conn = self.pool.get()?;

        let changed = conn
            .execute(
                "UPDATE scheduled_tasks SET next_run_at = ?1, updated_at = ?2 WHERE task_type = ?3",
                params![next_run.to_rfc3339(), now.to_rfc3339(), task_type.to_string()],
            )
            .context("failed to update scheduled task")?;

        if changed > 0 {
            return Ok(Armed::Updated);
        }

        conn.execute(
            "INSERT INTO scheduled_tasks
                 (task_type, description, enabled, last_run_at, next_run_at,
                  run_time, frequency, created_at, updated_at)
             VALUES (?1, ?2, 1, NULL, ?3, ?4, ?5, ?6, ?6)",
            params![
                task_type.to_string(),
                task_type.description(),
                next_run.to_rfc3339(),
                run_time,
                frequency,
                now.to_rfc3339(),
            ],
        )
        .context("failed to create scheduled task")?;

        Ok(Armed::Created)
    }

    /// Record a completed run: set `last_run_at` and replace the stored
    /// outcome. Creates the row if none exists. The previous outcome is
    /// overwritten, not appended.
    pub fn record_run(
        &self,
        task_type: TaskType,
        run_at: DateTime<Utc>,
        outcome: &RunOutcome,
        run_time: &str,
        frequency: &str,
    ) -> Result<()> {
        let conn = self.pool.get()?;
        let outcome_json =
            serde_json::to_string(outcome).context("failed to serialize run outcome")?;

        conn.execute(
            "INSERT INTO scheduled_tasks
                 (task_type, description, enabled, last_run_at, next_run_at,
                  run_time, frequency, last_outcome_json, created_at, updated_at)
             VALUES (?1, ?2, 1, ?3, NULL, ?4, ?5, ?6, ?3, ?3)
             ON CONFLICT(task_type) DO UPDATE SET
                 last_run_at = excluded.last_run_at,
                 last_outcome_json = excluded.last_outcome_json,
                 updated_at = excluded.updated_at",
            params![
                task_type.to_string(),
                task_type.description(),
                run_at.to_rfc3339(),
                run_time,
                frequency,
                outcome_json,
            ],
        )
        .context("failed to record run on scheduled task")?;

        Ok(())
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<ScheduledTask> {
    let type_str: String = row.get(0)?;
    let last_run_str: Option<String> = row.get(3)?;
    let next_run_str: Option<String> = row.get(4)?;
    let outcome_json: Option<String> = row.get(7)?;

    let last_outcome = match outcome_json {
        Some(s) => Some(
            serde_json::from_str(&s).map_err(|e| conversion_error(7, e))?,
        ),
        None => None,
    };

    Ok(ScheduledTask {
        task_type: type_str
            .parse()
            .map_err(|e: anyhow::Error| conversion_error(0, e))?,
        description: row.get(1)?,
        enabled: row.get::<_, i64>(2)? != 0,
        last_run_at: parse_optional_timestamp(3, last_run_str)?,
        next_run_at: parse_optional_timestamp(4, next_run_str)?,
        run_time: row.get(5)?,
        frequency: row.get(6)?,
        last_outcome,
        created_at: parse_timestamp(8, &row.get::<_, String>(8)?)?,
        updated_at: parse_timestamp(9, &row.get::<_, String>(9)?)?,
    })
}

fn parse_optional_timestamp(
    idx: usize,
    s: Option<String>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match s {
        Some(s) => Ok(Some(parse_timestamp(idx, &s)?)),
        None => Ok(None),
    }
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
