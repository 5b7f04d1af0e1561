//! Database schema and migrations.

use anyhow::Result;
use rusqlite::Connection;

/// Run all pending migrations.
pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS events (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            status TEXT NOT NULL,
            deadline TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS scheduled_tasks (
            id INTEGER PRIMARY KEY,
            task_type TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL,
            enabled INTEGER NOT NULL DEFAULT 1,
            last_run_at TEXT,
            next_run_at TEXT,
            run_time TEXT NOT NULL,
            frequency TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_events_deadline ON events(deadline);
        CREATE INDEX IF NOT EXISTS idx_events_status ON events(status);",
    )?;

    // Migration: Add 'last_outcome_json' to scheduled_tasks if missing
    let has_outcome: i32 = conn
        .query_row(
            "SELECT count(*) FROM pragma_table_info('scheduled_tasks') WHERE name='last_outcome_json'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if has_outcome == 0 {
        conn.execute(
            "ALTER TABLE scheduled_tasks ADD COLUMN last_outcome_json TEXT",
            [],
        )?;
    }

    Ok(())
}
