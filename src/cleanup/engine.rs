//! The cleanup engine: scan for expired events, delete them, record the run.

use crate::cleanup::{CleanupError, CleanupReport, Clock};
use crate::config::CleanupSettings;
use crate::events::EventStore;
use crate::tasks::{DeletedEvent, RunOutcome, TaskStore, TaskType};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Finds and removes events whose deadline has passed, and persists a run
/// summary on the `delete-expired-events` scheduled-task row.
pub struct CleanupEngine {
    events: EventStore,
    tasks: TaskStore,
    clock: Arc<dyn Clock>,
    settings: CleanupSettings,
    // Serializes runs: a manual API trigger and the timer trigger must not
    // scan-and-delete concurrently.
    run_guard: tokio::sync::Mutex<()>,
}

impl CleanupEngine {
    pub fn new(
        events: EventStore,
        tasks: TaskStore,
        clock: Arc<dyn Clock>,
        settings: CleanupSettings,
    ) -> Self {
        Self {
            events,
            tasks,
            clock,
            settings,
            run_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// Run one cleanup pass.
    ///
    /// Deletes are dispatched concurrently and all awaited; a failure to
    /// delete one event never aborts the batch. Failed items are counted in
    /// the report and stay eligible for the next run. Only a failing scan or
    /// a failing task-record write aborts the run.
    pub async fn delete_expired_events(&self) -> Result<CleanupReport, CleanupError> {
        let _guard = self.run_guard.lock().await;

        let now = self.clock.now_utc();
        let expired = self
            .events
            .find_expired(now)
            .map_err(CleanupError::ScanFailed)?;

        info!(count = expired.len(), "Expired events found");

        let mut handles = Vec::with_capacity(expired.len());
        for event in expired {
            let store = self.events.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                let result = store.delete(event.id);
                (event, result)
            }));
        }

        let mut deleted_events = Vec::new();
        let mut failed: u32 = 0;
        for joined in futures::future::join_all(handles).await {
            match joined {
                Ok((event, Ok(()))) => {
                    info!(event_id = %event.id, title = %event.title, "Deleted expired event");
                    deleted_events.push(DeletedEvent {
                        id: event.id.to_string(),
                        title: event.title,
                    });
                }
                Ok((event, Err(e))) => {
                    warn!(event_id = %event.id, "Failed to delete expired event: {e:#}");
                    failed += 1;
                }
                Err(e) => {
                    error!("Delete task panicked: {e}");
                    failed += 1;
                }
            }
        }

        let deleted = deleted_events.len() as u32;
        let message = if deleted == 0 && failed == 0 {
            "No expired events found".to_string()
        } else {
            format!("Cleanup completed: {deleted} deleted, {failed} failed")
        };

        let outcome = RunOutcome {
            deleted,
            failed,
            deleted_events,
            message,
        };

        self.tasks
            .record_run(
                TaskType::DeleteExpiredEvents,
                now,
                &outcome,
                &self.settings.run_time(),
                &self.settings.frequency,
            )
            .map_err(CleanupError::TaskRecord)?;

        Ok(CleanupReport {
            run_at: now,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::FixedClock;
    use crate::events::{Event, EventStatus};
    use crate::storage::{open_pool, Pool};
    use chrono::{DateTime, Duration, Utc};

    fn fixed_now() -> DateTime<Utc> {
        "2026-05-10T12:00:00Z".parse().unwrap()
    }

    fn test_engine() -> (tempfile::TempDir, Pool, CleanupEngine) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cleanup.db");
        let pool = open_pool(path.to_str().unwrap()).unwrap();
        let engine = CleanupEngine::new(
            EventStore::new(pool.clone()),
            TaskStore::new(pool.clone()),
            Arc::new(FixedClock::new(fixed_now())),
            CleanupSettings::default(),
        );
        (dir, pool, engine)
    }

    fn seed(pool: &Pool, title: &str, status: EventStatus, deadline: Option<DateTime<Utc>>) -> Event {
        let store = EventStore::new(pool.clone());
        let event = Event::new(title, status, deadline, fixed_now());
        store.insert(&event).unwrap();
        event
    }

    #[tokio::test]
    async fn test_removes_only_expired_open_events() {
        let (_dir, pool, engine) = test_engine();
        let now = fixed_now();
        let yesterday = now - Duration::days(1);
        let tomorrow = now + Duration::days(1);

        let a = seed(&pool, "A", EventStatus::Upcoming, Some(yesterday));
        let b = seed(&pool, "B", EventStatus::Closed, Some(yesterday));
        let c = seed(&pool, "C", EventStatus::Upcoming, Some(tomorrow));

        let report = engine.delete_expired_events().await.unwrap();
        assert_eq!(report.outcome.deleted, 1);
        assert_eq!(report.outcome.failed, 0);
        assert_eq!(report.run_at, now);

        let events = EventStore::new(pool);
        assert!(events.get(a.id).unwrap().is_none());
        assert!(events.get(b.id).unwrap().is_some());
        assert!(events.get(c.id).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let (_dir, pool, engine) = test_engine();
        let yesterday = fixed_now() - Duration::days(1);
        seed(&pool, "expired", EventStatus::Ongoing, Some(yesterday));

        let first = engine.delete_expired_events().await.unwrap();
        assert_eq!(first.outcome.deleted, 1);

        let second = engine.delete_expired_events().await.unwrap();
        assert_eq!(second.outcome.deleted, 0);
        assert_eq!(second.outcome.failed, 0);
        assert_eq!(second.outcome.message, "No expired events found");
    }

    #[tokio::test]
    async fn test_partial_failure_is_isolated() {
        let (_dir, pool, engine) = test_engine();
        let yesterday = fixed_now() - Duration::days(1);

        let a = seed(&pool, "undeletable", EventStatus::Upcoming, Some(yesterday));
        let b = seed(&pool, "B", EventStatus::Upcoming, Some(yesterday));
        let c = seed(&pool, "C", EventStatus::Upcoming, Some(yesterday));

        // Make deletion of A fail at the store level.
        let conn = pool.get().unwrap();
        conn.execute_batch(&format!(
            "CREATE TRIGGER block_delete_a BEFORE DELETE ON events
             WHEN old.id = '{}'
             BEGIN SELECT RAISE(ABORT, 'simulated store error'); END;",
            a.id
        ))
        .unwrap();

        let report = engine.delete_expired_events().await.unwrap();
        assert_eq!(report.outcome.deleted, 2);
        assert_eq!(report.outcome.failed, 1);

        let events = EventStore::new(pool.clone());
        assert!(events.get(a.id).unwrap().is_some());
        assert!(events.get(b.id).unwrap().is_none());
        assert!(events.get(c.id).unwrap().is_none());

        // A is still expired and not closed: the next run picks it up again.
        conn.execute_batch("DROP TRIGGER block_delete_a").unwrap();
        let retry = engine.delete_expired_events().await.unwrap();
        assert_eq!(retry.outcome.deleted, 1);
        assert!(events.get(a.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_run_is_recorded_on_task_row() {
        let (_dir, pool, engine) = test_engine();
        let yesterday = fixed_now() - Duration::days(1);
        seed(&pool, "Old concert", EventStatus::Upcoming, Some(yesterday));

        engine.delete_expired_events().await.unwrap();

        let tasks = TaskStore::new(pool);
        let task = tasks.find(TaskType::DeleteExpiredEvents).unwrap().unwrap();
        assert!(task.enabled);
        assert_eq!(task.last_run_at.unwrap(), fixed_now());

        let outcome = task.last_outcome.unwrap();
        assert_eq!(outcome.deleted, 1);
        assert_eq!(outcome.deleted_events.len(), 1);
        assert_eq!(outcome.deleted_events[0].title, "Old concert");
    }

    #[tokio::test]
    async fn test_zero_match_run_still_records() {
        let (_dir, pool, engine) = test_engine();

        let report = engine.delete_expired_events().await.unwrap();
        assert_eq!(report.outcome.deleted, 0);

        let tasks = TaskStore::new(pool);
        let task = tasks.find(TaskType::DeleteExpiredEvents).unwrap().unwrap();
        assert_eq!(task.last_run_at.unwrap(), fixed_now());
        assert_eq!(task.last_outcome.unwrap().message, "No expired events found");
    }

    #[tokio::test]
    async fn test_scan_failure_writes_nothing() {
        let (_dir, pool, engine) = test_engine();

        // Drop the events table to make the scan itself fail.
        let conn = pool.get().unwrap();
        conn.execute_batch("DROP TABLE events").unwrap();

        let err = engine.delete_expired_events().await.unwrap_err();
        assert!(matches!(err, CleanupError::ScanFailed(_)));

        let tasks = TaskStore::new(pool);
        assert!(tasks.find(TaskType::DeleteExpiredEvents).unwrap().is_none());
    }
}
