//! The scheduler driver: arm/re-arm the cleanup job and read its status.

use crate::cleanup::Clock;
use crate::config::CleanupSettings;
use crate::tasks::store::Armed;
use crate::tasks::{RunOutcome, TaskStore, TaskType};
use anyhow::{Context, Result};
use chrono::{DateTime, Local, Timelike, Utc};
use std::sync::Arc;

/// Result of an arm/re-arm call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScheduleOutcome {
    /// True when the call created the task row, false when it updated one.
    pub created: bool,
    pub next_run: DateTime<Utc>,
}

/// Cadence columns as exposed in status reads.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CadenceInfo {
    pub run_time: String,
    pub frequency: String,
}

/// Read-only view of the cleanup job's scheduled-task row.
#[derive(Debug, serde::Serialize)]
pub struct TaskState {
    pub active: bool,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
    pub config: Option<CadenceInfo>,
    pub last_outcome: Option<RunOutcome>,
    pub message: String,
}

/// Decides when the cleanup engine runs and owns the scheduled-task row's
/// cadence bookkeeping.
pub struct SchedulerDriver {
    tasks: TaskStore,
    clock: Arc<dyn Clock>,
    settings: CleanupSettings,
}

impl SchedulerDriver {
    pub fn new(tasks: TaskStore, clock: Arc<dyn Clock>, settings: CleanupSettings) -> Self {
        Self {
            tasks,
            clock,
            settings,
        }
    }

    /// Arm (or re-arm) the cleanup job.
    ///
    /// The next run is always tomorrow's date at the configured run time in
    /// local time, relative to the call instant. A same-day repeat call lands
    /// on the same target.
    pub fn schedule_cleanup(&self) -> Result<ScheduleOutcome> {
        let now = self.clock.now_utc();
        let next_run = self.next_run_instant()?.with_timezone(&Utc);

        let armed = self.tasks.arm(
            TaskType::DeleteExpiredEvents,
            next_run,
            &self.settings.run_time(),
            &self.settings.frequency,
            now,
        )?;

        Ok(ScheduleOutcome {
            created: armed == Armed::Created,
            next_run,
        })
    }

    /// Read the cleanup job's state. No side effects.
    pub fn cleanup_status(&self) -> Result<TaskState> {
        let task = self.tasks.find(TaskType::DeleteExpiredEvents)?;

        let Some(task) = task else {
            return Ok(TaskState {
                active: false,
                last_run: None,
                next_run: None,
                config: None,
                last_outcome: None,
                message: "Expired-event cleanup is not scheduled".to_string(),
            });
        };

        let mut message = match task.last_run_at {
            Some(at) => format!("Last run at {}", at.to_rfc3339()),
            None => "Never run".to_string(),
        };
        if let Some(outcome) = &task.last_outcome {
            message.push_str(&format!(
                " ({} deleted, {} failed)",
                outcome.deleted, outcome.failed
            ));
        }
        if let Some(at) = task.next_run_at {
            message.push_str(&format!("; next run at {}", at.to_rfc3339()));
        }
        if !task.enabled {
            message.push_str("; task is disabled");
        }

        Ok(TaskState {
            active: task.enabled,
            last_run: task.last_run_at,
            next_run: task.next_run_at,
            config: Some(CadenceInfo {
                run_time: task.run_time,
                frequency: task.frequency,
            }),
            last_outcome: task.last_outcome,
            message,
        })
    }

    /// Level-triggered check used by the polling loop: true while the local
    /// wall clock reads exactly the configured hour and minute.
    pub fn is_due_now(&self) -> bool {
        let now = self.clock.now_local();
        now.hour() == self.settings.run_hour && now.minute() == self.settings.run_minute
    }

    fn next_run_instant(&self) -> Result<DateTime<Local>> {
        let today = self.clock.now_local().date_naive();
        let tomorrow = today.succ_opt().context("date out of range")?;
        let naive = tomorrow
            .and_hms_opt(self.settings.run_hour, self.settings.run_minute, 0)
            .context("invalid run time in configuration")?;
        naive
            .and_local_timezone(Local)
            .earliest()
            .context("run time does not exist in the local timezone")
    }
}
