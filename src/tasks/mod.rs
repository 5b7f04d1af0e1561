//! Persisted scheduled-task records for recurring maintenance jobs.
//!
//! One row per task type. The row carries the job's cadence (`run_time`,
//! `frequency`), the next intended run, and a typed record of the most
//! recent run's outcome. Only the scheduler driver and the cleanup engine
//! write to these rows.

pub mod store;

pub use self::store::TaskStore;

use chrono::{DateTime, Utc};

/// Discriminator for recurring maintenance jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    /// Delete events whose deadline has passed. The only type with an engine.
    DeleteExpiredEvents,
    /// Send reminder emails ahead of deadlines. Declared, not implemented.
    EventReminders,
    /// Remove orphaned uploads. Declared, not implemented.
    UploadCleanup,
}

impl TaskType {
    pub fn description(&self) -> &'static str {
        match self {
            TaskType::DeleteExpiredEvents => "Delete events whose deadline has passed",
            TaskType::EventReminders => "Send reminder emails ahead of event deadlines",
            TaskType::UploadCleanup => "Remove uploads no longer referenced by any event",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskType::DeleteExpiredEvents => write!(f, "delete-expired-events"),
            TaskType::EventReminders => write!(f, "event-reminders"),
            TaskType::UploadCleanup => write!(f, "upload-cleanup"),
        }
    }
}

impl std::str::FromStr for TaskType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delete-expired-events" => Ok(TaskType::DeleteExpiredEvents),
            "event-reminders" => Ok(TaskType::EventReminders),
            "upload-cleanup" => Ok(TaskType::UploadCleanup),
            other => Err(anyhow::anyhow!("unknown task type: {other}")),
        }
    }
}

/// An event removed by a cleanup run, as recorded in the run outcome.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DeletedEvent {
    pub id: String,
    pub title: String,
}

/// Typed record of a single run's outcome.
///
/// Replaced wholesale on every run; only the most recent run is retained.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RunOutcome {
    pub deleted: u32,
    pub failed: u32,
    pub deleted_events: Vec<DeletedEvent>,
    pub message: String,
}

/// A scheduled-task row.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScheduledTask {
    pub task_type: TaskType,
    pub description: String,
    /// Durable on/off toggle. Runs do not touch this; the last-run state
    /// lives in `last_run_at` and `last_outcome`.
    pub enabled: bool,
    pub last_run_at: Option<DateTime<Utc>>,
    pub next_run_at: Option<DateTime<Utc>>,
    pub run_time: String,
    pub frequency: String,
    pub last_outcome: Option<RunOutcome>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
