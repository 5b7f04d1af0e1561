//! Expired-event cleanup engine.

pub mod clock;
pub mod engine;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::engine::CleanupEngine;

use crate::tasks::RunOutcome;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("failed to scan for expired events: {0}")]
    ScanFailed(anyhow::Error),

    #[error("failed to record cleanup run: {0}")]
    TaskRecord(anyhow::Error),
}

/// Result of a single cleanup run.
#[derive(Debug, serde::Serialize)]
pub struct CleanupReport {
    /// The single instant captured at the start of the run; every deadline
    /// comparison in the run used this value.
    pub run_at: DateTime<Utc>,
    pub outcome: RunOutcome,
}
