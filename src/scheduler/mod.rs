//! Scheduling of the recurring cleanup job.

pub mod driver;
pub mod engine;

pub use self::driver::{CadenceInfo, ScheduleOutcome, SchedulerDriver, TaskState};
pub use self::engine::run_scheduler_loop;
