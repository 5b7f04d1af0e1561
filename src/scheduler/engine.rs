//! Process-level driving loop for the cleanup job.

use crate::cleanup::CleanupEngine;
use crate::config::CleanupSettings;
use crate::scheduler::SchedulerDriver;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Main scheduler execution loop.
///
/// On start: arm the schedule, wait a short boot delay, then run the engine
/// once unconditionally. Thereafter poll the wall clock on a fixed interval
/// and run whenever the local time reads exactly the configured run time
/// (level-triggered, one firing per day with minute-level polling). Failures
/// are logged and never terminate the loop.
pub async fn run_scheduler_loop(
    engine: Arc<CleanupEngine>,
    driver: Arc<SchedulerDriver>,
    settings: CleanupSettings,
) {
    info!("Cleanup scheduler started");

    match driver.schedule_cleanup() {
        Ok(outcome) => {
            info!(next_run = %outcome.next_run, created = outcome.created, "Cleanup schedule armed")
        }
        Err(e) => error!("Failed to arm cleanup schedule: {e:#}"),
    }

    // Run-on-boot policy: one pass shortly after start, independent of the
    // armed next-run instant.
    tokio::time::sleep(Duration::from_secs(settings.boot_delay_secs)).await;
    run_once(&engine).await;

    let mut interval = tokio::time::interval(Duration::from_secs(settings.poll_interval_secs));

    loop {
        interval.tick().await;

        if driver.is_due_now() {
            run_once(&engine).await;

            // Re-arm so the recorded next-run moves to the following day.
            match driver.schedule_cleanup() {
                Ok(outcome) => info!(next_run = %outcome.next_run, "Cleanup schedule re-armed"),
                Err(e) => error!("Failed to re-arm cleanup schedule: {e:#}"),
            }
        }
    }
}

async fn run_once(engine: &CleanupEngine) {
    match engine.delete_expired_events().await {
        Ok(report) => info!(
            deleted = report.outcome.deleted,
            failed = report.outcome.failed,
            "Cleanup run complete"
        ),
        Err(e) => error!("Cleanup run failed: {e}"),
    }
}
