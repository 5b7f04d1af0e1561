//! eventsweep -- Expired-event cleanup daemon for event-listing platforms.
//!
//! This crate provides the recurring maintenance job that removes event
//! listings whose deadline has passed: the cleanup engine, its persisted
//! scheduled-task record, the scheduler that drives it, and an HTTP API for
//! manual triggers and status reads.

pub mod api;
pub mod cleanup;
pub mod config;
pub mod events;
pub mod scheduler;
pub mod storage;
pub mod tasks;

use crate::api::state::AppState;
use crate::cleanup::{CleanupEngine, Clock, SystemClock};
use crate::config::Config;
use crate::events::EventStore;
use crate::scheduler::SchedulerDriver;
use crate::tasks::TaskStore;
use anyhow::Result;
use std::sync::Arc;

/// Start the eventsweep daemon: API server and cleanup scheduler.
pub async fn serve(config: Config) -> Result<()> {
    // 1. Initialize Storage
    tracing::info!(db_path = %config.database.path, "Initializing database");
    let pool = storage::open_pool(&config.database.path)?;

    // 2. Wire the cleanup engine and scheduler driver
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let events = EventStore::new(pool.clone());
    let tasks = TaskStore::new(pool.clone());
    let engine = Arc::new(CleanupEngine::new(
        events,
        tasks.clone(),
        clock.clone(),
        config.cleanup.clone(),
    ));
    let driver = Arc::new(SchedulerDriver::new(tasks, clock, config.cleanup.clone()));

    // 3. Start Scheduler loop (background task)
    tokio::spawn(scheduler::run_scheduler_loop(
        engine.clone(),
        driver.clone(),
        config.cleanup.clone(),
    ));

    // 4. Start API Server
    let addr: std::net::SocketAddr = config.server.bind.parse()?;
    let app = api::router(AppState {
        pool,
        engine,
        scheduler: driver,
    });

    tracing::info!(%addr, "eventsweep listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
