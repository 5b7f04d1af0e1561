use anyhow::Result;
use clap::{Parser, Subcommand};
use eventsweep::cleanup::{CleanupEngine, Clock, SystemClock};
use eventsweep::config::Config;
use eventsweep::events::EventStore;
use eventsweep::scheduler::SchedulerDriver;
use eventsweep::tasks::TaskStore;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "eventsweep",
    about = "Expired-event cleanup daemon for event-listing platforms",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the daemon (API server + cleanup scheduler)
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        bind: Option<String>,

        /// SQLite database path (overrides config)
        #[arg(long)]
        db: Option<String>,
    },

    /// Run one cleanup pass immediately
    Cleanup {
        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,

        /// SQLite database path (overrides config)
        #[arg(long)]
        db: Option<String>,
    },

    /// Manage the cleanup schedule
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },
}

#[derive(Subcommand)]
enum ScheduleAction {
    /// Arm (or re-arm) the daily cleanup run
    Arm {
        /// SQLite database path (overrides config)
        #[arg(long)]
        db: Option<String>,
    },

    /// Show the cleanup job's status
    Status {
        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,

        /// SQLite database path (overrides config)
        #[arg(long)]
        db: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind, db } => {
            let mut config = Config::load_or_default();
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(db) = db {
                config.database.path = db;
            }
            tracing::info!(bind = %config.server.bind, "Starting eventsweep daemon");
            eventsweep::serve(config).await?;
        }
        Commands::Cleanup { json, db } => {
            let (engine, _driver) = build_components(db)?;
            let report = engine.delete_expired_events().await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("\n{}", report.outcome.message);
                if !report.outcome.deleted_events.is_empty() {
                    println!("{:<36} | Title", "Id");
                    println!("{:-<36}-|-{:-<40}", "", "");
                    for event in &report.outcome.deleted_events {
                        println!("{:<36} | {}", event.id, event.title);
                    }
                }
            }
        }
        Commands::Schedule { action } => match action {
            ScheduleAction::Arm { db } => {
                let (_engine, driver) = build_components(db)?;
                let outcome = driver.schedule_cleanup()?;
                let verb = if outcome.created { "created" } else { "updated" };
                println!(
                    "Cleanup schedule {}; next run at {}.",
                    verb,
                    outcome.next_run.to_rfc3339()
                );
            }
            ScheduleAction::Status { json, db } => {
                let (_engine, driver) = build_components(db)?;
                let state = driver.cleanup_status()?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&state)?);
                } else {
                    println!("Active:   {}", state.active);
                    println!(
                        "Last run: {}",
                        state
                            .last_run
                            .map(|t| t.to_rfc3339())
                            .unwrap_or_else(|| "never".to_string())
                    );
                    println!(
                        "Next run: {}",
                        state
                            .next_run
                            .map(|t| t.to_rfc3339())
                            .unwrap_or_else(|| "unscheduled".to_string())
                    );
                    println!("{}", state.message);
                }
            }
        },
    }

    Ok(())
}

/// Wire up the engine and driver for one-shot CLI commands.
fn build_components(db: Option<String>) -> Result<(CleanupEngine, SchedulerDriver)> {
    let mut config = Config::load_or_default();
    if let Some(db) = db {
        config.database.path = db;
    }

    let pool = eventsweep::storage::open_pool(&config.database.path)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let events = EventStore::new(pool.clone());
    let tasks = TaskStore::new(pool);

    let engine = CleanupEngine::new(
        events,
        tasks.clone(),
        clock.clone(),
        config.cleanup.clone(),
    );
    let driver = SchedulerDriver::new(tasks, clock, config.cleanup);
    Ok((engine, driver))
}
