use crate::cleanup::CleanupEngine;
use crate::scheduler::SchedulerDriver;
use crate::storage::Pool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool,
    pub engine: Arc<CleanupEngine>,
    pub scheduler: Arc<SchedulerDriver>,
}
