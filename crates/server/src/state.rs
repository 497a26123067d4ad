use std::sync::Arc;

use batchgate_engine::Scheduler;

/// Shared application state handed to every handler.
pub struct AppState {
    pub config: batchgate_core::Config,
    pub scheduler: Arc<Scheduler>,
}

impl AppState {
    pub fn new(config: batchgate_core::Config) -> Self {
        let scheduler = Arc::new(Scheduler::new(config.scheduler.clone()));
        Self { config, scheduler }
    }
}
