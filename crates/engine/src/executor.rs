//! Runs a single batch through the bounded retry loop.

use std::sync::Arc;

use tracing::{debug, error, warn};

use batchgate_core::BatchStatus;

use crate::rate_gate::RateGate;
use crate::types::Batch;
use crate::work::BatchWork;

/// Every attempt, retries included, first passes the shared [`RateGate`].
pub struct BatchExecutor {
    gate: Arc<RateGate>,
    work: Arc<dyn BatchWork>,
    max_attempts: u32,
}

impl BatchExecutor {
    pub fn new(gate: Arc<RateGate>, work: Arc<dyn BatchWork>, max_attempts: u32) -> Self {
        Self {
            gate,
            work,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn gate(&self) -> &Arc<RateGate> {
        &self.gate
    }

    /// Drive `batch` to `completed` or `failed`.
    ///
    /// Never returns an error: a batch whose every attempt fails ends in
    /// `failed`, and a success on any attempt (the last one included) ends
    /// in `completed` with no further attempts.
    pub async fn run(&self, batch: &Batch) {
        debug_assert!(!batch.ids.is_empty(), "batches always hold at least one id");

        loop {
            self.gate.acquire().await;
            let attempt = batch.begin_attempt();
            debug!(batch_id = %batch.id, attempt, ids = batch.ids.len(), "processing batch");

            match self.work.process(batch.id, &batch.ids).await {
                Ok(()) => {
                    batch.finish(BatchStatus::Completed);
                    debug!(batch_id = %batch.id, attempt, "batch completed");
                    return;
                }
                Err(e) => {
                    warn!(batch_id = %batch.id, attempt, error = %e, "batch attempt failed");
                    if attempt >= self.max_attempts {
                        batch.finish(BatchStatus::Failed);
                        error!(
                            batch_id = %batch.id,
                            attempts = attempt,
                            "batch failed after exhausting retries"
                        );
                        return;
                    }
                }
            }
        }
    }
}
