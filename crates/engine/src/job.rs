//! Background job driving one ingestion's batches.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::info;

use crate::executor::BatchExecutor;
use crate::types::IngestionRecord;

/// Processes the batches of one ingestion strictly in order: batch N+1 is
/// not started until batch N is `completed` or `failed`.
pub struct IngestionJob {
    record: Arc<IngestionRecord>,
    executor: Arc<BatchExecutor>,
}

impl IngestionJob {
    pub fn new(record: Arc<IngestionRecord>, executor: Arc<BatchExecutor>) -> Self {
        Self { record, executor }
    }

    /// Spawn the job as a detached tokio task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        let record = &self.record;
        let start = Instant::now();
        info!(
            ingestion_id = %record.id,
            priority = %record.priority,
            batches = record.batches().len(),
            "ingestion job started"
        );

        for batch in record.batches() {
            self.executor.run(batch).await;
        }

        // Set regardless of batch outcomes; queries derive status from the batches.
        record.mark_finished();

        info!(
            ingestion_id = %record.id,
            status = %record.aggregate_status(),
            duration_ms = start.elapsed().as_millis() as u64,
            "ingestion job finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use batchgate_core::{AggregateStatus, BatchStatus, Priority};
    use serde_json::json;

    use crate::rate_gate::RateGate;
    use crate::types::Batch;
    use crate::work::mock::ScriptedWork;

    fn record(batches: usize) -> Arc<IngestionRecord> {
        let batches = (0..batches).map(|i| Batch::new(vec![json!(i)])).collect();
        Arc::new(IngestionRecord::new(Priority::Low, batches))
    }

    fn executor(work: Arc<ScriptedWork>) -> Arc<BatchExecutor> {
        Arc::new(BatchExecutor::new(
            Arc::new(RateGate::new(Duration::from_millis(5000))),
            work,
            3,
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_batches_run_in_order() {
        let work = Arc::new(ScriptedWork::always_ok());
        let record = record(3);
        IngestionJob::new(record.clone(), executor(work.clone()))
            .run()
            .await;

        let expected: Vec<_> = record.batches().iter().map(|b| b.id).collect();
        assert_eq!(work.call_order(), expected);
        assert_eq!(record.aggregate_status(), AggregateStatus::Completed);
        assert!(record.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_batch_waits_for_terminal_state() {
        let work = Arc::new(ScriptedWork::always_fail());
        let record = record(2);
        IngestionJob::new(record.clone(), executor(work.clone()))
            .run()
            .await;

        let first = record.batches()[0].id;
        let second = record.batches()[1].id;
        // All retries of the first batch happen before the second starts.
        assert_eq!(
            work.call_order(),
            vec![first, first, first, second, second, second]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_batch_does_not_abort_siblings() {
        let work = Arc::new(ScriptedWork::always_fail());
        let record = record(2);
        IngestionJob::new(record.clone(), executor(work.clone()))
            .run()
            .await;

        for batch in record.batches() {
            assert_eq!(batch.status(), BatchStatus::Failed);
            assert_eq!(batch.attempts(), 3);
        }
        // Marker is set even though the ingestion failed.
        assert!(record.is_finished());
        assert_eq!(record.aggregate_status(), AggregateStatus::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_job_is_observable_while_running() {
        let work = Arc::new(ScriptedWork::always_ok());
        let record = record(2);
        let handle = IngestionJob::new(record.clone(), executor(work)).spawn();

        // The second batch cannot start until the gate reopens 5s later.
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(record.batches()[0].status(), BatchStatus::Completed);
        assert_eq!(record.batches()[1].status(), BatchStatus::NotStarted);
        assert_eq!(record.aggregate_status(), AggregateStatus::Triggered);
        assert!(!record.is_finished());

        handle.await.unwrap();
        assert_eq!(record.aggregate_status(), AggregateStatus::Completed);
    }
}
