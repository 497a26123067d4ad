//! Submit and query entry points.
//!
//! [`Scheduler::submit`] validates the request, splits the ids into
//! consecutive batches, stores the record and launches its
//! [`IngestionJob`] in the background, returning the ingestion id without
//! waiting. [`Scheduler::query`] reads the store and derives the aggregate
//! status on demand.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use batchgate_core::{BatchGateError, Priority, SchedulerConfig};

use crate::executor::BatchExecutor;
use crate::job::IngestionJob;
use crate::rate_gate::RateGate;
use crate::store::IngestionStore;
use crate::types::{Batch, IngestionRecord, IngestionSnapshot, IngestionSummary, ItemId};
use crate::work::{BatchWork, SimulatedWork};

// ── Request ──────────────────────────────────────────────────────────

/// Raw submit payload. Fields are left untyped so that shape errors are
/// reported as `InvalidInput` rather than as deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub ids: Option<serde_json::Value>,
    #[serde(default)]
    pub priority: Option<serde_json::Value>,
}

impl IngestRequest {
    /// `ids` must be a non-empty array; `priority` one of HIGH, MEDIUM, LOW.
    pub fn validate(self) -> Result<(Vec<ItemId>, Priority), BatchGateError> {
        let ids = match self.ids {
            Some(serde_json::Value::Array(ids)) if !ids.is_empty() => ids,
            Some(serde_json::Value::Array(_)) => {
                return Err(BatchGateError::InvalidInput(
                    "ids must not be empty".to_string(),
                ))
            }
            _ => {
                return Err(BatchGateError::InvalidInput(
                    "ids must be an array".to_string(),
                ))
            }
        };

        let priority: Priority = match self.priority {
            Some(serde_json::Value::String(p)) => p.parse()?,
            _ => {
                return Err(BatchGateError::InvalidInput(
                    "priority must be a string".to_string(),
                ))
            }
        };

        Ok((ids, priority))
    }
}

// ── Split policy ─────────────────────────────────────────────────────

/// Consecutive batches of at most `batch_size` ids; only the last may be
/// shorter. Concatenating the batches reproduces `ids`.
pub fn split_into_batches(ids: &[ItemId], batch_size: usize) -> Vec<Batch> {
    ids.chunks(batch_size.max(1))
        .map(|chunk| Batch::new(chunk.to_vec()))
        .collect()
}

// ── Scheduler ────────────────────────────────────────────────────────

/// Owns the store and the process-wide rate gate. Create one per process
/// and share it.
pub struct Scheduler {
    config: SchedulerConfig,
    store: IngestionStore,
    executor: Arc<BatchExecutor>,
}

impl Scheduler {
    /// Scheduler backed by [`SimulatedWork`] built from `config`.
    pub fn new(config: SchedulerConfig) -> Self {
        let work = Arc::new(SimulatedWork::from_config(&config));
        Self::with_work(config, work)
    }

    pub fn with_work(config: SchedulerConfig, work: Arc<dyn BatchWork>) -> Self {
        let config = config.normalized();
        let gate = Arc::new(RateGate::new(config.rate_limit_interval()));
        let executor = Arc::new(BatchExecutor::new(gate, work, config.max_retry_attempts));
        Self {
            config,
            store: IngestionStore::new(),
            executor,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn store(&self) -> &IngestionStore {
        &self.store
    }

    /// Validate a raw payload and submit it.
    pub fn submit_request(&self, request: IngestRequest) -> Result<Uuid, BatchGateError> {
        let (ids, priority) = request.validate()?;
        self.submit(ids, priority)
    }

    /// Create the ingestion and start processing it in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, ids: Vec<ItemId>, priority: Priority) -> Result<Uuid, BatchGateError> {
        if ids.is_empty() {
            return Err(BatchGateError::InvalidInput(
                "ids must not be empty".to_string(),
            ));
        }

        let batches = split_into_batches(&ids, self.config.batch_size);
        let record = Arc::new(IngestionRecord::new(priority, batches));
        let ingestion_id = record.id;
        self.store.put(record.clone());

        info!(
            ingestion_id = %ingestion_id,
            priority = %priority,
            ids = ids.len(),
            batches = record.batches().len(),
            "ingestion submitted"
        );

        IngestionJob::new(record, self.executor.clone()).spawn();
        Ok(ingestion_id)
    }

    /// Current state of an ingestion. Unknown or malformed ids are `NotFound`.
    pub fn query(&self, ingestion_id: &str) -> Result<IngestionSnapshot, BatchGateError> {
        self.lookup(ingestion_id).map(|record| record.snapshot())
    }

    /// Every ingestion, in submission order.
    pub fn list(&self) -> Vec<IngestionSummary> {
        self.store.list().iter().map(|r| r.summary()).collect()
    }

    /// Wait until the ingestion's job has processed every batch, then
    /// return its final state.
    pub async fn wait_for(&self, ingestion_id: &str) -> Result<IngestionSnapshot, BatchGateError> {
        let record = self.lookup(ingestion_id)?;
        record.wait_finished().await;
        Ok(record.snapshot())
    }

    fn lookup(&self, ingestion_id: &str) -> Result<Arc<IngestionRecord>, BatchGateError> {
        Uuid::parse_str(ingestion_id)
            .ok()
            .and_then(|id| self.store.get(&id))
            .ok_or_else(|| BatchGateError::NotFound(ingestion_id.to_string()))
    }
}

// ── Tests ────────────────────────────────────────────────────────────
