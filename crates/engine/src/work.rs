//! The unit of work performed for each batch attempt.
//!
//! [`BatchWork`] is the seam between the retry machinery and whatever the
//! batch is actually sent to. [`SimulatedWork`] stands in for the external
//! system: it sleeps in proportion to the batch size and fails at random.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use uuid::Uuid;

use batchgate_core::SchedulerConfig;

use crate::error::ProcessingError;
use crate::types::ItemId;

/// Processes one attempt of one batch.
#[async_trait]
pub trait BatchWork: Send + Sync {
    /// Returns `Err` when this attempt failed and may be retried.
    async fn process(&self, batch_id: Uuid, ids: &[ItemId]) -> Result<(), ProcessingError>;
}

/// Draws whether the current attempt fails.
pub type FailureDraw = Arc<dyn Fn() -> bool + Send + Sync>;

/// Simulated external processing: `unit` of latency per id, then a failure
/// draw that is independent for every attempt.
pub struct SimulatedWork {
    unit: Duration,
    should_fail: FailureDraw,
}

impl SimulatedWork {
    /// Fail each attempt with the given probability (clamped to `[0, 1]`).
    pub fn new(unit: Duration, failure_probability: f64) -> Self {
        let p = if failure_probability.is_nan() {
            0.0
        } else {
            failure_probability.clamp(0.0, 1.0)
        };
        Self::with_failure_draw(unit, Arc::new(move || rand::thread_rng().gen_bool(p)))
    }

    pub fn with_failure_draw(unit: Duration, should_fail: FailureDraw) -> Self {
        Self { unit, should_fail }
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(config.work_unit(), config.failure_probability)
    }
}

impl fmt::Debug for SimulatedWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedWork")
            .field("unit", &self.unit)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BatchWork for SimulatedWork {
    async fn process(&self, _batch_id: Uuid, ids: &[ItemId]) -> Result<(), ProcessingError> {
        let latency = self.unit.saturating_mul(ids.len() as u32);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if (self.should_fail)() {
            return Err(ProcessingError::Transient(
                "simulated processing error".to_string(),
            ));
        }
        Ok(())
    }
}

/// Deterministic [`BatchWork`] doubles for tests.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Fails the first `failures` attempts of every batch, then succeeds.
    /// Records every call in order.
    pub struct ScriptedWork {
        failures: u32,
        attempts: Mutex<HashMap<Uuid, u32>>,
        calls: Mutex<Vec<(Uuid, tokio::time::Instant)>>,
    }

    impl ScriptedWork {
        pub fn failing_first(failures: u32) -> Self {
            Self {
                failures,
                attempts: Mutex::new(HashMap::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn always_ok() -> Self {
            Self::failing_first(0)
        }

        pub fn always_fail() -> Self {
            Self::failing_first(u32::MAX)
        }

        /// `(batch_id, call time)` for every attempt, in call order.
        pub fn calls(&self) -> Vec<(Uuid, tokio::time::Instant)> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_order(&self) -> Vec<Uuid> {
            self.calls().into_iter().map(|(id, _)| id).collect()
        }
    }

    #[async_trait]
    impl BatchWork for ScriptedWork {
        async fn process(&self, batch_id: Uuid, _ids: &[ItemId]) -> Result<(), ProcessingError> {
            self.calls
                .lock()
                .unwrap()
                .push((batch_id, tokio::time::Instant::now()));

            let mut attempts = self.attempts.lock().unwrap();
            let seen = attempts.entry(batch_id).or_insert(0);
            *seen += 1;
            if *seen <= self.failures {
                Err(ProcessingError::Transient(format!("scripted failure #{}", seen)))
            } else {
                Ok(())
            }
        }
    }
}
