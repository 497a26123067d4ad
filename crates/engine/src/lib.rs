//! Batch ingestion engine.
//!
//! Splits submitted id lists into fixed-size batches and processes them in
//! the background under a single process-wide rate limit:
//!
//! - [`rate_gate`]: the shared clock gate spacing out processing starts.
//! - [`executor`]: runs one batch through the bounded retry loop.
//! - [`job`]: drives an ingestion's batches strictly in order.
//! - [`store`]: in-memory ingestion records, readable while jobs mutate them.
//! - [`scheduler`]: `submit` / `query` entry points and the split policy.
//! - [`work`]: the injectable unit of work (simulated by default).

pub mod error;
pub mod executor;
pub mod job;
pub mod rate_gate;
pub mod scheduler;
pub mod store;
pub mod types;
pub mod work;

pub use error::ProcessingError;
pub use executor::BatchExecutor;
pub use job::IngestionJob;
pub use rate_gate::RateGate;
pub use scheduler::{split_into_batches, IngestRequest, Scheduler};
pub use store::IngestionStore;
pub use types::*;
pub use work::{BatchWork, SimulatedWork};
