//! Engine error types.

use thiserror::Error;

/// Failure of a single processing attempt.
///
/// Recovered locally by the executor's retry loop; callers only ever see
/// the resulting batch status.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProcessingError {
    #[error("transient processing failure: {0}")]
    Transient(String),
}
