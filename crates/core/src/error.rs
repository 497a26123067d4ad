use thiserror::Error;

/// Errors surfaced synchronously to callers of `submit` and `query`.
///
/// Per-attempt processing failures never appear here; they are absorbed by
/// the batch retry loop and only show up as a terminal `failed` status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchGateError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Ingestion not found: {0}")]
    NotFound(String),
}

impl BatchGateError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::NotFound(_) => 404,
        }
    }

    /// Short client-facing message, without the offending value.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "Invalid input",
            Self::NotFound(_) => "Ingestion ID not found",
        }
    }
}
