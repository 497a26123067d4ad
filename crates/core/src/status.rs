//! Status vocabulary shared by the engine and the HTTP layer.
//!
//! - [`Priority`]: accepted on submit and stored, never used for ordering.
//! - [`BatchStatus`]: per-batch lifecycle, forward-only.
//! - [`AggregateStatus`]: ingestion-level status derived on read.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BatchGateError;

// ── Priority ─────────────────────────────────────────────────────────

/// Priority tag attached to an ingestion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl FromStr for Priority {
    type Err = BatchGateError;

    /// Case-sensitive: only `HIGH`, `MEDIUM` and `LOW` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HIGH" => Ok(Self::High),
            "MEDIUM" => Ok(Self::Medium),
            "LOW" => Ok(Self::Low),
            other => Err(BatchGateError::InvalidInput(format!(
                "priority must be one of HIGH, MEDIUM, LOW (got '{}')",
                other
            ))),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Batch status ─────────────────────────────────────────────────────

/// Lifecycle of a single batch.
///
/// Transitions only move forward:
/// `not_started -> in_progress -> (completed | failed)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    #[serde(alias = "yet_to_start")]
    NotStarted,
    #[serde(alias = "triggered")]
    InProgress,
    Completed,
    Failed,
}

impl BatchStatus {
    fn rank(self) -> u8 {
        match self {
            Self::NotStarted => 0,
            Self::InProgress => 1,
            Self::Completed | Self::Failed => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether moving from `self` to `next` respects the forward-only order.
    ///
    /// Re-entering `in_progress` (a retry) is allowed; leaving a terminal
    /// state is not.
    pub fn can_transition_to(self, next: BatchStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        next.rank() >= self.rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Aggregate status ─────────────────────────────────────────────────

/// Ingestion-level status, computed from the current batch statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatus {
    Triggered,
    Completed,
    Failed,
}

impl AggregateStatus {
    /// `completed` if every batch completed, else `failed` if any batch
    /// failed, else `triggered`.
    pub fn derive<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = BatchStatus>,
    {
        let mut all_completed = true;
        let mut any_failed = false;
        for status in statuses {
            all_completed &= status == BatchStatus::Completed;
            any_failed |= status == BatchStatus::Failed;
        }

        if all_completed {
            Self::Completed
        } else if any_failed {
            Self::Failed
        } else {
            Self::Triggered
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Triggered => "triggered",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for AggregateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use BatchStatus::*;

    #[test]
    fn test_priority_parse() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("MEDIUM".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!("LOW".parse::<Priority>().unwrap(), Priority::Low);
    }

    #[test]
    fn test_priority_parse_is_case_sensitive() {
        let err = "high".parse::<Priority>().unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!("URGENT".parse::<Priority>().is_err());
        assert!("".parse::<Priority>().is_err());
    }

    #[test]
    fn test_priority_serde() {
        let json = serde_json::to_string(&Priority::Medium).unwrap();
        assert_eq!(json, r#""MEDIUM""#);
        let p: Priority = serde_json::from_str(r#""LOW""#).unwrap();
        assert_eq!(p, Priority::Low);
    }

    #[test]
    fn test_batch_status_serde() {
        for (variant, expected) in [
            (NotStarted, "not_started"),
            (InProgress, "in_progress"),
            (Completed, "completed"),
            (Failed, "failed"),
        ] {
            let json = serde_json::to_string(&variant).unwrap();
            assert_eq!(json, format!("\"{}\"", expected));
            assert_eq!(variant.to_string(), expected);
        }
    }

    #[test]
    fn test_batch_status_legacy_aliases() {
        let s: BatchStatus = serde_json::from_str(r#""yet_to_start""#).unwrap();
        assert_eq!(s, NotStarted);
        let s: BatchStatus = serde_json::from_str(r#""triggered""#).unwrap();
        assert_eq!(s, InProgress);
    }

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(NotStarted.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Failed));
    }

    #[test]
    fn test_regressions_rejected() {
        assert!(!InProgress.can_transition_to(NotStarted));
        for terminal in [Completed, Failed] {
            for next in [NotStarted, InProgress, Completed, Failed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_aggregate_all_completed() {
        assert_eq!(
            AggregateStatus::derive([Completed, Completed]),
            AggregateStatus::Completed
        );
    }

    #[test]
    fn test_aggregate_failed_wins_over_in_flight() {
        assert_eq!(
            AggregateStatus::derive([Completed, Failed, InProgress]),
            AggregateStatus::Failed
        );
        assert_eq!(
            AggregateStatus::derive([Failed, NotStarted]),
            AggregateStatus::Failed
        );
    }

    #[test]
    fn test_aggregate_triggered() {
        assert_eq!(
            AggregateStatus::derive([NotStarted, NotStarted]),
            AggregateStatus::Triggered
        );
        assert_eq!(
            AggregateStatus::derive([Completed, InProgress]),
            AggregateStatus::Triggered
        );
    }

    #[test]
    fn test_aggregate_serde() {
        let json = serde_json::to_string(&AggregateStatus::Triggered).unwrap();
        assert_eq!(json, r#""triggered""#);
    }
}
