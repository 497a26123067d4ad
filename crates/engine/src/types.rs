//! Ingestion records and batches.
//!
//! A [`Batch`]'s identity and ids are fixed at creation; only its
//! [`BatchState`] changes, and only through the crate-private transition
//! methods the executor calls. An [`IngestionRecord`] is shared between the
//! store (for reads) and its job (for writes) behind an `Arc`.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Notify;
use tracing::warn;
use uuid::Uuid;

use batchgate_core::{AggregateStatus, BatchStatus, Priority};

/// An opaque item identifier, kept exactly as submitted.
pub type ItemId = serde_json::Value;

// Every write is a single field assignment, so a poisoned lock still holds
// consistent data.
pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

// ── Batch ────────────────────────────────────────────────────────────

/// Mutable part of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchState {
    pub status: BatchStatus,
    /// Processing attempts started so far.
    pub attempts: u32,
}

#[derive(Debug)]
pub struct Batch {
    pub id: Uuid,
    pub ids: Vec<ItemId>,
    state: RwLock<BatchState>,
}

impl Batch {
    pub(crate) fn new(ids: Vec<ItemId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            ids,
            state: RwLock::new(BatchState {
                status: BatchStatus::NotStarted,
                attempts: 0,
            }),
        }
    }

    pub fn state(&self) -> BatchState {
        *read_lock(&self.state)
    }

    pub fn status(&self) -> BatchStatus {
        read_lock(&self.state).status
    }

    pub fn attempts(&self) -> u32 {
        read_lock(&self.state).attempts
    }

    /// Mark the start of a new attempt. Returns the 1-based attempt number.
    pub(crate) fn begin_attempt(&self) -> u32 {
        let mut state = write_lock(&self.state);
        if Self::transition(self.id, &mut state, BatchStatus::InProgress) {
            state.attempts += 1;
        }
        state.attempts
    }

    /// Move to a terminal status.
    pub(crate) fn finish(&self, status: BatchStatus) {
        debug_assert!(status.is_terminal());
        let mut state = write_lock(&self.state);
        Self::transition(self.id, &mut state, status);
    }

    fn transition(batch_id: Uuid, state: &mut BatchState, next: BatchStatus) -> bool {
        if !state.status.can_transition_to(next) {
            warn!(
                batch_id = %batch_id,
                from = %state.status,
                to = %next,
                "ignoring backwards batch status transition"
            );
            return false;
        }
        state.status = next;
        true
    }

    pub fn snapshot(&self) -> BatchSnapshot {
        let state = self.state();
        BatchSnapshot {
            batch_id: self.id,
            ids: self.ids.clone(),
            status: state.status,
            attempts: state.attempts,
        }
    }
}

// ── Ingestion record ─────────────────────────────────────────────────

/// One submitted ingestion and its ordered batches.
///
/// The user-facing status is always recomputed from the batches; the
/// `finished_at` marker only records that the job left its batch loop.
#[derive(Debug)]
pub struct IngestionRecord {
    pub id: Uuid,
    /// Stored as submitted; does not influence processing order.
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    batches: Vec<Batch>,
    finished_at: RwLock<Option<DateTime<Utc>>>,
    finished: Notify,
}

impl IngestionRecord {
    pub(crate) fn new(priority: Priority, batches: Vec<Batch>) -> Self {
        Self {
            id: Uuid::new_v4(),
            priority,
            created_at: Utc::now(),
            batches,
            finished_at: RwLock::new(None),
            finished: Notify::new(),
        }
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn aggregate_status(&self) -> AggregateStatus {
        AggregateStatus::derive(self.batches.iter().map(Batch::status))
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        *read_lock(&self.finished_at)
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at().is_some()
    }

    pub(crate) fn mark_finished(&self) {
        *write_lock(&self.finished_at) = Some(Utc::now());
        self.finished.notify_waiters();
    }

    /// Resolve once the owning job has finished its batch loop.
    pub async fn wait_finished(&self) {
        loop {
            let notified = self.finished.notified();
            if self.is_finished() {
                return;
            }
            notified.await;
        }
    }

    pub fn snapshot(&self) -> IngestionSnapshot {
        let batches: Vec<BatchSnapshot> = self.batches.iter().map(Batch::snapshot).collect();
        IngestionSnapshot {
            ingestion_id: self.id,
            status: AggregateStatus::derive(batches.iter().map(|b| b.status)),
            priority: self.priority,
            created_at: self.created_at,
            job_finished: self.is_finished(),
            batches,
        }
    }

    pub fn summary(&self) -> IngestionSummary {
        IngestionSummary {
            ingestion_id: self.id,
            priority: self.priority,
            status: self.aggregate_status(),
            batch_count: self.batches.len(),
            created_at: self.created_at,
        }
    }
}

// ── Read models ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSnapshot {
    pub batch_id: Uuid,
    pub ids: Vec<ItemId>,
    pub status: BatchStatus,
    pub attempts: u32,
}

/// Point-in-time view of an ingestion, as returned by status queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestionSnapshot {
    pub ingestion_id: Uuid,
    pub status: AggregateStatus,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub job_finished: bool,
    pub batches: Vec<BatchSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestionSummary {
    pub ingestion_id: Uuid,
    pub priority: Priority,
    pub status: AggregateStatus,
    pub batch_count: usize,
    pub created_at: DateTime<Utc>,
}

// ── Tests ────────────────────────────────────────────────────────────
