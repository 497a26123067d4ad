//! In-memory ingestion store.
//!
//! Records live for the lifetime of the process. The map lock only guards
//! membership; batch state inside a record has its own locks, so readers
//! never wait on a running job and jobs never contend with each other here.

use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use uuid::Uuid;

use crate::types::{read_lock, write_lock, IngestionRecord};

/// Uses `IndexMap` to preserve submission order while allowing O(1)
/// lookups by ingestion id.
#[derive(Debug, Clone, Default)]
pub struct IngestionStore {
    records: Arc<RwLock<IndexMap<Uuid, Arc<IngestionRecord>>>>,
}

impl IngestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, record: Arc<IngestionRecord>) {
        write_lock(&self.records).insert(record.id, record);
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<IngestionRecord>> {
        read_lock(&self.records).get(id).cloned()
    }

    /// All records, oldest first.
    pub fn list(&self) -> Vec<Arc<IngestionRecord>> {
        read_lock(&self.records).values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        read_lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use batchgate_core::{BatchStatus, Priority};
    use serde_json::json;

    use crate::types::Batch;

    fn record() -> Arc<IngestionRecord> {
        Arc::new(IngestionRecord::new(
            Priority::Medium,
            vec![Batch::new(vec![json!("a")])],
        ))
    }

    #[test]
    fn test_store_new() {
        let store = IngestionStore::new();
        assert!(store.is_empty());
        assert!(store.get(&Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_put_get() {
        let store = IngestionStore::new();
        let r = record();
        store.put(r.clone());
        let fetched = store.get(&r.id).unwrap();
        assert!(Arc::ptr_eq(&fetched, &r));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let store = IngestionStore::new();
        let records: Vec<_> = (0..5).map(|_| record()).collect();
        for r in &records {
            store.put(r.clone());
        }
        let ids: Vec<_> = store.list().iter().map(|r| r.id).collect();
        let expected: Vec<_> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_readers_see_in_place_mutation() {
        let store = IngestionStore::new();
        let r = record();
        store.put(r.clone());

        r.batches()[0].begin_attempt();
        let fetched = store.get(&r.id).unwrap();
        assert_eq!(fetched.batches()[0].status(), BatchStatus::InProgress);
    }

    #[test]
    fn test_concurrent_inserts() {
        let store = IngestionStore::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        store.put(record());
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 400);
    }
}
