//! In-memory task store.
//!
//! [`InMemoryTaskStore`] keeps records in a `DashMap` keyed by request id,
//! each entry holding that request's tasks ordered by task id. Queries whose
//! filter pins the request id (and optionally the task id) by equality touch
//! only that shard; anything else scans every request.
//!
//! # Examples
//!
//! ```
//! use task_resources::domain::TaskRecord;
//! use task_resources::store::InMemoryTaskStore;
//!
//! let store = InMemoryTaskStore::new();
//! store.upsert(TaskRecord::new(1, 1, 1, "NAMENODE"));
//! store.upsert(TaskRecord::new(1, 2, 1, "DATANODE"));
//! assert_eq!(store.len(), 2);
//! assert_eq!(store.get(1, 2).unwrap().role, "DATANODE");
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::TaskRecord;
use crate::query::TaskQuery;

use super::{StorageError, TaskStore};

/// Thread-safe in-memory [`TaskStore`].
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    requests: DashMap<i64, BTreeMap<i64, TaskRecord>>,
}

impl InMemoryTaskStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record with the same `(request_id, task_id)`.
    ///
    /// Returns the replaced record, if any.
    pub fn upsert(&self, record: TaskRecord) -> Option<TaskRecord> {
        self.requests
            .entry(record.request_id)
            .or_default()
            .insert(record.task_id, record)
    }

    /// Returns a copy of one record.
    pub fn get(&self, request_id: i64, task_id: i64) -> Option<TaskRecord> {
        self.requests
            .get(&request_id)
            .and_then(|tasks| tasks.get(&task_id).cloned())
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.requests.iter().map(|entry| entry.value().len()).sum()
    }

    /// Returns `true` if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.requests.iter().all(|entry| entry.value().is_empty())
    }

    /// Copies the records that may match `query`.
    fn candidates(&self, query: &TaskQuery) -> Vec<TaskRecord> {
        let constraint = query.key_constraint();
        match constraint.request_id {
            Some(request_id) => {
                tracing::debug!(
                    request_id,
                    task_id = ?constraint.task_id,
                    "keyed task lookup"
                );
                let Some(tasks) = self.requests.get(&request_id) else {
                    return Vec::new();
                };
                let found: Vec<TaskRecord> = match constraint.task_id {
                    Some(task_id) => tasks.get(&task_id).cloned().into_iter().collect(),
                    None => tasks.values().cloned().collect(),
                };
                found
            },
            None => self
                .requests
                .iter()
                .flat_map(|entry| match constraint.task_id {
                    Some(task_id) => entry.value().get(&task_id).cloned().into_iter().collect(),
                    None => entry.value().values().cloned().collect::<Vec<_>>(),
                })
                .collect(),
        }
    }
}

impl FromIterator<TaskRecord> for InMemoryTaskStore {
    fn from_iter<I: IntoIterator<Item = TaskRecord>>(iter: I) -> Self {
        let store = Self::new();
        for record in iter {
            store.upsert(record);
        }
        store
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn find_matching(&self, query: &TaskQuery) -> Result<Vec<TaskRecord>, StorageError> {
        // Shard guards are released before filtering.
        let candidates = self.candidates(query);
        Ok(query.execute(&candidates))
    }
}
