use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::day::Day;
use crate::error::{Error, Result};
use crate::types::Task;

#[derive(Debug)]
struct Slot {
    task: Task,
    version: u64,
}

#[derive(Debug, Default)]
struct Inner {
    slots: Vec<Slot>,
    index: HashMap<String, usize>,
}

/// Versioned in-memory task collection that serializes completion toggles
///
/// Every toggle names the version it was computed against. A toggle built
/// from a stale snapshot is rejected with [`Error::VersionConflict`] instead
/// of silently overwriting a concurrent one.
#[derive(Debug, Default)]
pub struct TaskLedger {
    inner: Mutex<Inner>,
}

impl TaskLedger {
    pub fn new(tasks: Vec<Task>) -> Result<Self> {
        let mut inner = Inner::default();
        for task in tasks {
            if inner.index.contains_key(&task.id) {
                return Err(Error::DuplicateId(task.id));
            }
            inner.index.insert(task.id.clone(), inner.slots.len());
            inner.slots.push(Slot { task, version: 0 });
        }
        Ok(Self {
            inner: Mutex::new(inner),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // slots are only written after a toggle is fully computed
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current task and its version
    pub fn get(&self, id: &str) -> Option<(Task, u64)> {
        let inner = self.lock();
        let slot = &inner.slots[*inner.index.get(id)?];
        Some((slot.task.clone(), slot.version))
    }

    pub fn version(&self, id: &str) -> Option<u64> {
        self.get(id).map(|(_, version)| version)
    }

    /// Toggle the occurrence of task `id` on `day`
    ///
    /// # Arguments
    /// * `id` - Task identifier
    /// * `day` - Occurrence day to mark or unmark
    /// * `expected_version` - Version the caller last observed
    ///
    /// # Returns
    /// The updated task and its new version
    pub fn toggle(&self, id: &str, day: Day, expected_version: u64) -> Result<(Task, u64)> {
        let mut inner = self.lock();
        let position = *inner
            .index
            .get(id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        let slot = &mut inner.slots[position];

        if slot.version != expected_version {
            tracing::warn!(
                id,
                expected = expected_version,
                actual = slot.version,
                "rejecting toggle built from stale snapshot"
            );
            return Err(Error::VersionConflict {
                id: id.to_string(),
                expected: expected_version,
                actual: slot.version,
            });
        }

        slot.task = slot.task.toggle_completion(day);
        slot.version += 1;
        tracing::debug!(id, %day, version = slot.version, "toggled completion");
        Ok((slot.task.clone(), slot.version))
    }

    /// Clone of the whole collection, in insertion order
    pub fn snapshot(&self) -> Vec<Task> {
        self.lock().slots.iter().map(|s| s.task.clone()).collect()
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .slots
            .into_iter()
            .map(|s| s.task)
            .collect()
    }
}
