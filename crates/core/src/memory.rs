//! In-memory storage backend.
//!
//! Keeps every record in a `RwLock`-guarded map; the compare-and-increment
//! step runs under the write guard, which serializes concurrent writers
//! against the same record. Used by unit tests and as the reference
//! implementation of the store contract.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::entity::{now_ms, Entity, EntityId};
use crate::error::{Result, StoreError};
use crate::store::EntityStore;

/// In-memory implementation of [`EntityStore`].
///
/// Cloning is cheap and shares the underlying map, so one store can be
/// handed to several services.
#[derive(Debug, Clone)]
pub struct MemoryStore<T: Entity> {
    records: Arc<RwLock<HashMap<EntityId, T>>>,
}

impl<T: Entity> MemoryStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of records, tombstones included.
    pub fn len(&self) -> usize {
        self.records.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Whether the store holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Entity> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Validation("store lock poisoned".to_string())
}

impl<T: Entity> EntityStore<T> for MemoryStore<T> {
    fn insert(&self, entity: &T, actor: Option<EntityId>) -> Result<T> {
        if entity.version() != 0 {
            return Err(StoreError::Validation(format!(
                "fresh {} must be at version 0, got {}",
                T::KIND,
                entity.version()
            )));
        }

        let mut records = self.records.write().map_err(|_| poisoned())?;
        if records.contains_key(&entity.id()) {
            return Err(StoreError::Validation(format!(
                "{} {} already exists",
                T::KIND,
                entity.id()
            )));
        }

        let now = now_ms();
        let mut stored = entity.clone();
        {
            let meta = stored.meta_mut();
            meta.created_at_ms = now;
            meta.created_by = actor;
            meta.modified_at_ms = now;
            meta.modified_by = actor;
            meta.deleted_at_ms = None;
            meta.deleted_by = None;
        }
        records.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    fn load(&self, id: EntityId) -> Result<T> {
        let records = self.records.read().map_err(|_| poisoned())?;
        records.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn save(&self, entity: &T, expected_version: u64, actor: Option<EntityId>) -> Result<T> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        let stored = records
            .get(&entity.id())
            .ok_or(StoreError::NotFound(entity.id()))?;

        if stored.meta().is_deleted() {
            return Err(StoreError::Validation(format!(
                "{} {} is deleted",
                T::KIND,
                entity.id()
            )));
        }
        if stored.version() != expected_version {
            return Err(StoreError::Conflict {
                id: entity.id(),
                expected: expected_version,
                current: stored.version(),
            });
        }

        let created_at = stored.meta().created_at_ms;
        let created_by = stored.meta().created_by;

        let mut next = entity.clone();
        {
            let meta = next.meta_mut();
            meta.version = expected_version + 1;
            meta.created_at_ms = created_at;
            meta.created_by = created_by;
            meta.modified_at_ms = now_ms();
            meta.modified_by = actor;
            meta.deleted_at_ms = None;
            meta.deleted_by = None;
        }
        records.insert(next.id(), next.clone());
        Ok(next)
    }

    fn soft_delete(
        &self,
        id: EntityId,
        expected_version: u64,
        actor: Option<EntityId>,
    ) -> Result<T> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        let stored = records.get(&id).ok_or(StoreError::NotFound(id))?;

        if stored.meta().is_deleted() {
            return Err(StoreError::Validation(format!(
                "{} {} is already deleted",
                T::KIND,
                id
            )));
        }
        if stored.version() != expected_version {
            return Err(StoreError::Conflict {
                id,
                expected: expected_version,
                current: stored.version(),
            });
        }

        let now = now_ms();
        let mut next = stored.clone();
        {
            let meta = next.meta_mut();
            meta.version = expected_version + 1;
            meta.modified_at_ms = now;
            meta.modified_by = actor;
            meta.deleted_at_ms = Some(now);
            meta.deleted_by = actor;
        }
        records.insert(id, next.clone());
        Ok(next)
    }

    fn children_of(&self, parent: EntityId) -> Result<Vec<T>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records
            .values()
            .filter(|e| e.parent_id() == Some(parent) && !e.meta().is_deleted())
            .cloned()
            .collect())
    }

    fn find(&self, predicate: &dyn Fn(&T) -> bool) -> Result<Vec<T>> {
        let records = self.records.read().map_err(|_| poisoned())?;
        Ok(records
            .values()
            .filter(|e| !e.meta().is_deleted() && predicate(e))
            .cloned()
            .collect())
    }
}
