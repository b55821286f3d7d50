//! Storage boundary contract.
//!
//! The store is the single place where versions are checked and bumped.
//! Every mutating call threads an explicit `expected_version`; the check
//! and the increment are one indivisible step against the backing store,
//! so a write against a stale version fails with [`StoreError::Conflict`]
//! and mutates nothing. Conflicts are never resolved silently; retry is
//! a caller policy.

use crate::entity::{Entity, EntityId};
use crate::error::Result;

/// Storage contract for one record type.
///
/// Implementations must guarantee:
/// - `save`/`soft_delete` are atomic with respect to the version check
///   (check-and-increment as a single indivisible step);
/// - audit fields (`created_*`, `modified_*`, `deleted_*`) are written by
///   the store and only by the store;
/// - a rejected write leaves stored state untouched.
pub trait EntityStore<T: Entity> {
    /// Persist a record for the first time. The record must be at
    /// version 0; the store stamps the creation audit fields.
    fn insert(&self, entity: &T, actor: Option<EntityId>) -> Result<T>;

    /// Load a record by id. Tombstoned records still load; history
    /// remains queryable.
    fn load(&self, id: EntityId) -> Result<T>;

    /// Write an accepted mutation. Fails with `Conflict` (carrying the
    /// currently stored version) unless `expected_version` matches the
    /// stored version exactly; on success the stored version is
    /// `expected_version + 1` and the modification audit fields are
    /// stamped.
    fn save(&self, entity: &T, expected_version: u64, actor: Option<EntityId>) -> Result<T>;

    /// Place a tombstone on a record under the same check-and-increment
    /// discipline as `save`. Deleting an already-tombstoned record is a
    /// validation error, keeping the version history honest.
    fn soft_delete(&self, id: EntityId, expected_version: u64, actor: Option<EntityId>)
        -> Result<T>;

    /// All non-deleted records whose `parent_id` equals `parent`.
    fn children_of(&self, parent: EntityId) -> Result<Vec<T>>;

    /// All non-deleted records matching the predicate. Used for
    /// secondary lookups (e.g. a confirmation token by its value).
    fn find(&self, predicate: &dyn Fn(&T) -> bool) -> Result<Vec<T>>;
}
