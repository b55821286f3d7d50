//! Revisioned entity primitives.
//!
//! Every stored DCIS record carries an [`EntityMeta`] block: an opaque id,
//! a monotonically increasing version used for optimistic-concurrency
//! conflict detection, and audit fields maintained exclusively by the
//! storage boundary. Deletion is a tombstone; history stays queryable.

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use uuid::Uuid;

/// Opaque unique identifier for a stored record.
///
/// Random (v4) UUIDs keep ids non-enumerable; an id never changes once
/// assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id from its canonical string form.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Audit and versioning block shared by every stored record.
///
/// All timestamps are absolute Unix milliseconds so they survive process
/// restarts. The storage boundary owns every field in here; application
/// code never writes them directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    /// Unique identifier, immutable once assigned
    pub id: EntityId,
    /// Monotonically increasing version, bumped exactly once per accepted
    /// mutation
    pub version: u64,
    /// When the record was first persisted
    pub created_at_ms: u64,
    /// Principal that created the record
    pub created_by: Option<EntityId>,
    /// When the record was last mutated
    pub modified_at_ms: u64,
    /// Principal that last mutated the record
    pub modified_by: Option<EntityId>,
    /// Tombstone timestamp; `Some` marks the record soft-deleted
    pub deleted_at_ms: Option<u64>,
    /// Principal that deleted the record
    pub deleted_by: Option<EntityId>,
}

impl EntityMeta {
    /// Fresh metadata for a record that has never been persisted.
    pub fn new() -> Self {
        Self {
            id: EntityId::generate(),
            version: 0,
            created_at_ms: 0,
            created_by: None,
            modified_at_ms: 0,
            modified_by: None,
            deleted_at_ms: None,
            deleted_by: None,
        }
    }

    /// Whether the record carries a tombstone.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at_ms.is_some()
    }
}

impl Default for EntityMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// Contract implemented by every stored record type.
pub trait Entity: Clone + Serialize + DeserializeOwned {
    /// Stable kind tag, used by the storage backends to partition records.
    const KIND: &'static str;

    /// Shared audit/versioning block.
    fn meta(&self) -> &EntityMeta;

    /// Mutable access for the storage boundary.
    fn meta_mut(&mut self) -> &mut EntityMeta;

    /// Owning parent, when the record lives inside an ownership tree
    /// (e.g. an operative report inside a mission report).
    fn parent_id(&self) -> Option<EntityId> {
        None
    }

    /// Convenience accessor for the record id.
    fn id(&self) -> EntityId {
        self.meta().id
    }

    /// Convenience accessor for the stored version.
    fn version(&self) -> u64 {
        self.meta().version
    }
}

/// Current wall-clock time in Unix milliseconds.
pub fn now_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
