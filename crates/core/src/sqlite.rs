//! SQLite storage backend.
//!
//! One `entities` table holds every record kind, partitioned by a kind
//! tag, with the audit columns broken out for querying and the full
//! record as a JSON payload. WAL mode keeps writers from blocking
//! readers; the optimistic version check runs as a single guarded
//! `UPDATE ... WHERE id AND version` inside a transaction, so a stale
//! write fails without mutating anything.

use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info};

use crate::entity::{now_ms, Entity, EntityId};
use crate::error::{Result, StoreError};
use crate::store::EntityStore;

/// How long a writer waits on a locked database before giving up with a
/// retriable timeout.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite implementation of [`EntityStore`].
///
/// Cloning shares the underlying connection, so several typed stores can
/// run against one database file.
pub struct SqliteStore<T: Entity> {
    conn: Arc<Mutex<Connection>>,
    _kind: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for SqliteStore<T> {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            _kind: PhantomData,
        }
    }
}

impl<T: Entity> SqliteStore<T> {
    /// Create or open a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        info!(path = %path.display(), kind = T::KIND, "Opening entity store");

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            _kind: PhantomData,
        })
    }

    /// Open an in-memory store (test use).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            _kind: PhantomData,
        })
    }

    /// Build a typed view over an already opened connection. All typed
    /// stores sharing one database should be derived from the same
    /// connection so their transactions serialize properly.
    pub fn with_connection(conn: Arc<Mutex<Connection>>) -> Result<Self> {
        {
            let guard = conn.lock().map_err(|_| poisoned())?;
            Self::init_schema(&guard)?;
        }
        Ok(Self {
            conn,
            _kind: PhantomData,
        })
    }

    /// Hand out the shared connection for sibling stores.
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS entities (
                id TEXT NOT NULL,
                kind TEXT NOT NULL,
                version INTEGER NOT NULL,
                parent_id TEXT,
                created_at INTEGER NOT NULL,
                created_by TEXT,
                modified_at INTEGER NOT NULL,
                modified_by TEXT,
                deleted_at INTEGER,
                deleted_by TEXT,
                payload TEXT NOT NULL,
                PRIMARY KEY (kind, id)
            );

            CREATE INDEX IF NOT EXISTS idx_entities_parent ON entities(kind, parent_id);
            "#,
        )?;
        Ok(())
    }

    fn read_row(payload: String) -> Result<T> {
        Ok(serde_json::from_str(&payload)?)
    }
}

fn poisoned() -> StoreError {
    StoreError::Validation("store lock poisoned".to_string())
}

/// A busy database is a timeout, not a failure: the write never happened
/// and the caller may retry.
fn map_db_err(err: rusqlite::Error) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::DatabaseBusy
                || e.code == rusqlite::ErrorCode::DatabaseLocked =>
        {
            StoreError::Timeout(err.to_string())
        }
        _ => StoreError::Database(err),
    }
}

impl<T: Entity> EntityStore<T> for SqliteStore<T> {
    fn insert(&self, entity: &T, actor: Option<EntityId>) -> Result<T> {
        if entity.version() != 0 {
            return Err(StoreError::Validation(format!(
                "fresh {} must be at version 0, got {}",
                T::KIND,
                entity.version()
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
        let payload = serde_json::to_string(&stored)?;

        let conn = self.conn.lock().map_err(|_| poisoned())?;
        let inserted = conn
            .execute(
                r#"
                INSERT OR IGNORE INTO entities (
                    id, kind, version, parent_id,
                    created_at, created_by, modified_at, modified_by, payload
                ) VALUES (?1, ?2, 0, ?3, ?4, ?5, ?4, ?5, ?6)
                "#,
                params![
                    stored.id().to_string(),
                    T::KIND,
                    stored.parent_id().map(|p| p.to_string()),
                    now as i64,
                    actor.map(|a| a.to_string()),
                    payload,
                ],
            )
            .map_err(map_db_err)?;

        if inserted != 1 {
            return Err(StoreError::Validation(format!(
                "{} {} already exists",
                T::KIND,
                stored.id()
            )));
        }

        debug!(kind = T::KIND, id = %stored.id(), "Entity inserted");
        Ok(stored)
    }

    fn load(&self, id: EntityId) -> Result<T> {
        let conn = self.conn.lock().map_err(|_| poisoned())?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM entities WHERE kind = ?1 AND id = ?2",
                params![T::KIND, id.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(map_db_err)?;

        match payload {
            Some(p) => Self::read_row(p),
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn save(&self, entity: &T, expected_version: u64, actor: Option<EntityId>) -> Result<T> {
        let mut conn = self.conn.lock().map_err(|_| poisoned())?;
        let tx = conn.transaction().map_err(map_db_err)?;

        let row: Option<(i64, Option<i64>, i64, Option<String>)> = tx
            .query_row(
                "SELECT version, deleted_at, created_at, created_by
                 FROM entities WHERE kind = ?1 AND id = ?2",
                params![T::KIND, entity.id().to_string()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()
            .map_err(map_db_err)?;

        let (current, deleted_at, created_at, created_by) =
            row.ok_or(StoreError::NotFound(entity.id()))?;
        let current = current as u64;
        let created_at = created_at as u64;

        if deleted_at.is_some() {
            return Err(StoreError::Validation(format!(
                "{} {} is deleted",
                T::KIND,
                entity.id()
            )));
        }
        if current != expected_version {
            return Err(StoreError::Conflict {
                id: entity.id(),
                expected: expected_version,
                current,
            });
        }

        let mut next = entity.clone();
        {
            let meta = next.meta_mut();
            meta.version = expected_version + 1;
            meta.created_at_ms = created_at;
            meta.created_by = created_by.as_deref().and_then(EntityId::parse);
            meta.modified_at_ms = now_ms();
            meta.modified_by = actor;
            meta.deleted_at_ms = None;
            meta.deleted_by = None;
        }
        let payload = serde_json::to_string(&next)?;

        let changed = tx
            .execute(
                r#"
                UPDATE entities
                SET version = ?1, parent_id = ?2, modified_at = ?3,
                    modified_by = ?4, payload = ?5
                WHERE kind = ?6 AND id = ?7 AND version = ?8 AND deleted_at IS NULL
                "#,
                params![
                    next.version() as i64,
                    next.parent_id().map(|p| p.to_string()),
                    next.meta().modified_at_ms as i64,
                    actor.map(|a| a.to_string()),
                    payload,
                    T::KIND,
                    next.id().to_string(),
                    expected_version as i64,
                ],
            )
            .map_err(map_db_err)?;

        if changed != 1 {
            // Lost the race between the read and the guarded update.
            return Err(StoreError::Conflict {
                id: next.id(),
                expected: expected_version,
                current,
            });
        }

        tx.commit().map_err(map_db_err)?;
        debug!(kind = T::KIND, id = %next.id(), version = next.version(), "Entity saved");
        Ok(next)
    }

    fn soft_delete(
        &self,
        id: EntityId,
        expected_version: u64,
        actor: Option<EntityId>,
    ) -> Result<T> {
        let mut conn = self.conn.lock().map_err(|_| poisoned())?;
        let tx = conn.transaction().map_err(map_db_err)?;

        let row: Option<(i64, Option<i64>, String)> = tx
            .query_row(
                "SELECT version, deleted_at, payload
                 FROM entities WHERE kind = ?1 AND id = ?2",
                params![T::KIND, id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(map_db_err)?;

        let (current, deleted_at, payload) = row.ok_or(StoreError::NotFound(id))?;
        let current = current as u64;

        if deleted_at.is_some() {
            return Err(StoreError::Validation(format!(
                "{} {} is already deleted",
                T::KIND,
                id
            )));
        }
        if current != expected_version {
            return Err(StoreError::Conflict {
                id,
                expected: expected_version,
                current,
            });
        }

        let now = now_ms();
        let mut next: T = Self::read_row(payload)?;
        {
            let meta = next.meta_mut();
            meta.version = expected_version + 1;
            meta.modified_at_ms = now;
            meta.modified_by = actor;
            meta.deleted_at_ms = Some(now);
            meta.deleted_by = actor;
        }
        let payload = serde_json::to_string(&next)?;

        let changed = tx
            .execute(
                r#"
                UPDATE entities
                SET version = ?1, modified_at = ?2, modified_by = ?3,
                    deleted_at = ?2, deleted_by = ?3, payload = ?4
                WHERE kind = ?5 AND id = ?6 AND version = ?7 AND deleted_at IS NULL
                "#,
                params![
                    next.version() as i64,
                    now as i64,
                    actor.map(|a| a.to_string()),
                    payload,
                    T::KIND,
                    id.to_string(),
                    expected_version as i64,
                ],
            )
            .map_err(map_db_err)?;

        if changed != 1 {
            return Err(StoreError::Conflict {
                id,
                expected: expected_version,
                current,
            });
        }

        tx.commit().map_err(map_db_err)?;
        debug!(kind = T::KIND, id = %id, "Entity tombstoned");
        Ok(next)
    }

    fn children_of(&self, parent: EntityId) -> Result<Vec<T>> {
        let conn = self.conn.lock().map_err(|_| poisoned())?;
        let mut stmt = conn
            .prepare(
                "SELECT payload FROM entities
                 WHERE kind = ?1 AND parent_id = ?2 AND deleted_at IS NULL",
            )
            .map_err(map_db_err)?;

        let rows = stmt
            .query_map(params![T::KIND, parent.to_string()], |row| {
                row.get::<_, String>(0)
            })
            .map_err(map_db_err)?;

        let mut children = Vec::new();
        for payload in rows {
            children.push(Self::read_row(payload.map_err(map_db_err)?)?);
        }
        Ok(children)
    }

    fn find(&self, predicate: &dyn Fn(&T) -> bool) -> Result<Vec<T>> {
        let conn = self.conn.lock().map_err(|_| poisoned())?;
        let mut stmt = conn
            .prepare("SELECT payload FROM entities WHERE kind = ?1 AND deleted_at IS NULL")
            .map_err(map_db_err)?;

        let rows = stmt
            .query_map(params![T::KIND], |row| row.get::<_, String>(0))
            .map_err(map_db_err)?;

        let mut matches = Vec::new();
        for payload in rows {
            let entity = Self::read_row(payload.map_err(map_db_err)?)?;
            if predicate(&entity) {
                matches.push(entity);
            }
        }
        Ok(matches)
    }
}
