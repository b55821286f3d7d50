//! Core functionality for the Delphi Council Information System (DCIS).
//!
//! This crate provides the revisioned-entity primitives, the storage
//! boundary with its optimistic-concurrency contract, and the shared
//! configuration and logging infrastructure used across the DCIS crates.

pub mod config;
pub mod entity;
pub mod error;
pub mod logging;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod store;

pub use config::{Config, DatabaseConfig, RegistrationConfig};
pub use entity::{now_ms, Entity, EntityId, EntityMeta};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
pub use store::EntityStore;
