//! Clearance-based authorization for DCIS records.
//!
//! Two layers: the clearance model (pure, deterministic functions over
//! an account's eagerly loaded role set, with no I/O)
//! and the authorization engine, which evaluates a fixed, ordered rule
//! chain and yields exactly one [`Decision`] per (person, operation,
//! record) triple.

pub mod clearance;
pub mod engine;

pub use clearance::{at_least, can_edit, can_view, effective_clearance};
pub use engine::{authorize, AuthzError, Decision, DenyReason, Operation};
