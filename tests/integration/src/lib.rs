//! End-to-end tests across the DCIS crates.
//!
//! This suite validates:
//! - optimistic concurrency: racing writers resolve to one winner
//! - the activation lifecycle, including the double-confirm race
//! - the authorization denial ladder over stored records
//! - report roll-up, overrides, finalization, and cascade retirement
//! - the same flows against the SQLite backend

pub mod test_utils;

#[cfg(test)]
mod concurrency_tests;

#[cfg(test)]
mod activation_tests;

#[cfg(test)]
mod authorization_tests;


#[cfg(test)]
mod sqlite_backend_tests;
