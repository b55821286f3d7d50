//! Account activation for DCIS personnel.
//!
//! Registration issues a time-limited confirmation token; confirming it
//! moves the account through `UNVERIFIED -> PENDING_CONFIRMATION ->
//! ACTIVE`. Password resets ride the same token machinery. Tokens are
//! single-use: consumption is guarded by the token record's own
//! optimistic version, so a replayed or raced confirm fails with
//! `TokenAlreadyUsed` instead of re-activating anything.

pub mod machine;
pub mod token;

pub use machine::{ActivationError, ActivationService, Result};
pub use token::{ConfirmationToken, TokenPurpose};
