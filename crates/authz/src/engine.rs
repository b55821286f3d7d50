//! The authorization engine.
//!
//! `authorize` evaluates a fixed rule chain, first denial wins, and no
//! later rule can grant what an earlier rule denied. The chain is total:
//! every (person, operation, guard) triple yields exactly one decision.
//! Version staleness is deliberately NOT a denial: an authorized write
//! against a stale version surfaces as a storage `Conflict`, a distinct
//! error class, because the request was legitimate but its precondition
//! had expired.

use thiserror::Error;
use tracing::debug;

use dcis_domain::{AccountStatus, Guard, OwnershipRule, Person};

use crate::clearance::{can_edit, can_view};

/// The operation a principal wants to perform on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    View,
    Edit,
    /// Soft delete. Gated exactly like `Edit`.
    Delete,
}

impl Operation {
    fn is_write(self) -> bool {
        matches!(self, Operation::Edit | Operation::Delete)
    }
}

/// Why an operation was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DenyReason {
    #[error("account is not active")]
    AccountNotActive,
    #[error("insufficient clearance")]
    InsufficientClearance,
    #[error("not the owner of the record")]
    NotOwner,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Adapter for `?`-style service code.
    pub fn require(self) -> Result<(), AuthzError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(AuthzError::Denied(reason)),
        }
    }
}

/// Error form of a denial, for services that propagate with `?`.
#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("operation denied: {0}")]
    Denied(#[from] DenyReason),
}

/// Decide whether `person` may perform `operation` on the record behind
/// `guard`.
///
/// Rules, in order (first denial wins, non-overridable):
/// 1. the account must be `Active`;
/// 2. reads require view clearance;
/// 3. writes require edit clearance and an edit-allow role;
/// 4. where the record declares an author-ownership rule, a principal
///    without a steward role must be the author, and the record must not
///    be locked.
pub fn authorize(person: &Person, operation: Operation, guard: &Guard, now_ms: u64) -> Decision {
    let decision = evaluate(person, operation, guard, now_ms);

    if let Decision::Deny(reason) = decision {
        debug!(
            person = %person.meta.id,
            record_kind = guard.kind,
            ?operation,
            %reason,
            "Authorization denied"
        );
    }

    decision
}

fn evaluate(person: &Person, operation: Operation, guard: &Guard, now_ms: u64) -> Decision {
    // Rule 1: only active accounts get anything at all.
    if person.status != AccountStatus::Active {
        return Decision::Deny(DenyReason::AccountNotActive);
    }

    // Rule 2: view clearance, for reads and writes alike.
    if !can_view(person, guard, now_ms) {
        return Decision::Deny(DenyReason::InsufficientClearance);
    }

    if !operation.is_write() {
        return Decision::Allow;
    }

    // Rule 3: edit clearance plus an edit-allow role.
    if !can_edit(person, guard, now_ms) {
        return Decision::Deny(DenyReason::InsufficientClearance);
    }

    // Rule 4: the ownership rule, for principals not acting in a
    // steward capacity.
    if let OwnershipRule::Author { author, locked } = guard.ownership {
        let is_steward = guard
            .steward_roles
            .iter()
            .any(|role| person.has_active_role(*role, now_ms));

        if !is_steward {
            if locked || author != Some(person.meta.id) {
                return Decision::Deny(DenyReason::NotOwner);
            }
        }
    }

    Decision::Allow
}
