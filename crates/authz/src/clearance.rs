//! The clearance model: pure functions over an account's role set.
//!
//! Everything in here is side-effect-free and works only on the values
//! passed in. Role sets are attached to the [`Person`] eagerly; there is
//! no hidden lookup on this path.

use dcis_domain::{Clearance, Guard, Person};

/// Effective clearance of an account: the maximum clearance across its
/// currently active roles, or the lowest defined level for a roleless
/// account. Adding a role can only raise the result, never lower it.
pub fn effective_clearance(person: &Person, now_ms: u64) -> Clearance {
    person
        .roles
        .iter()
        .filter(|r| r.is_active(now_ms))
        .map(|r| r.clearance)
        .max()
        .unwrap_or_else(Clearance::lowest)
}

/// Total-order comparison: does clearance `a` satisfy a requirement of
/// `b`?
pub fn at_least(a: Clearance, b: Clearance) -> bool {
    a >= b
}

/// Whether the account clears the record's view requirement.
pub fn can_view(person: &Person, guard: &Guard, now_ms: u64) -> bool {
    at_least(effective_clearance(person, now_ms), guard.view)
}

/// Whether the account clears the record's edit requirement: sufficient
/// clearance AND an active role from the record's edit-allow set. View
/// eligibility is not assumed to imply edit eligibility.
pub fn can_edit(person: &Person, guard: &Guard, now_ms: u64) -> bool {
    at_least(effective_clearance(person, now_ms), guard.edit)
        && guard
            .edit_roles
            .iter()
            .any(|role| person.has_active_role(*role, now_ms))
}
