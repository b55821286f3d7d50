//! Security clearance levels.

use serde::{Deserialize, Serialize};

/// Delphi Council security clearance.
///
/// Totally ordered by variant position; comparisons never look at the
/// name. Each level also carries the minimum operative XP at which it is
/// attained.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Clearance {
    /// No clearance required / entry level
    Any,
    Alpha,
    Beta,
    Gamma,
    Delta,
    Omega,
}

impl Clearance {
    /// Minimum XP an operative needs for this clearance.
    pub fn min_xp(self) -> i32 {
        match self {
            Clearance::Any => -1,
            Clearance::Alpha => 0,
            Clearance::Beta => 50,
            Clearance::Gamma => 200,
            Clearance::Delta => 500,
            Clearance::Omega => 1000,
        }
    }

    /// The clearance an operative holds at the given amount of XP.
    pub fn for_xp(xp: i32) -> Self {
        if xp >= Clearance::Omega.min_xp() {
            Clearance::Omega
        } else if xp >= Clearance::Delta.min_xp() {
            Clearance::Delta
        } else if xp >= Clearance::Gamma.min_xp() {
            Clearance::Gamma
        } else if xp >= Clearance::Beta.min_xp() {
            Clearance::Beta
        } else if xp >= Clearance::Alpha.min_xp() {
            Clearance::Alpha
        } else {
            Clearance::Any
        }
    }

    /// Lowest defined level, the effective clearance of a roleless
    /// account.
    pub fn lowest() -> Self {
        Clearance::Any
    }
}
