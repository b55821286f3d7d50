//! Access guard views over the record types.
//!
//! Every record kind exposes a [`Guard`]: the clearance needed to view
//! it, the (possibly higher) clearance and role set needed to edit it,
//! and an optional ownership rule. The authorization engine evaluates
//! guards only, never the record itself, which keeps the decision rules
//! total and the record types free of security logic.
//!
//! View eligibility does not imply edit eligibility: an operative is
//! visible at the lowest clearance but editing one of Omega rank takes
//! Omega clearance.

use dcis_core::EntityId;

use crate::clearance::Clearance;
use crate::mission::{Mission, SpecialMission};
use crate::operative::Operative;
use crate::person::Person;
use crate::report::{MissionReport, OperativeReport, OperativeSpecialReport};
use crate::role::RoleName;

/// Ownership constraint on write access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipRule {
    /// No ownership constraint; role and clearance gates decide alone.
    None,
    /// The author may edit while the record is not locked. Binds
    /// principals acting under the base `Person` role; holders of one of
    /// the guard's steward roles act in an administrative capacity and
    /// are not subject to it.
    Author {
        author: Option<EntityId>,
        locked: bool,
    },
}

/// Access requirements for one record.
#[derive(Debug, Clone, Copy)]
pub struct Guard {
    /// Record kind, for decision logging
    pub kind: &'static str,
    /// Minimum clearance to view
    pub view: Clearance,
    /// Minimum clearance to edit
    pub edit: Clearance,
    /// Roles eligible to edit at all
    pub edit_roles: &'static [RoleName],
    /// Subset of `edit_roles` exempt from the ownership rule
    pub steward_roles: &'static [RoleName],
    pub ownership: OwnershipRule,
}

/// Records that can be evaluated by the authorization engine on their
/// own. Child reports derive their guard from the parent instead; see
/// [`OperativeReport::guard_in`].
pub trait Protected {
    fn guard(&self) -> Guard;
}

const MISSION_EDITORS: &[RoleName] = &[RoleName::Judge, RoleName::Orga, RoleName::Admin];
const REPORT_EDITORS: &[RoleName] = &[
    RoleName::GameMaster,
    RoleName::Judge,
    RoleName::Orga,
    RoleName::Admin,
];
const REPORT_STEWARDS: &[RoleName] = &[RoleName::Judge, RoleName::Orga, RoleName::Admin];
const CHILD_REPORT_EDITORS: &[RoleName] = &[
    RoleName::Person,
    RoleName::GameMaster,
    RoleName::Judge,
    RoleName::Orga,
    RoleName::Admin,
];
const CHILD_REPORT_STEWARDS: &[RoleName] = &[
    RoleName::GameMaster,
    RoleName::Judge,
    RoleName::Orga,
    RoleName::Admin,
];
const PERSON_EDITORS: &[RoleName] = &[RoleName::Person, RoleName::Orga, RoleName::Admin];
const PERSON_STEWARDS: &[RoleName] = &[RoleName::Orga, RoleName::Admin];
const OPERATIVE_EDITORS: &[RoleName] = &[
    RoleName::Person,
    RoleName::Judge,
    RoleName::Orga,
    RoleName::Admin,
];
const OPERATIVE_STEWARDS: &[RoleName] = &[RoleName::Judge, RoleName::Orga, RoleName::Admin];

impl Protected for Mission {
    fn guard(&self) -> Guard {
        Guard {
            kind: "mission",
            view: self.clearance,
            edit: self.clearance,
            edit_roles: MISSION_EDITORS,
            steward_roles: MISSION_EDITORS,
            ownership: OwnershipRule::None,
        }
    }
}

impl Protected for SpecialMission {
    fn guard(&self) -> Guard {
        Guard {
            kind: "special_mission",
            view: self.clearance,
            edit: self.clearance,
            edit_roles: REPORT_EDITORS,
            steward_roles: REPORT_STEWARDS,
            ownership: OwnershipRule::Author {
                author: Some(self.game_master_id),
                locked: self.finalized,
            },
        }
    }
}

impl Protected for MissionReport {
    fn guard(&self) -> Guard {
        Guard {
            kind: "mission_report",
            view: self.clearance,
            edit: self.clearance,
            edit_roles: REPORT_EDITORS,
            steward_roles: REPORT_STEWARDS,
            ownership: OwnershipRule::Author {
                author: Some(self.game_master_id),
                locked: self.finalized,
            },
        }
    }
}

impl Protected for Person {
    fn guard(&self) -> Guard {
        Guard {
            kind: "person",
            view: Clearance::lowest(),
            edit: Clearance::lowest(),
            edit_roles: PERSON_EDITORS,
            steward_roles: PERSON_STEWARDS,
            ownership: OwnershipRule::Author {
                author: Some(self.meta.id),
                locked: false,
            },
        }
    }
}

impl Protected for Operative {
    fn guard(&self) -> Guard {
        // The roster is visible to everyone; editing takes the
        // operative's own rank.
        Guard {
            kind: "operative",
            view: Clearance::lowest(),
            edit: self.clearance,
            edit_roles: OPERATIVE_EDITORS,
            steward_roles: OPERATIVE_STEWARDS,
            ownership: OwnershipRule::Author {
                author: Some(self.player_id),
                locked: false,
            },
        }
    }
}

impl OperativeReport {
    /// Guard for this child in the context of its owning report. The
    /// author (the filing player, recorded at creation) may edit until
    /// the parent report is finalized.
    pub fn guard_in(&self, parent: &MissionReport) -> Guard {
        Guard {
            kind: "operative_report",
            view: parent.clearance,
            edit: parent.clearance,
            edit_roles: CHILD_REPORT_EDITORS,
            steward_roles: CHILD_REPORT_STEWARDS,
            ownership: OwnershipRule::Author {
                author: self.meta.created_by,
                locked: parent.finalized,
            },
        }
    }
}

impl OperativeSpecialReport {
    /// Guard for this child in the context of its owning special
    /// mission.
    pub fn guard_in(&self, parent: &SpecialMission) -> Guard {
        Guard {
            kind: "operative_special_report",
            view: parent.clearance,
            edit: parent.clearance,
            edit_roles: CHILD_REPORT_EDITORS,
            steward_roles: CHILD_REPORT_STEWARDS,
            ownership: OwnershipRule::Author {
                author: self.meta.created_by,
                locked: parent.finalized,
            },
        }
    }
}
