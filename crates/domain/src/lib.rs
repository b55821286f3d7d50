//! Record types for the Delphi Council Information System.
//!
//! The records of a tabletop-campaign organization: personnel accounts,
//! player-controlled operatives, and the mission/report tree describing
//! what happened at the table. Every record embeds the revisioned-entity
//! metadata from `dcis-core`; access rules are expressed through the
//! [`Protected`] guard views consumed by the authorization engine.

pub mod clearance;
pub mod cosm;
pub mod mission;
pub mod operative;
pub mod person;
pub mod protected;
pub mod report;
pub mod role;
pub mod success;

pub use clearance::Clearance;
pub use cosm::Cosm;
pub use mission::{Mission, SpecialMission};
pub use operative::Operative;
pub use person::{AccountStatus, Person};
pub use protected::{Guard, OwnershipRule, Protected};
pub use report::{MissionReport, OperativeReport, OperativeSpecialReport};
pub use role::{Role, RoleName};
pub use success::SuccessState;
