//! Mission reports and per-operative participation reports.

use serde::{Deserialize, Serialize};

use dcis_core::{Entity, EntityId, EntityMeta};

use crate::clearance::Clearance;
use crate::mission::Mission;
use crate::success::SuccessState;

/// Record of one execution of a mission.
///
/// Owns an ordered collection of [`OperativeReport`] children (one per
/// participating operative) and stores the aggregate outcome derived
/// from them. The clearance is copied from the mission at filing time so
/// visibility checks need no extra lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionReport {
    pub meta: EntityMeta,
    /// Owning mission
    pub mission_id: EntityId,
    /// Game master who ran the session; author of this report
    pub game_master_id: EntityId,
    /// Clearance inherited from the mission
    pub clearance: Clearance,
    /// Session date (Unix millis)
    pub mission_date_ms: u64,
    /// Stored aggregate over the operative reports
    pub objectives_met: SuccessState,
    /// Manual override; while set, automatic recomputation is suppressed
    pub success_override: Option<SuccessState>,
    /// Once finalized the author-edit window on child reports is closed
    pub finalized: bool,
    pub achievements: String,
    pub notes: String,
}

impl MissionReport {
    pub fn new(mission: &Mission, game_master_id: EntityId, mission_date_ms: u64) -> Self {
        Self {
            meta: EntityMeta::new(),
            mission_id: mission.meta.id,
            game_master_id,
            clearance: mission.clearance,
            mission_date_ms,
            objectives_met: SuccessState::Undetermined,
            success_override: None,
            finalized: false,
            achievements: String::new(),
            notes: String::new(),
        }
    }
}

impl Entity for MissionReport {
    const KIND: &'static str = "mission_report";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn parent_id(&self) -> Option<EntityId> {
        Some(self.mission_id)
    }
}

/// One operative's contribution to a mission execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperativeReport {
    pub meta: EntityMeta,
    /// Owning mission report
    pub report_id: EntityId,
    /// The participating operative. Non-owning back-reference.
    pub operative_id: EntityId,
    /// This operative's individual outcome contribution
    pub outcome: SuccessState,
    /// Whether the operative was taken out of action
    pub casualty: bool,
    pub achievements: String,
    pub notes: String,
}

impl OperativeReport {
    pub fn new(report_id: EntityId, operative_id: EntityId) -> Self {
        Self {
            meta: EntityMeta::new(),
            report_id,
            operative_id,
            outcome: SuccessState::Undetermined,
            casualty: false,
            achievements: String::new(),
            notes: String::new(),
        }
    }
}

impl Entity for OperativeReport {
    const KIND: &'static str = "operative_report";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn parent_id(&self) -> Option<EntityId> {
        Some(self.report_id)
    }
}

/// One operative's contribution to a special mission. Same shape as
/// [`OperativeReport`], parented on the special mission itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperativeSpecialReport {
    pub meta: EntityMeta,
    /// Owning special mission
    pub special_mission_id: EntityId,
    pub operative_id: EntityId,
    pub outcome: SuccessState,
    pub casualty: bool,
    pub achievements: String,
    pub notes: String,
}

impl OperativeSpecialReport {
    pub fn new(special_mission_id: EntityId, operative_id: EntityId) -> Self {
        Self {
            meta: EntityMeta::new(),
            special_mission_id,
            operative_id,
            outcome: SuccessState::Undetermined,
            casualty: false,
            achievements: String::new(),
            notes: String::new(),
        }
    }
}

impl Entity for OperativeSpecialReport {
    const KIND: &'static str = "operative_special_report";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn parent_id(&self) -> Option<EntityId> {
        Some(self.special_mission_id)
    }
}
