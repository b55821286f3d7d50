//! Missions and special missions.

use serde::{Deserialize, Serialize};

use dcis_core::{Entity, EntityId, EntityMeta, StoreError};

use crate::clearance::Clearance;
use crate::cosm::Cosm;
use crate::success::SuccessState;

/// A published campaign mission. Owns its mission reports; soft-deleting
/// a mission cascades a tombstone onto every report filed against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub meta: EntityMeta,
    /// Short unique mission code, e.g. "DC-042"
    pub code: String,
    pub title: String,
    pub description: String,
    pub cosm: Cosm,
    /// Minimum clearance required to view or edit the mission and the
    /// reports filed against it
    pub clearance: Clearance,
    /// Payment awarded on completion
    pub payment: i32,
    /// XP awarded on completion
    pub xp: i32,
    pub objectives_success: String,
    pub objectives_good: Option<String>,
    pub objectives_outstanding: Option<String>,
    /// Publication the mission appeared in, if any
    pub publication: Option<String>,
}

impl Mission {
    pub fn new(
        code: impl Into<String>,
        title: impl Into<String>,
        cosm: Cosm,
        clearance: Clearance,
    ) -> Result<Self, StoreError> {
        let code = code.into();
        let title = title.into();
        if code.trim().is_empty() || title.trim().is_empty() {
            return Err(StoreError::Validation(
                "mission code and title must not be blank".into(),
            ));
        }

        Ok(Self {
            meta: EntityMeta::new(),
            code,
            title,
            description: String::new(),
            cosm,
            clearance,
            payment: 0,
            xp: 0,
            objectives_success: String::new(),
            objectives_good: None,
            objectives_outstanding: None,
            publication: None,
        })
    }
}

impl Entity for Mission {
    const KIND: &'static str = "mission";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

/// A one-off mission run by a game master outside the published catalog.
///
/// A special mission acts as its own report parent: it aggregates the
/// operative special reports filed directly against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialMission {
    pub meta: EntityMeta,
    /// Game master who ran the mission
    pub game_master_id: EntityId,
    pub title: String,
    pub description: String,
    pub cosm: Cosm,
    pub clearance: Clearance,
    pub payment: i32,
    pub xp: i32,
    /// Session date (Unix millis)
    pub mission_date_ms: u64,
    /// Stored aggregate over the operative special reports
    pub objectives_met: SuccessState,
    /// Manual override; while set, automatic recomputation is suppressed
    pub success_override: Option<SuccessState>,
    /// Once finalized the author-edit window is closed
    pub finalized: bool,
}

impl SpecialMission {
    pub fn new(
        game_master_id: EntityId,
        title: impl Into<String>,
        cosm: Cosm,
        clearance: Clearance,
        mission_date_ms: u64,
    ) -> Result<Self, StoreError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(StoreError::Validation(
                "special mission title must not be blank".into(),
            ));
        }

        Ok(Self {
            meta: EntityMeta::new(),
            game_master_id,
            title,
            description: String::new(),
            cosm,
            clearance,
            payment: 0,
            xp: 0,
            mission_date_ms,
            objectives_met: SuccessState::Undetermined,
            success_override: None,
            finalized: false,
        })
    }
}

impl Entity for SpecialMission {
    const KIND: &'static str = "special_mission";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}
