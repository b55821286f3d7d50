//! Player-controlled operatives.

use serde::{Deserialize, Serialize};

use dcis_core::{Entity, EntityId, EntityMeta, StoreError};

use crate::clearance::Clearance;
use crate::cosm::Cosm;

/// A storm knight tracked across missions.
///
/// The clearance rank is derived from earned XP and re-derived on every
/// XP mutation; it is never set directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operative {
    pub meta: EntityMeta,
    /// Owning player. Non-owning back-reference, used for lookup only.
    pub player_id: EntityId,
    pub first_name: String,
    pub last_name: String,
    /// Home cosm of the operative
    pub cosm: Cosm,
    pub xp: i32,
    pub clearance: Clearance,
}

impl Operative {
    pub fn new(
        player_id: EntityId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        cosm: Cosm,
    ) -> Result<Self, StoreError> {
        let first_name = first_name.into();
        let last_name = last_name.into();
        if first_name.trim().is_empty() && last_name.trim().is_empty() {
            return Err(StoreError::Validation(
                "operative needs at least one name part".into(),
            ));
        }

        Ok(Self {
            meta: EntityMeta::new(),
            player_id,
            first_name,
            last_name,
            cosm,
            xp: 0,
            clearance: Clearance::for_xp(0),
        })
    }

    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Award XP and re-derive the clearance rank.
    pub fn award_xp(&mut self, amount: i32) {
        self.xp += amount;
        self.clearance = Clearance::for_xp(self.xp);
    }
}

impl Entity for Operative {
    const KIND: &'static str = "operative";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}
