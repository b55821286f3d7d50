//! The cosms of the possibility wars, with their axiom ratings.

use serde::{Deserialize, Serialize};

/// Setting/dimension tag carried by missions and operatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cosm {
    Aysle,
    CoreEarth,
    Cyberpapacy,
    LivingLand,
    NileEmpire,
    Orrorsh,
    PanPacifica,
    Tharkold,
}

impl Cosm {
    /// Axiom ratings as (magic, social, spirit, tech).
    pub fn axioms(self) -> (u8, u8, u8, u8) {
        match self {
            Cosm::Aysle => (24, 16, 18, 14),
            Cosm::CoreEarth => (9, 23, 10, 23),
            Cosm::Cyberpapacy => (14, 18, 16, 26),
            Cosm::LivingLand => (1, 7, 24, 6),
            Cosm::NileEmpire => (14, 20, 18, 20),
            Cosm::Orrorsh => (16, 18, 16, 18),
            Cosm::PanPacifica => (4, 24, 8, 24),
            Cosm::Tharkold => (12, 25, 4, 25),
        }
    }

    pub fn magic(self) -> u8 {
        self.axioms().0
    }

    pub fn social(self) -> u8 {
        self.axioms().1
    }

    pub fn spirit(self) -> u8 {
        self.axioms().2
    }

    pub fn tech(self) -> u8 {
        self.axioms().3
    }
}
