//! Roles and their clearance bindings.

use serde::{Deserialize, Serialize};

use crate::clearance::Clearance;

/// The roles a personnel account can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleName {
    /// Player account, the default role granted on activation.
    Person,
    /// Game master running mission sessions.
    GameMaster,
    /// Campaign judge.
    Judge,
    /// Campaign organization team.
    Orga,
    /// Campaign administration team.
    Admin,
}

impl RoleName {
    /// Clearance granted with this role unless overridden.
    pub fn default_clearance(self) -> Clearance {
        match self {
            RoleName::Person => Clearance::Alpha,
            RoleName::GameMaster => Clearance::Beta,
            RoleName::Judge => Clearance::Gamma,
            RoleName::Orga => Clearance::Delta,
            RoleName::Admin => Clearance::Omega,
        }
    }
}

/// A role assignment: a role name bound to a clearance level, with an
/// activity window. Effective clearance of an account is the maximum
/// over its currently active roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: RoleName,
    pub clearance: Clearance,
    /// When the role was granted (Unix millis)
    pub granted_at_ms: u64,
    /// Optional expiry (Unix millis); `None` means open-ended
    pub expires_at_ms: Option<u64>,
    /// Set when the role has been revoked
    pub revoked_at_ms: Option<u64>,
}

impl Role {
    /// Grant a role at its default clearance.
    pub fn new(name: RoleName, granted_at_ms: u64) -> Self {
        Self {
            name,
            clearance: name.default_clearance(),
            granted_at_ms,
            expires_at_ms: None,
            revoked_at_ms: None,
        }
    }

    /// Grant a role with an explicit clearance binding.
    pub fn with_clearance(name: RoleName, clearance: Clearance, granted_at_ms: u64) -> Self {
        Self {
            name,
            clearance,
            granted_at_ms,
            expires_at_ms: None,
            revoked_at_ms: None,
        }
    }

    /// Whether the role counts at the given instant: granted, not
    /// revoked, not expired.
    pub fn is_active(&self, now_ms: u64) -> bool {
        if self.revoked_at_ms.is_some() {
            return false;
        }
        if let Some(expiry) = self.expires_at_ms {
            if now_ms > expiry {
                return false;
            }
        }
        now_ms >= self.granted_at_ms
    }

    /// Revoke the role at the given instant.
    pub fn revoke(&mut self, now_ms: u64) {
        self.revoked_at_ms = Some(now_ms);
    }
}
