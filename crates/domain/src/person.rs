//! Personnel accounts.

use serde::{Deserialize, Serialize};

use dcis_core::{Entity, EntityMeta, StoreError};

use crate::role::{Role, RoleName};

/// Security status of a personnel account.
///
/// Only `Active` accounts are ever granted anything by the authorization
/// engine; all other states are denied everything except the activation
/// flow itself. `Disabled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Freshly created, registration not started
    Unverified,
    /// Confirmation token issued, waiting for the user to confirm
    PendingConfirmation,
    /// Fully activated
    Active,
    /// Administratively locked, may be unlocked again
    Locked,
    /// Administratively disabled, terminal
    Disabled,
}

/// A personnel account: a player, game master, judge, or administrator.
///
/// Roles are attached eagerly so that clearance computation is a pure
/// function over this value, with no hidden lookups on the security path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub meta: EntityMeta,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub status: AccountStatus,
    pub roles: Vec<Role>,
    /// When the credentials were last changed (Unix millis)
    pub credentials_changed_at_ms: Option<u64>,
    pub last_login_ms: Option<u64>,
}

impl Person {
    /// Create an unverified account. Fails with a validation error on
    /// blank username or email, before any state is touched.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let username = username.into();
        let email = email.into();
        if username.trim().is_empty() {
            return Err(StoreError::Validation("username must not be blank".into()));
        }
        if email.trim().is_empty() || !email.contains('@') {
            return Err(StoreError::Validation(format!(
                "not a usable email address: '{email}'"
            )));
        }

        Ok(Self {
            meta: EntityMeta::new(),
            username,
            email,
            display_name: display_name.into(),
            status: AccountStatus::Unverified,
            roles: Vec::new(),
            credentials_changed_at_ms: None,
            last_login_ms: None,
        })
    }

    /// Whether the account holds an active role with the given name.
    pub fn has_active_role(&self, name: RoleName, now_ms: u64) -> bool {
        self.roles
            .iter()
            .any(|r| r.name == name && r.is_active(now_ms))
    }

    /// Grant a role if no active assignment with that name exists yet.
    pub fn grant_role(&mut self, role: Role, now_ms: u64) {
        if !self.has_active_role(role.name, now_ms) {
            self.roles.push(role);
        }
    }
}

impl Entity for Person {
    const KIND: &'static str = "person";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}
