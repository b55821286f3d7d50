//! The account activation state machine.
//!
//! Status transitions are explicit and total: every method names the
//! states it accepts and everything else is an `InvalidTransition`.
//! Token consumption rides the token record's optimistic version, so two
//! racing confirms resolve to exactly one winner without any locking in
//! this layer.

use thiserror::Error;
use tracing::{info, warn};

use dcis_core::{now_ms, EntityId, EntityStore, RegistrationConfig, StoreError};
use dcis_domain::{AccountStatus, Person, Role, RoleName};

use crate::token::{digest_value, ConfirmationToken, TokenPurpose};

#[derive(Debug, Error)]
pub enum ActivationError {
    #[error("no such confirmation token")]
    TokenNotFound,
    #[error("confirmation token expired")]
    TokenExpired,
    #[error("confirmation token already used")]
    TokenAlreadyUsed,
    #[error("account has already started or completed registration")]
    AlreadyRegistered,
    #[error("invalid account transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: AccountStatus,
        to: AccountStatus,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ActivationError>;

/// Drives person accounts through registration, confirmation, password
/// reset, and the administrative lock states.
///
/// The service holds no state of its own; everything lives in the two
/// stores, and every mutation goes through their version discipline.
pub struct ActivationService<PS, TS>
where
    PS: EntityStore<Person>,
    TS: EntityStore<ConfirmationToken>,
{
    persons: PS,
    tokens: TS,
    config: RegistrationConfig,
}

impl<PS, TS> ActivationService<PS, TS>
where
    PS: EntityStore<Person>,
    TS: EntityStore<ConfirmationToken>,
{
    pub fn new(persons: PS, tokens: TS, config: RegistrationConfig) -> Self {
        Self {
            persons,
            tokens,
            config,
        }
    }

    /// Begin registration for an `Unverified` account: move it to
    /// `PendingConfirmation` and issue a registration token. Returns the
    /// token so the caller can deliver its value out-of-band.
    pub fn register(&self, person_id: EntityId) -> Result<ConfirmationToken> {
        let person = self.persons.load(person_id)?;
        if person.status != AccountStatus::Unverified {
            return Err(ActivationError::AlreadyRegistered);
        }

        let now = now_ms();
        let mut updated = person.clone();
        updated.status = AccountStatus::PendingConfirmation;
        self.persons.save(&updated, person.meta.version, None)?;

        let token = self.issue_token(person_id, TokenPurpose::Registration, now)?;
        info!(person = %person_id, token = %token.digest(), "Registration started");
        Ok(token)
    }

    /// Consume a registration token and activate the account.
    ///
    /// The failure ladder is fixed: unknown value, then expiry, then
    /// prior consumption. Expiry outranks consumption so that a replayed
    /// expired token reports `TokenExpired` consistently. The token is
    /// consumed in place under its own version; the race loser sees
    /// `TokenAlreadyUsed`.
    pub fn confirm(&self, token_value: &str) -> Result<Person> {
        let now = now_ms();
        let token = self.lookup(token_value, TokenPurpose::Registration)?;

        if token.is_expired(now) {
            warn!(token = %token.digest(), "Rejected expired confirmation token");
            return Err(ActivationError::TokenExpired);
        }
        if token.is_consumed() {
            warn!(token = %token.digest(), "Rejected replayed confirmation token");
            return Err(ActivationError::TokenAlreadyUsed);
        }

        self.consume(token.clone(), now)?;

        let person = self.persons.load(token.person_id)?;
        if person.status != AccountStatus::PendingConfirmation {
            return Err(ActivationError::InvalidTransition {
                from: person.status,
                to: AccountStatus::Active,
            });
        }

        let mut updated = person.clone();
        updated.status = AccountStatus::Active;
        updated.grant_role(Role::new(RoleName::Person, now), now);
        let saved = self.persons.save(&updated, person.meta.version, None)?;

        info!(person = %saved.meta.id, "Account activated");
        Ok(saved)
    }

    /// Issue a fresh registration token for a `PendingConfirmation`
    /// account, invalidating any still-outstanding one.
    pub fn resend_confirmation(&self, person_id: EntityId) -> Result<ConfirmationToken> {
        let person = self.persons.load(person_id)?;
        if person.status != AccountStatus::PendingConfirmation {
            return Err(ActivationError::InvalidTransition {
                from: person.status,
                to: AccountStatus::PendingConfirmation,
            });
        }

        let token = self.issue_token(person_id, TokenPurpose::Registration, now_ms())?;
        info!(person = %person_id, token = %token.digest(), "Confirmation token re-issued");
        Ok(token)
    }

    /// Issue a password reset token for an `Active` account. Prior
    /// outstanding reset tokens are invalidated, so at most one is live.
    pub fn request_password_reset(&self, person_id: EntityId) -> Result<ConfirmationToken> {
        let person = self.persons.load(person_id)?;
        if person.status != AccountStatus::Active {
            return Err(ActivationError::InvalidTransition {
                from: person.status,
                to: person.status,
            });
        }

        let token = self.issue_token(person_id, TokenPurpose::PasswordReset, now_ms())?;
        info!(person = %person_id, token = %token.digest(), "Password reset requested");
        Ok(token)
    }

    /// Consume a password reset token and stamp the credential change.
    /// Same failure ladder as [`confirm`](Self::confirm).
    pub fn consume_password_reset(&self, token_value: &str) -> Result<Person> {
        let now = now_ms();
        let token = self.lookup(token_value, TokenPurpose::PasswordReset)?;

        if token.is_expired(now) {
            return Err(ActivationError::TokenExpired);
        }
        if token.is_consumed() {
            return Err(ActivationError::TokenAlreadyUsed);
        }

        self.consume(token.clone(), now)?;

        let person = self.persons.load(token.person_id)?;
        let mut updated = person.clone();
        updated.credentials_changed_at_ms = Some(now);
        let saved = self.persons.save(&updated, person.meta.version, None)?;

        info!(person = %saved.meta.id, "Credentials changed via reset token");
        Ok(saved)
    }

    /// Administratively lock an `Active` account.
    pub fn lock(&self, person_id: EntityId, actor: Option<EntityId>) -> Result<Person> {
        self.transition(person_id, AccountStatus::Active, AccountStatus::Locked, actor)
    }

    /// Unlock a `Locked` account back to `Active`.
    pub fn unlock(&self, person_id: EntityId, actor: Option<EntityId>) -> Result<Person> {
        self.transition(person_id, AccountStatus::Locked, AccountStatus::Active, actor)
    }

    /// Disable an account. Allowed from every state except `Disabled`
    /// itself; there is no way back.
    pub fn disable(&self, person_id: EntityId, actor: Option<EntityId>) -> Result<Person> {
        let person = self.persons.load(person_id)?;
        if person.status == AccountStatus::Disabled {
            return Err(ActivationError::InvalidTransition {
                from: AccountStatus::Disabled,
                to: AccountStatus::Disabled,
            });
        }

        let mut updated = person.clone();
        updated.status = AccountStatus::Disabled;
        let saved = self.persons.save(&updated, person.meta.version, actor)?;
        warn!(person = %person_id, "Account disabled");
        Ok(saved)
    }

    fn transition(
        &self,
        person_id: EntityId,
        from: AccountStatus,
        to: AccountStatus,
        actor: Option<EntityId>,
    ) -> Result<Person> {
        let person = self.persons.load(person_id)?;
        if person.status != from {
            return Err(ActivationError::InvalidTransition {
                from: person.status,
                to,
            });
        }

        let mut updated = person.clone();
        updated.status = to;
        let saved = self.persons.save(&updated, person.meta.version, actor)?;
        info!(person = %person_id, ?from, ?to, "Account status changed");
        Ok(saved)
    }

    /// Issue a token after consuming any still-live one of the same
    /// purpose, so that only the newest value works.
    fn issue_token(
        &self,
        person_id: EntityId,
        purpose: TokenPurpose,
        now: u64,
    ) -> Result<ConfirmationToken> {
        for stale in self.tokens.find(&|t: &ConfirmationToken| {
            t.person_id == person_id && t.purpose == purpose && !t.is_consumed()
        })? {
            self.consume(stale, now)?;
        }

        let ttl = match purpose {
            TokenPurpose::Registration => self.config.confirmation_ttl_ms(),
            TokenPurpose::PasswordReset => self.config.reset_ttl_ms(),
        };
        let token = ConfirmationToken::issue(person_id, purpose, now, ttl);
        self.tokens.insert(&token, None)?;
        Ok(token)
    }

    fn lookup(&self, token_value: &str, purpose: TokenPurpose) -> Result<ConfirmationToken> {
        let mut matches = self
            .tokens
            .find(&|t: &ConfirmationToken| t.token_value == token_value && t.purpose == purpose)?;

        match matches.pop() {
            Some(token) => Ok(token),
            None => {
                warn!(token = %digest_value(token_value), "Unknown confirmation token");
                Err(ActivationError::TokenNotFound)
            }
        }
    }

    /// Stamp a token consumed under its own version. A version conflict
    /// means someone else consumed it first.
    fn consume(&self, token: ConfirmationToken, now: u64) -> Result<()> {
        let mut consumed = token.clone();
        consumed.consumed_at_ms = Some(now);
        match self.tokens.save(&consumed, token.meta.version, None) {
            Ok(_) => Ok(()),
            Err(StoreError::Conflict { .. }) => Err(ActivationError::TokenAlreadyUsed),
            Err(other) => Err(other.into()),
        }
    }
}
