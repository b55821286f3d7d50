//! Confirmation tokens.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use dcis_core::{Entity, EntityId, EntityMeta};

/// What a confirmation token proves control over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenPurpose {
    Registration,
    PasswordReset,
}

/// A single-use, time-limited credential owned by exactly one person.
///
/// At most one unconsumed, unexpired token per (person, purpose) pair
/// exists at a time; issuing a new one invalidates prior outstanding
/// tokens for that purpose. Expiry is absolute wall-clock time so the
/// deadline survives process restarts, and it is checked lazily at the
/// moment of use; expired tokens are not swept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationToken {
    pub meta: EntityMeta,
    /// Opaque, unguessable value delivered to the person out-of-band
    pub token_value: String,
    pub person_id: EntityId,
    pub purpose: TokenPurpose,
    pub issued_at_ms: u64,
    pub expires_at_ms: u64,
    /// Set once the token has been used; never cleared
    pub consumed_at_ms: Option<u64>,
}

impl ConfirmationToken {
    /// Issue a fresh token for the given person and purpose.
    pub fn issue(person_id: EntityId, purpose: TokenPurpose, now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            meta: EntityMeta::new(),
            token_value: generate_value(),
            person_id,
            purpose,
            issued_at_ms: now_ms,
            expires_at_ms: now_ms.saturating_add(ttl_ms),
            consumed_at_ms: None,
        }
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms > self.expires_at_ms
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed_at_ms.is_some()
    }

    /// Log-safe digest of the token value. The raw value never appears
    /// in logs.
    pub fn digest(&self) -> String {
        digest_value(&self.token_value)
    }
}

impl Entity for ConfirmationToken {
    const KIND: &'static str = "confirmation_token";

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }

    fn parent_id(&self) -> Option<EntityId> {
        Some(self.person_id)
    }
}

/// 32 bytes from the OS entropy source, hex-encoded.
fn generate_value() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Truncated blake3 digest of a token value, for audit logging.
pub fn digest_value(value: &str) -> String {
    hex::encode(&blake3::hash(value.as_bytes()).as_bytes()[..8])
}
