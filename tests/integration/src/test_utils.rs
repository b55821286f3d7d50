//! Shared fixtures for the end-to-end tests.

use dcis_core::{EntityStore, MemoryStore, RegistrationConfig};
use dcis_domain::{AccountStatus, Clearance, Cosm, Mission, Person, Role, RoleName};

/// Install a test subscriber once; later calls are no-ops.
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Token lifetimes short enough to reason about in tests.
pub fn test_registration_config() -> RegistrationConfig {
    RegistrationConfig {
        confirmation_ttl_minutes: 60,
        reset_ttl_minutes: 10,
    }
}

/// An already-activated account holding the given roles at their default
/// clearances.
pub fn active_person(username: &str, roles: &[RoleName]) -> Person {
    let email = format!("{username}@delphi.example");
    let mut person = Person::new(username, email, username).unwrap();
    person.status = AccountStatus::Active;
    for role in roles {
        person.grant_role(Role::new(*role, 0), 0);
    }
    person
}

/// A stored, activated account.
pub fn stored_person(
    store: &MemoryStore<Person>,
    username: &str,
    roles: &[RoleName],
) -> Person {
    store.insert(&active_person(username, roles), None).unwrap()
}

pub fn sample_mission(code: &str, clearance: Clearance) -> Mission {
    Mission::new(code, format!("Operation {code}"), Cosm::CoreEarth, clearance).unwrap()
}
