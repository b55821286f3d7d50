//! The account activation lifecycle, end to end.

use std::thread;

use dcis_activation::{ActivationError, ActivationService, ConfirmationToken};
use dcis_core::{EntityStore, MemoryStore};
use dcis_domain::{AccountStatus, Person, RoleName};

use crate::test_utils::{init_logging, test_registration_config};

type Fixture = (
    ActivationService<MemoryStore<Person>, MemoryStore<ConfirmationToken>>,
    MemoryStore<Person>,
    MemoryStore<ConfirmationToken>,
);

fn fixture() -> Fixture {
    init_logging();
    let persons = MemoryStore::new();
    let tokens = MemoryStore::new();
    let service = ActivationService::new(
        persons.clone(),
        tokens.clone(),
        test_registration_config(),
    );
    (service, persons, tokens)
}

fn recruit(persons: &MemoryStore<Person>, username: &str) -> Person {
    let email = format!("{username}@delphi.example");
    let person = Person::new(username, email, username).unwrap();
    persons.insert(&person, None).unwrap()
}

#[test]
fn test_signup_to_active_grants_the_base_role() {
    let (service, persons, _) = fixture();
    let person = recruit(&persons, "newcomer");

    let token = service.register(person.meta.id).unwrap();
    assert_eq!(
        persons.load(person.meta.id).unwrap().status,
        AccountStatus::PendingConfirmation
    );

    let activated = service.confirm(&token.token_value).unwrap();
    assert_eq!(activated.status, AccountStatus::Active);
    assert!(activated.has_active_role(RoleName::Person, u64::MAX - 1));
}

#[test]
fn test_concurrent_confirms_activate_exactly_once() {
    let (service, persons, tokens) = fixture();
    let person = recruit(&persons, "racer");
    let token = service.register(person.meta.id).unwrap();

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let svc = ActivationService::new(
                persons.clone(),
                tokens.clone(),
                test_registration_config(),
            );
            let value = token.token_value.clone();
            thread::spawn(move || svc.confirm(&value))
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    for loss in results.iter().filter(|r| r.is_err()) {
        assert!(matches!(loss, Err(ActivationError::TokenAlreadyUsed)));
    }

    let stored = persons.load(person.meta.id).unwrap();
    assert_eq!(stored.status, AccountStatus::Active);
    // The base role was granted exactly once.
    let person_roles = stored
        .roles
        .iter()
        .filter(|r| r.name == RoleName::Person)
        .count();
    assert_eq!(person_roles, 1);
}

#[test]
fn test_reissued_token_invalidates_the_outstanding_one() {
    let (service, persons, _) = fixture();
    let person = recruit(&persons, "forgetful");

    let first = service.register(person.meta.id).unwrap();
    let second = service.resend_confirmation(person.meta.id).unwrap();

    assert!(matches!(
        service.confirm(&first.token_value),
        Err(ActivationError::TokenAlreadyUsed)
    ));
    assert!(service.confirm(&second.token_value).is_ok());
}

#[test]
fn test_expired_token_is_rejected_as_expired() {
    let (service, persons, tokens) = fixture();
    let person = recruit(&persons, "latecomer");
    let token = service.register(person.meta.id).unwrap();

    // Push the deadline into the past through the shared store handle.
    let mut stored = tokens.load(token.meta.id).unwrap();
    stored.expires_at_ms = 1;
    tokens.save(&stored, stored.meta.version, None).unwrap();

    assert!(matches!(
        service.confirm(&token.token_value),
        Err(ActivationError::TokenExpired)
    ));
    // The account stays pending; a fresh token can still be issued.
    assert_eq!(
        persons.load(person.meta.id).unwrap().status,
        AccountStatus::PendingConfirmation
    );
    let fresh = service.resend_confirmation(person.meta.id).unwrap();
    assert!(service.confirm(&fresh.token_value).is_ok());
}

#[test]
fn test_disable_is_terminal() {
    let (service, persons, _) = fixture();
    let person = recruit(&persons, "departed");
    let token = service.register(person.meta.id).unwrap();
    service.confirm(&token.token_value).unwrap();

    service.disable(person.meta.id, None).unwrap();
    assert!(matches!(
        service.unlock(person.meta.id, None),
        Err(ActivationError::InvalidTransition { .. })
    ));
    assert!(matches!(
        service.request_password_reset(person.meta.id),
        Err(ActivationError::InvalidTransition { .. })
    ));
}
