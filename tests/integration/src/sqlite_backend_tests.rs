//! The full flows against the SQLite backend, typed stores sharing one
//! database.

use dcis_activation::{ActivationError, ActivationService, ConfirmationToken};
use dcis_core::{EntityId, EntityStore, SqliteStore, StoreError};
use dcis_domain::{AccountStatus, Clearance, Mission, MissionReport, OperativeReport, Person, SuccessState};
use dcis_reports::{retire_mission, RollupService};

use crate::test_utils::{init_logging, sample_mission, test_registration_config};

fn shared_stores() -> (
    SqliteStore<Person>,
    SqliteStore<ConfirmationToken>,
    SqliteStore<Mission>,
    SqliteStore<MissionReport>,
    SqliteStore<OperativeReport>,
) {
    init_logging();
    let persons: SqliteStore<Person> = SqliteStore::open_in_memory().unwrap();
    let conn = persons.connection();
    (
        persons,
        SqliteStore::with_connection(conn.clone()).unwrap(),
        SqliteStore::with_connection(conn.clone()).unwrap(),
        SqliteStore::with_connection(conn.clone()).unwrap(),
        SqliteStore::with_connection(conn).unwrap(),
    )
}

#[test]
fn test_activation_flow_on_sqlite() {
    let (persons, tokens, _, _, _) = shared_stores();
    let service = ActivationService::new(persons.clone(), tokens, test_registration_config());

    let person = Person::new("fieldagent", "field@delphi.example", "Field Agent").unwrap();
    let person = persons.insert(&person, None).unwrap();

    let token = service.register(person.meta.id).unwrap();
    let activated = service.confirm(&token.token_value).unwrap();
    assert_eq!(activated.status, AccountStatus::Active);

    assert!(matches!(
        service.confirm(&token.token_value),
        Err(ActivationError::TokenAlreadyUsed)
    ));
}

#[test]
fn test_version_conflict_on_sqlite() {
    let (_, _, missions, _, _) = shared_stores();
    let mission = missions
        .insert(&sample_mission("DC-040", Clearance::Beta), None)
        .unwrap();

    let mut winner = mission.clone();
    winner.xp = 4;
    missions.save(&winner, mission.meta.version, None).unwrap();

    let mut loser = mission.clone();
    loser.xp = 5;
    assert!(matches!(
        missions.save(&loser, mission.meta.version, None),
        Err(StoreError::Conflict { .. })
    ));
    assert_eq!(missions.load(mission.meta.id).unwrap().xp, 4);
}

#[test]
fn test_rollup_and_cascade_on_sqlite() {
    let (_, _, missions, reports, children) = shared_stores();
    let service = RollupService::new(reports.clone(), children.clone());

    let mission = missions
        .insert(&sample_mission("DC-041", Clearance::Beta), None)
        .unwrap();
    let report = MissionReport::new(&mission, EntityId::generate(), 0);
    let report = reports.insert(&report, None).unwrap();

    for outcome in [SuccessState::Success, SuccessState::Failure] {
        let mut child = OperativeReport::new(report.meta.id, EntityId::generate());
        child.outcome = outcome;
        service.file(&child, None).unwrap();
    }
    assert_eq!(
        reports.load(report.meta.id).unwrap().objectives_met,
        SuccessState::Failure
    );

    retire_mission(&missions, &reports, mission.meta.id, mission.meta.version, None).unwrap();
    assert!(reports.load(report.meta.id).unwrap().meta.is_deleted());
    // The operative reports survive under their tombstoned parent.
    assert_eq!(children.children_of(report.meta.id).unwrap().len(), 2);
}

#[test]
fn test_records_survive_across_typed_views() {
    let (persons, _, missions, _, _) = shared_stores();

    let person = Person::new("archivist", "arch@delphi.example", "Archivist").unwrap();
    let person = persons.insert(&person, None).unwrap();
    let mission = missions
        .insert(&sample_mission("DC-042", Clearance::Gamma), None)
        .unwrap();

    // Kinds partition the shared table; ids do not leak across views.
    assert!(matches!(
        missions.load(person.meta.id),
        Err(StoreError::NotFound(_))
    ));

    let second_view: SqliteStore<Mission> =
        SqliteStore::with_connection(persons.connection()).unwrap();
    assert_eq!(second_view.load(mission.meta.id).unwrap().code, "DC-042");
}
