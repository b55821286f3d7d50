//! The authorization denial ladder over stored records.

use dcis_authz::{authorize, effective_clearance, Decision, DenyReason, Operation};
use dcis_core::{EntityId, EntityStore, MemoryStore};
use dcis_domain::{
    AccountStatus, Clearance, Cosm, Mission, MissionReport, Operative, OperativeReport, Person,
    Protected, Role, RoleName,
};

use crate::test_utils::{active_person, init_logging, sample_mission, stored_person};

#[test]
fn test_denial_ladder_is_ordered() {
    init_logging();
    let mission = sample_mission("DC-020", Clearance::Delta);
    let guard = mission.guard();

    // Not active: denied before clearance is even looked at.
    let mut locked = active_person("locked-judge", &[RoleName::Judge]);
    locked.status = AccountStatus::Locked;
    assert_eq!(
        authorize(&locked, Operation::Edit, &guard, 0),
        Decision::Deny(DenyReason::AccountNotActive)
    );

    // Active but outranked: clearance denial.
    let player = active_person("player", &[RoleName::Person]);
    assert_eq!(
        authorize(&player, Operation::View, &guard, 0),
        Decision::Deny(DenyReason::InsufficientClearance)
    );

    // Clearance but no edit role: still a clearance denial on writes.
    let orga = active_person("orga", &[RoleName::Orga]);
    assert!(authorize(&orga, Operation::View, &guard, 0).is_allowed());
    assert!(authorize(&orga, Operation::Edit, &guard, 0).is_allowed());

    let admin = active_person("admin", &[RoleName::Admin]);
    assert!(authorize(&admin, Operation::Delete, &guard, 0).is_allowed());
}

#[test]
fn test_effective_clearance_is_the_best_active_role() {
    let mut person = active_person("multi", &[RoleName::Person]);
    assert_eq!(effective_clearance(&person, 0), Clearance::Alpha);

    person.grant_role(Role::new(RoleName::Judge, 0), 0);
    assert_eq!(effective_clearance(&person, 0), Clearance::Gamma);

    // An expired grant stops counting.
    let mut orga = Role::new(RoleName::Orga, 0);
    orga.expires_at_ms = Some(100);
    person.grant_role(orga, 0);
    assert_eq!(effective_clearance(&person, 50), Clearance::Delta);
    assert_eq!(effective_clearance(&person, 200), Clearance::Gamma);
}

#[test]
fn test_operative_dossier_is_readable_but_not_editable_below_its_clearance() {
    // An operative dossier is visible to everyone but editable only at
    // the operative's own clearance tier.
    let player_id = EntityId::generate();
    let mut operative = Operative::new(player_id, "Quinn", "Sebastian", Cosm::Aysle).unwrap();
    operative.award_xp(600); // Delta tier
    let guard = operative.guard();

    let bystander = active_person("bystander", &[RoleName::Person]);
    assert!(authorize(&bystander, Operation::View, &guard, 0).is_allowed());
    assert_eq!(
        authorize(&bystander, Operation::Edit, &guard, 0),
        Decision::Deny(DenyReason::InsufficientClearance)
    );
}

#[test]
fn test_operative_owner_needs_clearance_and_ownership() {
    let persons: MemoryStore<Person> = MemoryStore::new();
    let player = stored_person(&persons, "owner", &[RoleName::Person]);
    let rival = stored_person(&persons, "rival", &[RoleName::Orga]);

    let operative =
        Operative::new(player.meta.id, "Tolk", "of the Edeinos", Cosm::LivingLand).unwrap();
    let guard = operative.guard();

    // The owning player edits their own dossier.
    assert!(authorize(&player, Operation::Edit, &guard, 0).is_allowed());
    // A steward role overrides ownership; a plain player does not get in.
    assert!(authorize(&rival, Operation::Edit, &guard, 0).is_allowed());

    let stranger = active_person("stranger", &[RoleName::Person]);
    assert_eq!(
        authorize(&stranger, Operation::Edit, &guard, 0),
        Decision::Deny(DenyReason::NotOwner)
    );
}

#[test]
fn test_report_children_close_when_the_report_finalizes() {
    let mission = sample_mission("DC-021", Clearance::Any);
    let gm = active_person("gamemaster", &[RoleName::GameMaster]);
    let mut report = MissionReport::new(&mission, gm.meta.id, 0);

    let author = active_person("author", &[RoleName::Person]);
    let mut child = OperativeReport::new(report.meta.id, EntityId::generate());
    child.meta.created_by = Some(author.meta.id);

    assert!(authorize(&author, Operation::Edit, &child.guard_in(&report), 0).is_allowed());

    report.finalized = true;
    assert_eq!(
        authorize(&author, Operation::Edit, &child.guard_in(&report), 0),
        Decision::Deny(DenyReason::NotOwner)
    );
    // The game master stewards the children even after finalization.
    assert!(authorize(&gm, Operation::Edit, &child.guard_in(&report), 0).is_allowed());
}

#[test]
fn test_mission_clearance_flows_into_its_reports() {
    let mission = Mission::new("DC-022", "Deep Probe", Cosm::PanPacifica, Clearance::Omega).unwrap();
    let report = MissionReport::new(&mission, EntityId::generate(), 0);

    let judge = active_person("gamma-judge", &[RoleName::Judge]);
    assert_eq!(
        authorize(&judge, Operation::View, &report.guard(), 0),
        Decision::Deny(DenyReason::InsufficientClearance)
    );

    let admin = active_person("omega-admin", &[RoleName::Admin]);
    assert!(authorize(&admin, Operation::View, &report.guard(), 0).is_allowed());
}
