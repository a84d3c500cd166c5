// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Store-level guarantees of the version, history and audit tables.

use super::helpers::{HR, IT, NOW, ORG, OTHER_ORG, create_test_persistence};
use crate::Persistence;
use orgstruct::{AuditSink, HistoryStore, StoreError, VersionStore};
use orgstruct_audit::{Actor, AuditEntry, EntityType, FieldChange};
use orgstruct_domain::{
    EmployeeHistoryEntry, HistoryDetails, HistoryEventType, NewHistoryEntry, NewVersion,
    OrgStructureVersion, PublishProgress, PublishStatus, PublishStepName, Reassignment, Snapshot,
    VersionStatus, VersionUpdate,
};
use time::OffsetDateTime;
use time::macros::{date, datetime};

fn create_test_new_version(organization_id: i64, version_number: i32) -> NewVersion {
    NewVersion {
        organization_id,
        version_number,
        version_name: format!("Version {version_number}"),
        effective_date: date!(2026 - 04 - 01),
        structure: Snapshot::empty(organization_id, NOW),
        sk_number: Some(String::from("SK-7")),
        sk_date: Some(date!(2026 - 03 - 15)),
        notes: None,
        created_by: String::from("admin"),
    }
}

fn create_test_history_entry(employee_id: i64, version_id: i64) -> NewHistoryEntry {
    NewHistoryEntry {
        employee_id,
        event_type: HistoryEventType::OrgRestructure,
        event_date: date!(2026 - 04 - 01),
        previous_org_unit_id: Some(IT),
        previous_position_id: None,
        new_org_unit_id: Some(HR),
        new_position_id: None,
        details: HistoryDetails {
            version_id,
            version_number: 1,
            sk_number: None,
        },
    }
}

fn insert(persistence: &mut Persistence, organization_id: i64, number: i32) -> i64 {
    persistence
        .insert_version(&create_test_new_version(organization_id, number), NOW)
        .unwrap()
}

fn load(persistence: &mut Persistence, version_id: i64) -> OrgStructureVersion {
    persistence.find_version(version_id).unwrap().unwrap()
}

#[test]
fn test_insert_version_round_trips_fields() {
    let mut persistence: Persistence = create_test_persistence();
    let version_id: i64 = insert(&mut persistence, ORG, 1);

    let version: OrgStructureVersion = load(&mut persistence, version_id);
    assert_eq!(version.version_number, 1);
    assert_eq!(version.status, VersionStatus::Draft);
    assert_eq!(version.publish_status, PublishStatus::NotStarted);
    assert_eq!(version.publish_progress, PublishProgress::initialized());
    assert_eq!(version.structure_revision, 0);
    assert!(version.reassignments.is_empty());
    assert_eq!(version.effective_date, date!(2026 - 04 - 01));
    assert_eq!(version.sk_date, Some(date!(2026 - 03 - 15)));
    assert_eq!(version.end_date, None);
    assert_eq!(version.structure, Snapshot::empty(ORG, NOW));
    assert_eq!(version.created_at, NOW);
    assert_eq!(version.updated_at, NOW);
}

#[test]
fn test_version_numbers_are_unique_per_organization() {
    let mut persistence: Persistence = create_test_persistence();
    insert(&mut persistence, ORG, 1);

    let duplicate: Result<i64, StoreError> =
        persistence.insert_version(&create_test_new_version(ORG, 1), NOW);
    assert!(matches!(duplicate, Err(StoreError::Conflict(_))));

    insert(&mut persistence, OTHER_ORG, 1);
    assert_eq!(persistence.max_version_number(ORG).unwrap(), Some(1));
    assert_eq!(persistence.max_version_number(OTHER_ORG).unwrap(), Some(1));
}

#[test]
fn test_only_one_active_version_per_organization() {
    let mut persistence: Persistence = create_test_persistence();
    let first: i64 = insert(&mut persistence, ORG, 1);
    let second: i64 = insert(&mut persistence, ORG, 2);
    let other: i64 = insert(&mut persistence, OTHER_ORG, 1);

    assert!(persistence.activate_version(first, NOW).unwrap());
    assert!(!persistence.activate_version(first, NOW).unwrap());
    assert!(matches!(
        persistence.activate_version(second, NOW),
        Err(StoreError::Conflict(_))
    ));
    assert!(persistence.activate_version(other, NOW).unwrap());

    let archived: Vec<i64> = persistence
        .archive_active_versions(ORG, second, date!(2026 - 03 - 31), NOW)
        .unwrap();
    assert_eq!(archived, vec![first]);
    assert!(persistence.activate_version(second, NOW).unwrap());

    let old: OrgStructureVersion = load(&mut persistence, first);
    assert_eq!(old.status, VersionStatus::Archived);
    assert_eq!(old.end_date, Some(date!(2026 - 03 - 31)));
    assert_eq!(
        load(&mut persistence, other).status,
        VersionStatus::Active,
        "archiving is scoped to one organization"
    );
}

#[test]
fn test_activate_missing_version_is_not_found() {
    let mut persistence: Persistence = create_test_persistence();
    assert!(matches!(
        persistence.activate_version(404, NOW),
        Err(StoreError::NotFound { .. })
    ));
}

#[test]
fn test_update_draft_only_touches_drafts() {
    let mut persistence: Persistence = create_test_persistence();
    let version_id: i64 = insert(&mut persistence, ORG, 1);
    let later: OffsetDateTime = datetime!(2026-03-02 09:30 UTC);

    let reassignment: Reassignment = Reassignment {
        employee_number: String::from("E1"),
        previous_org_unit_id: Some(IT),
        previous_org_unit_name: String::from("Information Technology"),
        previous_position_id: None,
        previous_position_name: String::new(),
        new_org_unit_id: Some(HR),
        new_org_unit_name: String::from("Human Resources"),
        new_position_id: None,
        new_position_name: String::new(),
        reason: String::from("Restructure"),
        executed: false,
    };
    let update: VersionUpdate = VersionUpdate {
        version_name: Some(String::from("Renamed")),
        notes: Some(String::from("approved by board")),
        reassignments: Some(vec![reassignment.clone()]),
        ..VersionUpdate::default()
    };
    assert!(persistence.update_draft(version_id, &update, later).unwrap());

    let version: OrgStructureVersion = load(&mut persistence, version_id);
    assert_eq!(version.version_name, "Renamed");
    assert_eq!(version.notes.as_deref(), Some("approved by board"));
    assert_eq!(version.sk_number.as_deref(), Some("SK-7"));
    assert_eq!(version.reassignments, vec![reassignment]);
    assert_eq!(version.updated_at, later);

    persistence.activate_version(version_id, NOW).unwrap();
    assert!(!persistence.update_draft(version_id, &update, NOW).unwrap());
    assert!(!persistence.update_draft(404, &update, NOW).unwrap());
}

#[test]
fn test_delete_draft_only_deletes_drafts() {
    let mut persistence: Persistence = create_test_persistence();
    let draft: i64 = insert(&mut persistence, ORG, 1);
    let active: i64 = insert(&mut persistence, ORG, 2);
    persistence.activate_version(active, NOW).unwrap();

    assert!(persistence.delete_draft(draft).unwrap());
    assert!(persistence.find_version(draft).unwrap().is_none());
    assert!(!persistence.delete_draft(active).unwrap());
    assert!(persistence.find_version(active).unwrap().is_some());
}

#[test]
fn test_replace_structure_is_compare_and_set() {
    let mut persistence: Persistence = create_test_persistence();
    let version_id: i64 = insert(&mut persistence, ORG, 1);
    let replacement: Snapshot = Snapshot::empty(ORG, datetime!(2026-03-05 08:00 UTC));

    assert!(
        persistence
            .replace_structure(version_id, 0, &replacement, NOW)
            .unwrap()
    );
    assert!(
        !persistence
            .replace_structure(version_id, 0, &replacement, NOW)
            .unwrap(),
        "a stale revision must not overwrite"
    );

    let version: OrgStructureVersion = load(&mut persistence, version_id);
    assert_eq!(version.structure_revision, 1);
    assert_eq!(version.structure, replacement);
}

#[test]
fn test_save_publish_state() {
    let mut persistence: Persistence = create_test_persistence();
    let version_id: i64 = insert(&mut persistence, ORG, 1);

    let mut progress: PublishProgress = PublishProgress::initialized();
    progress.complete_step(PublishStepName::ArchiveOld, NOW);
    progress.fail_step(PublishStepName::ActivateNew, String::from("boom"));
    persistence
        .save_publish_state(version_id, PublishStatus::Failed, &progress, NOW)
        .unwrap();

    let version: OrgStructureVersion = load(&mut persistence, version_id);
    assert_eq!(version.publish_status, PublishStatus::Failed);
    assert_eq!(version.publish_progress, progress);

    assert!(matches!(
        persistence.save_publish_state(404, PublishStatus::Failed, &progress, NOW),
        Err(StoreError::NotFound { .. })
    ));
}

#[test]
fn test_history_insert_is_idempotent() {
    let mut persistence: Persistence = create_test_persistence();
    let version_id: i64 = insert(&mut persistence, ORG, 1);
    let entry: NewHistoryEntry = create_test_history_entry(100, version_id);

    assert!(
        !persistence
            .history_entry_exists(100, HistoryEventType::OrgRestructure, version_id)
            .unwrap()
    );
    assert!(persistence.insert_history_entry_if_absent(&entry, NOW).unwrap());
    assert!(!persistence.insert_history_entry_if_absent(&entry, NOW).unwrap());
    assert!(
        persistence
            .history_entry_exists(100, HistoryEventType::OrgRestructure, version_id)
            .unwrap()
    );
    assert_eq!(persistence.count_history_for_version(version_id).unwrap(), 1);

    let history: Vec<EmployeeHistoryEntry> = persistence.list_history_for_employee(100).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].details.version_id, version_id);
    assert_eq!(history[0].new_org_unit_id, Some(HR));
    assert_eq!(history[0].created_at, NOW);
}

#[test]
fn test_history_requires_existing_version() {
    let mut persistence: Persistence = create_test_persistence();
    let entry: NewHistoryEntry = create_test_history_entry(100, 404);
    assert!(persistence.insert_history_entry_if_absent(&entry, NOW).is_err());
}

#[test]
fn test_audit_entries_round_trip() {
    let mut persistence: Persistence = create_test_persistence();
    let entry: AuditEntry = AuditEntry::version_correction(
        Actor::new(String::from("ops-1"), String::from("user")),
        "sync_org_unit_changes",
        EntityType::OrgUnit,
        HR,
        7,
        vec![FieldChange::new(
            "name",
            Some(String::from("Human Resources")),
            Some(String::from("People Operations")),
        )],
        NOW,
    );

    let first: i64 = persistence.record_audit_entry(&entry).unwrap();
    let second: i64 = persistence.record_audit_entry(&entry).unwrap();
    assert!(second > first);

    let entries: Vec<AuditEntry> = persistence.audit_entries_for_version(7).unwrap();
    assert_eq!(entries, vec![entry.clone(), entry]);
    assert!(persistence.audit_entries_for_version(8).unwrap().is_empty());
}
