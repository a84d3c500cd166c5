// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    ENGINEER, HR, IT, NOW, OFFICER, ORG, create_draft, create_draft_with_moves,
    create_test_employee, create_test_store,
};
use crate::memory::{FailPoint, InMemoryStore};
use crate::store::{HistoryStore, VersionStore};
use crate::{
    PublishOutcome, PublishReport, Publisher, VersionError, VersionManager, assignment_is_current,
    needs_activation, needs_archive,
};
use orgstruct_domain::{
    Employee, HistoryEventType, OrgStructureVersion, PublishStatus, PublishStepName, Reassignment,
    StepStatus, VersionStatus,
};
use time::macros::{date, datetime};

fn published(outcome: PublishOutcome) -> PublishReport {
    match outcome {
        PublishOutcome::Published(report) => report,
        other => panic!("expected a completed publish, got {other:?}"),
    }
}

fn load(store: &mut InMemoryStore, version_id: i64) -> OrgStructureVersion {
    store.find_version(version_id).unwrap().unwrap()
}

#[test]
fn test_publish_applies_reassignments_and_history() {
    let mut store: InMemoryStore = create_test_store();
    let version_id: i64 = create_draft_with_moves(&mut store);

    let report: PublishReport =
        published(Publisher::at(&mut store, NOW).publish_version(version_id).unwrap());
    assert_eq!(report.identities_updated, 2);
    assert_eq!(report.history_entries_created, 2);
    assert!(report.skipped_employees.is_empty());
    assert!(report.archived_versions.is_empty());

    let e1: &Employee = store.employee(100).unwrap();
    assert_eq!(e1.org_unit_id, Some(HR));
    assert_eq!(e1.position_id, Some(ENGINEER));
    let e3: &Employee = store.employee(102).unwrap();
    assert_eq!(e3.org_unit_id, Some(IT));
    assert_eq!(e3.position_id, Some(ENGINEER));

    let version: OrgStructureVersion = load(&mut store, version_id);
    assert_eq!(version.status, VersionStatus::Active);
    assert_eq!(version.publish_status, PublishStatus::Completed);
    assert!(version.publish_progress.all_completed());
    assert_eq!(version.publish_progress.total_identities_updated, 2);
    assert_eq!(version.publish_progress.total_history_entries_created, 2);
    assert_eq!(version.publish_progress.error, None);
    for step in &version.publish_progress.steps {
        assert_eq!(step.completed_at, Some(NOW));
    }

    let history = store.list_history_for_employee(100).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].event_type, HistoryEventType::OrgRestructure);
    assert_eq!(history[0].event_date, date!(2026 - 04 - 01));
    assert_eq!(history[0].previous_org_unit_id, Some(IT));
    assert_eq!(history[0].new_org_unit_id, Some(HR));
    assert_eq!(history[0].details.version_id, version_id);
    assert_eq!(history[0].details.sk_number.as_deref(), Some("SK-2026-001"));
}

#[test]
fn test_publish_twice_is_a_no_op() {
    let mut store: InMemoryStore = create_test_store();
    let version_id: i64 = create_draft_with_moves(&mut store);

    Publisher::at(&mut store, NOW).publish_version(version_id).unwrap();
    let after_first: OrgStructureVersion = load(&mut store, version_id);
    let writes_after_first: usize = store.assignment_writes();

    let later = datetime!(2026-03-02 08:00 UTC);
    let outcome: PublishOutcome = Publisher::at(&mut store, later)
        .publish_version(version_id)
        .unwrap();
    assert_eq!(outcome, PublishOutcome::AlreadyPublished);

    assert_eq!(store.assignment_writes(), writes_after_first);
    assert_eq!(store.count_history_for_version(version_id).unwrap(), 2);
    assert_eq!(load(&mut store, version_id), after_first);
}

#[test]
fn test_publishing_archives_previous_active_version() {
    let mut store: InMemoryStore = create_test_store();
    let first: i64 = create_draft(&mut store, "Initial", date!(2026 - 01 - 01));
    Publisher::at(&mut store, NOW).publish_version(first).unwrap();
    let second: i64 = create_draft_with_moves(&mut store);

    let later = datetime!(2026-04-01 07:30 UTC);
    let report: PublishReport =
        published(Publisher::at(&mut store, later).publish_version(second).unwrap());
    assert_eq!(report.archived_versions, vec![first]);

    let active: Vec<OrgStructureVersion> =
        store.list_versions(ORG, Some(VersionStatus::Active)).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].version_id, second);

    let old: OrgStructureVersion = load(&mut store, first);
    assert_eq!(old.status, VersionStatus::Archived);
    assert_eq!(old.end_date, Some(date!(2026 - 04 - 01)));
}

#[test]
fn test_failed_step_is_recorded_and_retry_completes() {
    let mut store: InMemoryStore = create_test_store();
    let version_id: i64 = create_draft_with_moves(&mut store);
    store.inject_failure(FailPoint::AssignmentWrite(102));

    let outcome: PublishOutcome = Publisher::at(&mut store, NOW)
        .publish_version(version_id)
        .unwrap();
    let PublishOutcome::Failed { step, error } = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert_eq!(step, PublishStepName::UpdateIdentities);
    assert!(error.contains("E3"));

    let version: OrgStructureVersion = load(&mut store, version_id);
    assert_eq!(version.status, VersionStatus::Active);
    assert_eq!(version.publish_status, PublishStatus::Failed);
    assert_eq!(
        version.publish_progress.step_status(PublishStepName::ActivateNew),
        Some(StepStatus::Completed)
    );
    assert_eq!(
        version.publish_progress.step_status(PublishStepName::UpdateIdentities),
        Some(StepStatus::Failed)
    );
    assert_eq!(
        version.publish_progress.step_status(PublishStepName::CreateHistory),
        Some(StepStatus::Pending)
    );
    assert!(version.publish_progress.error.is_some());
    // The batch kept going past the failing item.
    assert_eq!(store.employee(100).unwrap().org_unit_id, Some(HR));
    assert_eq!(store.count_history_for_version(version_id).unwrap(), 0);

    store.clear_failures();
    let report: PublishReport =
        published(Publisher::at(&mut store, NOW).resume_publish(version_id).unwrap());
    assert_eq!(report.identities_updated, 1);
    assert_eq!(report.history_entries_created, 2);

    let version: OrgStructureVersion = load(&mut store, version_id);
    assert_eq!(version.publish_status, PublishStatus::Completed);
    assert_eq!(version.publish_progress.error, None);
    assert_eq!(store.employee(102).unwrap().org_unit_id, Some(IT));
    assert_eq!(store.assignment_writes(), 2);
}

#[test]
fn test_history_is_never_duplicated_across_retries() {
    let mut store: InMemoryStore = create_test_store();
    let version_id: i64 = create_draft_with_moves(&mut store);
    store.inject_failure(FailPoint::HistoryInsert(102));

    let outcome: PublishOutcome = Publisher::at(&mut store, NOW)
        .publish_version(version_id)
        .unwrap();
    assert!(matches!(
        outcome,
        PublishOutcome::Failed {
            step: PublishStepName::CreateHistory,
            ..
        }
    ));
    assert_eq!(store.count_history_for_version(version_id).unwrap(), 1);

    store.clear_failures();
    let report: PublishReport =
        published(Publisher::at(&mut store, NOW).publish_version(version_id).unwrap());
    assert_eq!(report.history_entries_created, 1);
    assert_eq!(report.identities_updated, 0);

    assert_eq!(store.count_history_for_version(version_id).unwrap(), 2);
    for employee_id in [100, 102] {
        let entries = store.list_history_for_employee(employee_id).unwrap();
        assert_eq!(entries.len(), 1, "employee {employee_id}");
    }
}

#[test]
fn test_failed_activation_can_be_retried() {
    let mut store: InMemoryStore = create_test_store();
    let version_id: i64 = create_draft(&mut store, "Initial", date!(2026 - 01 - 01));
    store.inject_failure(FailPoint::ActivateVersion);

    let outcome: PublishOutcome = Publisher::at(&mut store, NOW)
        .publish_version(version_id)
        .unwrap();
    assert!(matches!(
        outcome,
        PublishOutcome::Failed {
            step: PublishStepName::ActivateNew,
            ..
        }
    ));
    assert_eq!(load(&mut store, version_id).status, VersionStatus::Draft);

    store.clear_failure(FailPoint::ActivateVersion);
    let outcome: PublishOutcome = Publisher::at(&mut store, NOW)
        .resume_publish(version_id)
        .unwrap();
    assert!(matches!(outcome, PublishOutcome::Published(_)));
    assert_eq!(load(&mut store, version_id).status, VersionStatus::Active);
}

#[test]
fn test_interrupted_publish_of_active_version_is_finished() {
    let mut store: InMemoryStore = create_test_store();
    let version_id: i64 = create_draft_with_moves(&mut store);
    Publisher::at(&mut store, NOW).publish_version(version_id).unwrap();

    // Simulate a crash after activation but before completion was recorded.
    let mut version: OrgStructureVersion = load(&mut store, version_id);
    version.publish_status = PublishStatus::InProgress;
    store.put_version(version);

    let outcome: PublishOutcome = Publisher::at(&mut store, NOW)
        .resume_publish(version_id)
        .unwrap();
    let report: PublishReport = published(outcome);
    assert_eq!(report.identities_updated, 0);
    assert_eq!(report.history_entries_created, 0);
    assert_eq!(
        load(&mut store, version_id).publish_status,
        PublishStatus::Completed
    );
}

#[test]
fn test_missing_employee_is_skipped() {
    let mut store: InMemoryStore = create_test_store();
    let version_id: i64 = create_draft_with_moves(&mut store);
    // E3 is transferred out of the organization before publish.
    store.add_employee(create_test_employee(102, 9, "E3-OLD", Some(HR), Some(OFFICER)));

    let report: PublishReport =
        published(Publisher::at(&mut store, NOW).publish_version(version_id).unwrap());
    assert_eq!(report.skipped_employees, vec![String::from("E3")]);
    assert_eq!(report.identities_updated, 1);
    assert_eq!(report.history_entries_created, 1);
}

#[test]
fn test_publish_and_resume_preconditions() {
    let mut store: InMemoryStore = create_test_store();
    let first: i64 = create_draft(&mut store, "Initial", date!(2026 - 01 - 01));
    let mut publisher = Publisher::at(&mut store, NOW);

    assert!(matches!(
        publisher.publish_version(404),
        Err(VersionError::NotFound { .. })
    ));
    assert!(matches!(
        publisher.resume_publish(first),
        Err(VersionError::InvalidState(_))
    ));
    publisher.publish_version(first).unwrap();
    assert!(matches!(
        publisher.resume_publish(first),
        Err(VersionError::InvalidState(_))
    ));

    let second: i64 = create_draft(&mut store, "Next", date!(2026 - 06 - 01));
    Publisher::at(&mut store, NOW).publish_version(second).unwrap();
    assert!(matches!(
        Publisher::at(&mut store, NOW).publish_version(first),
        Err(VersionError::InvalidState(_))
    ));
}

#[test]
fn test_idempotency_predicates() {
    let mut store: InMemoryStore = create_test_store();
    let version_id: i64 = create_draft_with_moves(&mut store);
    let mut version: OrgStructureVersion = VersionManager::at(&mut store, NOW)
        .get_version(version_id)
        .unwrap();

    assert!(needs_activation(&version));
    assert!(!needs_archive(&version, version_id));
    version.status = VersionStatus::Active;
    assert!(!needs_activation(&version));
    assert!(needs_archive(&version, version_id + 1));
    assert!(!needs_archive(&version, version_id));

    let reassignment: &Reassignment = &version.reassignments[0];
    let mut employee: Employee = store.employee(100).unwrap().clone();
    assert!(!assignment_is_current(&employee, reassignment));
    employee.org_unit_id = reassignment.new_org_unit_id;
    employee.position_id = reassignment.new_position_id;
    assert!(assignment_is_current(&employee, reassignment));
}

#[test]
fn test_failed_archive_leaves_previous_version_active() {
    let mut store: InMemoryStore = create_test_store();
    let first: i64 = create_draft(&mut store, "Initial", date!(2026 - 01 - 01));
    Publisher::at(&mut store, NOW).publish_version(first).unwrap();
    let second: i64 = create_draft(&mut store, "Q2", date!(2026 - 04 - 01));
    store.inject_failure(FailPoint::ArchiveVersions);

    let outcome: PublishOutcome = Publisher::at(&mut store, NOW)
        .publish_version(second)
        .unwrap();
    assert!(matches!(
        outcome,
        PublishOutcome::Failed {
            step: PublishStepName::ArchiveOld,
            ..
        }
    ));
    assert_eq!(load(&mut store, first).status, VersionStatus::Active);
    let failed: OrgStructureVersion = load(&mut store, second);
    assert_eq!(failed.status, VersionStatus::Draft);
    assert_eq!(failed.publish_status, PublishStatus::Failed);
    assert_eq!(
        failed.publish_progress.step_status(PublishStepName::ArchiveOld),
        Some(StepStatus::Failed)
    );
    assert!(failed.publish_progress.error.is_some());

    store.clear_failure(FailPoint::ArchiveVersions);
    let report: PublishReport =
        published(Publisher::at(&mut store, NOW).resume_publish(second).unwrap());
    assert_eq!(report.archived_versions, vec![first]);
    assert_eq!(load(&mut store, first).status, VersionStatus::Archived);
    assert_eq!(load(&mut store, second).status, VersionStatus::Active);
}

#[test]
fn test_unsaved_publish_state_aborts_before_any_step() {
    let mut store: InMemoryStore = create_test_store();
    let version_id: i64 = create_draft_with_moves(&mut store);
    store.inject_failure(FailPoint::SavePublishState);

    let result: Result<PublishOutcome, VersionError> =
        Publisher::at(&mut store, NOW).publish_version(version_id);
    assert!(matches!(result, Err(VersionError::Store(_))));

    let version: OrgStructureVersion = load(&mut store, version_id);
    assert_eq!(version.status, VersionStatus::Draft);
    assert_eq!(version.publish_status, PublishStatus::NotStarted);
    assert_eq!(store.assignment_writes(), 0);
    assert_eq!(store.count_history_for_version(version_id).unwrap(), 0);
}
