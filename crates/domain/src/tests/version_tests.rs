// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{CAPTURED_AT, sample_snapshot};
use crate::{
    OrgStructureVersion, PublishProgress, PublishStatus, PublishStepName, StepStatus,
    VersionStatus, VersionUpdate, select_version_at,
};
use time::Date;
use time::macros::date;

fn version(
    version_id: i64,
    version_number: i32,
    effective_date: Date,
    status: VersionStatus,
) -> OrgStructureVersion {
    OrgStructureVersion {
        version_id,
        organization_id: 1,
        version_number,
        version_name: format!("v{version_number}"),
        effective_date,
        end_date: None,
        status,
        structure: sample_snapshot(),
        structure_revision: 0,
        reassignments: Vec::new(),
        publish_status: PublishStatus::NotStarted,
        publish_progress: PublishProgress::initialized(),
        sk_number: None,
        sk_date: None,
        notes: None,
        created_by: String::from("tester"),
        created_at: CAPTURED_AT,
        updated_at: CAPTURED_AT,
    }
}

#[test]
fn test_initialized_progress_has_four_pending_steps() {
    let progress: PublishProgress = PublishProgress::initialized();
    assert_eq!(progress.steps.len(), 4);
    for name in PublishStepName::ALL {
        assert_eq!(progress.step_status(name), Some(StepStatus::Pending));
    }
    assert!(!progress.all_completed());
    assert_eq!(progress.total_identities_updated, 0);
}

#[test]
fn test_progress_complete_and_fail() {
    let mut progress: PublishProgress = PublishProgress::initialized();
    progress.complete_step(PublishStepName::ArchiveOld, CAPTURED_AT);
    progress.fail_step(PublishStepName::ActivateNew, String::from("store down"));

    assert_eq!(
        progress.step_status(PublishStepName::ArchiveOld),
        Some(StepStatus::Completed)
    );
    assert_eq!(
        progress.step_status(PublishStepName::ActivateNew),
        Some(StepStatus::Failed)
    );
    assert_eq!(progress.error.as_deref(), Some("store down"));

    for name in PublishStepName::ALL {
        progress.complete_step(name, CAPTURED_AT);
    }
    assert!(progress.all_completed());
}

#[test]
fn test_covers_respects_end_date() {
    let mut v: OrgStructureVersion =
        version(1, 1, date!(2026 - 01 - 01), VersionStatus::Archived);
    v.end_date = Some(date!(2026 - 02 - 01));

    assert!(!v.covers(date!(2025 - 12 - 31)));
    assert!(v.covers(date!(2026 - 01 - 01)));
    assert!(v.covers(date!(2026 - 01 - 31)));
    assert!(!v.covers(date!(2026 - 02 - 01)));
}

#[test]
fn test_select_version_at_only_considers_active() {
    let versions: Vec<OrgStructureVersion> = vec![
        version(1, 1, date!(2026 - 01 - 01), VersionStatus::Archived),
        version(2, 2, date!(2026 - 02 - 01), VersionStatus::Active),
        version(3, 3, date!(2026 - 03 - 01), VersionStatus::Draft),
    ];

    assert!(select_version_at(&versions, date!(2026 - 01 - 15)).is_none());
    assert_eq!(
        select_version_at(&versions, date!(2026 - 04 - 01)).map(|v| v.version_id),
        Some(2)
    );
}

#[test]
fn test_update_applies_only_set_fields() {
    let mut v: OrgStructureVersion = version(1, 1, date!(2026 - 01 - 01), VersionStatus::Draft);
    let update: VersionUpdate = VersionUpdate {
        version_name: Some(String::from("Q1 restructure")),
        sk_number: Some(String::from("SK-001")),
        ..VersionUpdate::default()
    };
    update.apply_to(&mut v);

    assert_eq!(v.version_name, "Q1 restructure");
    assert_eq!(v.sk_number.as_deref(), Some("SK-001"));
    assert_eq!(v.effective_date, date!(2026 - 01 - 01));
    assert!(v.notes.is_none());
}

#[test]
fn test_summary_counts() {
    let v: OrgStructureVersion = version(5, 2, date!(2026 - 01 - 01), VersionStatus::Active);
    let summary = v.summary();
    assert_eq!(summary.version_id, 5);
    assert_eq!(summary.employee_count, 3);
    assert_eq!(summary.reassignment_count, 0);
}

#[test]
fn test_version_json_uses_iso_dates() {
    let v: OrgStructureVersion = version(1, 1, date!(2026 - 02 - 01), VersionStatus::Draft);
    let json: serde_json::Value = serde_json::to_value(&v).unwrap();
    assert_eq!(json["effective_date"], "2026-02-01");
    assert_eq!(json["status"], "draft");
    assert_eq!(json["publish_status"], "not_started");
    assert!(json["end_date"].is_null());

    let decoded: OrgStructureVersion = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, v);
}
