// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Versioned organizational structures and their publish bookkeeping.

use crate::snapshot::Snapshot;
use crate::types::{PublishStatus, PublishStepName, StepStatus, VersionStatus};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// A proposed move of one employee, attached to a draft version.
///
/// Reassignments are consumed by the publish saga but never mutated by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reassignment {
    pub employee_number: String,
    pub previous_org_unit_id: Option<i64>,
    pub previous_org_unit_name: String,
    pub previous_position_id: Option<i64>,
    pub previous_position_name: String,
    pub new_org_unit_id: Option<i64>,
    pub new_org_unit_name: String,
    pub new_position_id: Option<i64>,
    pub new_position_name: String,
    pub reason: String,
    #[serde(default)]
    pub executed: bool,
}

/// One step of the publish saga.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishStep {
    pub name: PublishStepName,
    pub status: StepStatus,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
}

impl PublishStep {
    /// Creates a pending step.
    #[must_use]
    pub const fn pending(name: PublishStepName) -> Self {
        Self {
            name,
            status: StepStatus::Pending,
            completed_at: None,
        }
    }
}

/// Progress record of the most recent publish attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishProgress {
    pub steps: Vec<PublishStep>,
    pub total_identities_updated: u32,
    pub total_history_entries_created: u32,
    pub error: Option<String>,
}

impl PublishProgress {
    /// A fresh progress record: all four steps pending, counters zeroed.
    #[must_use]
    pub fn initialized() -> Self {
        Self {
            steps: PublishStepName::ALL
                .iter()
                .copied()
                .map(PublishStep::pending)
                .collect(),
            total_identities_updated: 0,
            total_history_entries_created: 0,
            error: None,
        }
    }

    /// Returns the status of a step, or `None` if the step is not recorded.
    #[must_use]
    pub fn step_status(&self, name: PublishStepName) -> Option<StepStatus> {
        self.steps.iter().find(|s| s.name == name).map(|s| s.status)
    }

    /// Marks a step completed at `at`.
    pub fn complete_step(&mut self, name: PublishStepName, at: OffsetDateTime) {
        if let Some(step) = self.steps.iter_mut().find(|s| s.name == name) {
            step.status = StepStatus::Completed;
            step.completed_at = Some(at);
        }
    }

    /// Marks a step failed and records the error message.
    pub fn fail_step(&mut self, name: PublishStepName, error: String) {
        if let Some(step) = self.steps.iter_mut().find(|s| s.name == name) {
            step.status = StepStatus::Failed;
            step.completed_at = None;
        }
        self.error = Some(error);
    }

    /// Returns `true` if every step is completed.
    #[must_use]
    pub fn all_completed(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|s| s.status == StepStatus::Completed)
    }
}

impl Default for PublishProgress {
    fn default() -> Self {
        Self::initialized()
    }
}

/// A versioned, point-in-time organizational structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgStructureVersion {
    pub version_id: i64,
    pub organization_id: i64,
    pub version_number: i32,
    pub version_name: String,
    #[serde(with = "crate::iso_date")]
    pub effective_date: Date,
    #[serde(default, with = "crate::iso_date::option")]
    pub end_date: Option<Date>,
    pub status: VersionStatus,
    pub structure: Snapshot,
    /// Incremented on every snapshot correction; structure writes are
    /// compare-and-set on this value.
    pub structure_revision: i32,
    pub reassignments: Vec<Reassignment>,
    pub publish_status: PublishStatus,
    pub publish_progress: PublishProgress,
    /// Reference number of the decree that authorized the restructure.
    pub sk_number: Option<String>,
    #[serde(default, with = "crate::iso_date::option")]
    pub sk_date: Option<Date>,
    pub notes: Option<String>,
    pub created_by: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl OrgStructureVersion {
    /// Returns whether this version describes the structure in force on
    /// `date`: `effective_date <= date` and no `end_date` at or before it.
    ///
    /// Status is not considered here.
    #[must_use]
    pub fn covers(&self, date: Date) -> bool {
        self.effective_date <= date && self.end_date.is_none_or(|end| end > date)
    }

    /// Lightweight metadata view without the snapshot.
    #[must_use]
    pub fn summary(&self) -> VersionSummary {
        VersionSummary {
            version_id: self.version_id,
            organization_id: self.organization_id,
            version_number: self.version_number,
            version_name: self.version_name.clone(),
            effective_date: self.effective_date,
            end_date: self.end_date,
            status: self.status,
            publish_status: self.publish_status,
            sk_number: self.sk_number.clone(),
            employee_count: self.structure.employees.len(),
            reassignment_count: self.reassignments.len(),
        }
    }
}

/// Everything needed to persist a brand-new draft version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVersion {
    pub organization_id: i64,
    pub version_number: i32,
    pub version_name: String,
    pub effective_date: Date,
    pub structure: Snapshot,
    pub sk_number: Option<String>,
    pub sk_date: Option<Date>,
    pub notes: Option<String>,
    pub created_by: String,
}

/// Editable fields of a draft version. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionUpdate {
    pub version_name: Option<String>,
    #[serde(default, with = "crate::iso_date::option")]
    pub effective_date: Option<Date>,
    pub notes: Option<String>,
    pub sk_number: Option<String>,
    #[serde(default, with = "crate::iso_date::option")]
    pub sk_date: Option<Date>,
    pub reassignments: Option<Vec<Reassignment>>,
}

impl VersionUpdate {
    /// Applies the update to a version in memory.
    pub fn apply_to(&self, version: &mut OrgStructureVersion) {
        if let Some(name) = &self.version_name {
            version.version_name.clone_from(name);
        }
        if let Some(date) = self.effective_date {
            version.effective_date = date;
        }
        if let Some(notes) = &self.notes {
            version.notes = Some(notes.clone());
        }
        if let Some(sk_number) = &self.sk_number {
            version.sk_number = Some(sk_number.clone());
        }
        if let Some(sk_date) = self.sk_date {
            version.sk_date = Some(sk_date);
        }
        if let Some(reassignments) = &self.reassignments {
            version.reassignments.clone_from(reassignments);
        }
    }
}

/// Version metadata without the snapshot, for timelines and listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSummary {
    pub version_id: i64,
    pub organization_id: i64,
    pub version_number: i32,
    pub version_name: String,
    #[serde(with = "crate::iso_date")]
    pub effective_date: Date,
    #[serde(default, with = "crate::iso_date::option")]
    pub end_date: Option<Date>,
    pub status: VersionStatus,
    pub publish_status: PublishStatus,
    pub sk_number: Option<String>,
    pub employee_count: usize,
    pub reassignment_count: usize,
}

/// Picks the version in force on `date` among `versions`.
///
/// Only `Active` versions qualify. When several match, the one with the
/// latest effective date (then highest version number) wins.
#[must_use]
pub fn select_version_at(
    versions: &[OrgStructureVersion],
    date: Date,
) -> Option<&OrgStructureVersion> {
    versions
        .iter()
        .filter(|v| v.status == VersionStatus::Active && v.covers(date))
        .max_by_key(|v| (v.effective_date, v.version_number))
}
