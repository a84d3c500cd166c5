// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Historical questions answered from stored snapshots only.

use crate::error::VersionError;
use crate::store::VersionStore;
use orgstruct_domain::{
    EmploymentStatus, OrgStructureVersion, Snapshot, SnapshotEmployee, SnapshotStats,
    StructureDiff, VersionStatus, VersionSummary, compare_snapshots, compute_stats,
    select_version_at,
};
use serde::Serialize;
use std::collections::BTreeMap;
use time::Date;
use tracing::debug;

/// Where an employee sat in the version in force on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeAssignment {
    pub organization_id: i64,
    pub version_id: i64,
    pub version_number: i32,
    #[serde(with = "crate::iso_date")]
    pub effective_date: Date,
    pub employee: SnapshotEmployee,
}

/// One version in which an employee belonged to a given unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitTimelineEntry {
    pub version_id: i64,
    pub version_number: i32,
    #[serde(with = "crate::iso_date")]
    pub effective_date: Date,
    #[serde(with = "crate::iso_date::option")]
    pub end_date: Option<Date>,
    pub position_name: String,
}

/// Difference between two stored versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionComparison {
    pub from: VersionSummary,
    pub to: VersionSummary,
    pub diff: StructureDiff,
}

/// Headcount aggregates of a stored version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionStats {
    pub version: VersionSummary,
    pub stats: SnapshotStats,
}

/// Narrows [`QueryHelper::search_employee_history`]. Unset fields match all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeHistoryFilter {
    pub org_unit_id: Option<i64>,
    pub position_id: Option<i64>,
    pub employment_status: Option<EmploymentStatus>,
    /// Inclusive lower bound on effective date.
    pub effective_from: Option<Date>,
    /// Inclusive upper bound on effective date.
    pub effective_to: Option<Date>,
}

impl EmployeeHistoryFilter {
    fn matches(&self, version: &OrgStructureVersion, employee: &SnapshotEmployee) -> bool {
        self.org_unit_id.is_none_or(|id| employee.org_unit_id == Some(id))
            && self
                .position_id
                .is_none_or(|id| employee.position_id == Some(id))
            && self
                .employment_status
                .is_none_or(|status| employee.employment_status == status)
            && self
                .effective_from
                .is_none_or(|from| version.effective_date >= from)
            && self
                .effective_to
                .is_none_or(|to| version.effective_date <= to)
    }
}

/// The employee as captured by one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeHistoryRecord {
    pub version: VersionSummary,
    pub employee: SnapshotEmployee,
}

/// Read-only queries over stored versions.
pub struct QueryHelper<'a, S> {
    store: &'a mut S,
}

impl<'a, S: VersionStore> QueryHelper<'a, S> {
    pub const fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Snapshot of the active version of `organization_id` in force on
    /// `date`. Archived versions are never returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn get_org_structure_at(
        &mut self,
        organization_id: i64,
        date: Date,
    ) -> Result<Option<Snapshot>, VersionError> {
        let versions: Vec<OrgStructureVersion> = self
            .store
            .list_versions(organization_id, Some(VersionStatus::Active))?;
        let selected: Option<&OrgStructureVersion> = select_version_at(&versions, date);
        debug!(
            organization_id,
            %date,
            version_id = ?selected.map(|v| v.version_id),
            "Resolved structure at date"
        );
        Ok(selected.map(|v| v.structure.clone()))
    }

    /// The employee's record in the active version in force on `date`,
    /// searching every organization.
    ///
    /// If several organizations match, the one whose version took effect
    /// most recently wins.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn get_employee_assignment_at(
        &mut self,
        employee_number: &str,
        date: Date,
    ) -> Result<Option<EmployeeAssignment>, VersionError> {
        let versions: Vec<OrgStructureVersion> = self
            .store
            .list_versions_with_status(&[VersionStatus::Active])?;

        let mut by_organization: BTreeMap<i64, Vec<OrgStructureVersion>> = BTreeMap::new();
        for version in versions {
            by_organization
                .entry(version.organization_id)
                .or_default()
                .push(version);
        }

        Ok(by_organization
            .values()
            .filter_map(|versions| select_version_at(versions, date))
            .filter_map(|version| {
                version
                    .structure
                    .find_employee_by_number(employee_number)
                    .map(|employee| (version, employee))
            })
            .max_by_key(|(version, _)| (version.effective_date, version.version_number))
            .map(|(version, employee)| EmployeeAssignment {
                organization_id: version.organization_id,
                version_id: version.version_id,
                version_number: version.version_number,
                effective_date: version.effective_date,
                employee: employee.clone(),
            }))
    }

    /// Members of an org unit as captured by a version.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the version does not exist.
    pub fn get_org_unit_members_at(
        &mut self,
        org_unit_id: i64,
        version_id: i64,
    ) -> Result<Vec<SnapshotEmployee>, VersionError> {
        Ok(self.load(version_id)?.structure.members_of(org_unit_id))
    }

    /// Published versions in which the employee belonged to the unit,
    /// ordered by effective date.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn get_employee_timeline_in_unit(
        &mut self,
        identity_id: i64,
        org_unit_id: i64,
    ) -> Result<Vec<UnitTimelineEntry>, VersionError> {
        let versions: Vec<OrgStructureVersion> = self
            .store
            .list_versions_with_status(&[VersionStatus::Active, VersionStatus::Archived])?;

        let mut timeline: Vec<UnitTimelineEntry> = versions
            .iter()
            .filter_map(|version| {
                version
                    .structure
                    .find_employee(identity_id)
                    .filter(|e| e.org_unit_id == Some(org_unit_id))
                    .map(|employee| UnitTimelineEntry {
                        version_id: version.version_id,
                        version_number: version.version_number,
                        effective_date: version.effective_date,
                        end_date: version.end_date,
                        position_name: employee.position_name.clone(),
                    })
            })
            .collect();
        timeline.sort_by_key(|entry| (entry.effective_date, entry.version_number));
        Ok(timeline)
    }

    /// Structural diff from `from_version_id` to `to_version_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if either version does not exist.
    pub fn compare_versions(
        &mut self,
        from_version_id: i64,
        to_version_id: i64,
    ) -> Result<VersionComparison, VersionError> {
        let from: OrgStructureVersion = self.load(from_version_id)?;
        let to: OrgStructureVersion = self.load(to_version_id)?;
        let diff: StructureDiff = compare_snapshots(&from.structure, &to.structure);
        debug!(
            from_version_id,
            to_version_id,
            employees_reassigned = diff.employees.reassigned.len(),
            "Compared versions"
        );
        Ok(VersionComparison {
            from: from.summary(),
            to: to.summary(),
            diff,
        })
    }

    /// Version metadata of an organization, ascending version number.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn get_version_timeline(
        &mut self,
        organization_id: i64,
    ) -> Result<Vec<VersionSummary>, VersionError> {
        Ok(self
            .store
            .list_versions(organization_id, None)?
            .iter()
            .map(OrgStructureVersion::summary)
            .collect())
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the version does not exist.
    pub fn get_version_stats(&mut self, version_id: i64) -> Result<VersionStats, VersionError> {
        let version: OrgStructureVersion = self.load(version_id)?;
        Ok(VersionStats {
            stats: compute_stats(&version.structure),
            version: version.summary(),
        })
    }

    /// Every version, of any status, whose snapshot contains the employee,
    /// narrowed by `filter` and ordered by effective date.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn search_employee_history(
        &mut self,
        identity_id: i64,
        filter: &EmployeeHistoryFilter,
    ) -> Result<Vec<EmployeeHistoryRecord>, VersionError> {
        let versions: Vec<OrgStructureVersion> = self.store.list_versions_with_status(&[
            VersionStatus::Draft,
            VersionStatus::Active,
            VersionStatus::Archived,
        ])?;

        Ok(versions
            .iter()
            .filter_map(|version| {
                version
                    .structure
                    .find_employee(identity_id)
                    .filter(|employee| filter.matches(version, employee))
                    .map(|employee| EmployeeHistoryRecord {
                        version: version.summary(),
                        employee: employee.clone(),
                    })
            })
            .collect())
    }

    fn load(&mut self, version_id: i64) -> Result<OrgStructureVersion, VersionError> {
        self.store
            .find_version(version_id)?
            .ok_or_else(|| VersionError::version_not_found(version_id))
    }
}
