// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! An in-memory implementation of every store trait.
//!
//! Used by the engine's tests and handy for embedding. It enforces the same
//! constraints as the SQL backend: unique version numbers per organization,
//! a single active version per organization, and unique history keys.
//! Individual operations can be made to fail through [`FailPoint`].

use crate::error::StoreError;
use crate::store::{AuditSink, DirectoryStore, HistoryStore, VersionStore};
use orgstruct_audit::AuditEntry;
use orgstruct_domain::{
    Employee, EmployeeHistoryEntry, EmploymentStatus, HistoryEventType, NewHistoryEntry,
    NewVersion, OrgStructureVersion, OrgUnit, OrgUnitChanges, Position, PositionChanges,
    PublishProgress, PublishStatus, Snapshot, VersionStatus, VersionUpdate,
};
use std::collections::{BTreeMap, HashSet};
use time::{Date, OffsetDateTime};

/// An operation that can be forced to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    ArchiveVersions,
    ActivateVersion,
    /// Assignment writes for one identity id.
    AssignmentWrite(i64),
    /// History inserts for one employee id.
    HistoryInsert(i64),
    SavePublishState,
    ReplaceStructure,
    /// Another writer bumps the structure revision just before each
    /// snapshot write, so the compare-and-set loses.
    ConcurrentStructureWrite,
    UpdateOrgUnit,
    UpdatePosition,
    AuditInsert,
}

/// Store backed by ordered maps.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    org_units: BTreeMap<i64, OrgUnit>,
    positions: BTreeMap<i64, Position>,
    employees: BTreeMap<i64, Employee>,
    versions: BTreeMap<i64, OrgStructureVersion>,
    history: Vec<EmployeeHistoryEntry>,
    audit: Vec<AuditEntry>,
    next_version_id: i64,
    next_history_id: i64,
    failures: HashSet<FailPoint>,
    assignment_writes: usize,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_org_unit(&mut self, unit: OrgUnit) {
        self.org_units.insert(unit.org_unit_id, unit);
    }

    pub fn add_position(&mut self, position: Position) {
        self.positions.insert(position.position_id, position);
    }

    pub fn add_employee(&mut self, employee: Employee) {
        self.employees.insert(employee.identity_id, employee);
    }

    /// Mutable access to a live employee, for simulating directory edits.
    pub fn employee_mut(&mut self, identity_id: i64) -> Option<&mut Employee> {
        self.employees.get_mut(&identity_id)
    }

    #[must_use]
    pub fn org_unit(&self, org_unit_id: i64) -> Option<&OrgUnit> {
        self.org_units.get(&org_unit_id)
    }

    #[must_use]
    pub fn position(&self, position_id: i64) -> Option<&Position> {
        self.positions.get(&position_id)
    }

    #[must_use]
    pub fn employee(&self, identity_id: i64) -> Option<&Employee> {
        self.employees.get(&identity_id)
    }

    /// Stores a fully formed version as-is, bypassing the draft insert path.
    pub fn put_version(&mut self, version: OrgStructureVersion) {
        self.next_version_id = self.next_version_id.max(version.version_id);
        self.versions.insert(version.version_id, version);
    }

    /// All history entries, in insertion order.
    #[must_use]
    pub fn history(&self) -> &[EmployeeHistoryEntry] {
        &self.history
    }

    /// Number of assignment writes that actually changed an employee.
    #[must_use]
    pub const fn assignment_writes(&self) -> usize {
        self.assignment_writes
    }

    pub fn inject_failure(&mut self, point: FailPoint) {
        self.failures.insert(point);
    }

    pub fn clear_failure(&mut self, point: FailPoint) {
        self.failures.remove(&point);
    }

    pub fn clear_failures(&mut self) {
        self.failures.clear();
    }

    fn check(&self, point: FailPoint) -> Result<(), StoreError> {
        if self.failures.contains(&point) {
            return Err(StoreError::Backend(format!("injected failure at {point:?}")));
        }
        Ok(())
    }

    fn version_mut(&mut self, version_id: i64) -> Result<&mut OrgStructureVersion, StoreError> {
        self.versions
            .get_mut(&version_id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "version",
                id: version_id.to_string(),
            })
    }
}

impl DirectoryStore for InMemoryStore {
    fn list_org_units(&mut self, organization_id: i64) -> Result<Vec<OrgUnit>, StoreError> {
        Ok(self
            .org_units
            .values()
            .filter(|u| u.organization_id == organization_id)
            .cloned()
            .collect())
    }

    fn list_positions(&mut self, organization_id: i64) -> Result<Vec<Position>, StoreError> {
        Ok(self
            .positions
            .values()
            .filter(|p| p.organization_id == organization_id)
            .cloned()
            .collect())
    }

    fn list_employees(
        &mut self,
        organization_id: i64,
        statuses: &[EmploymentStatus],
    ) -> Result<Vec<Employee>, StoreError> {
        Ok(self
            .employees
            .values()
            .filter(|e| e.organization_id == organization_id)
            .filter(|e| statuses.contains(&e.employment_status))
            .cloned()
            .collect())
    }

    fn find_employee(&mut self, identity_id: i64) -> Result<Option<Employee>, StoreError> {
        Ok(self.employees.get(&identity_id).cloned())
    }

    fn find_employee_by_number(
        &mut self,
        organization_id: i64,
        employee_number: &str,
    ) -> Result<Option<Employee>, StoreError> {
        Ok(self
            .employees
            .values()
            .find(|e| e.organization_id == organization_id && e.employee_number == employee_number)
            .cloned())
    }

    fn update_employee_assignment(
        &mut self,
        identity_id: i64,
        org_unit_id: Option<i64>,
        position_id: Option<i64>,
    ) -> Result<bool, StoreError> {
        self.check(FailPoint::AssignmentWrite(identity_id))?;
        let Some(employee) = self.employees.get_mut(&identity_id) else {
            return Ok(false);
        };
        if employee.org_unit_id == org_unit_id && employee.position_id == position_id {
            return Ok(false);
        }
        employee.org_unit_id = org_unit_id;
        employee.position_id = position_id;
        self.assignment_writes += 1;
        Ok(true)
    }

    fn update_org_unit(
        &mut self,
        org_unit_id: i64,
        changes: &OrgUnitChanges,
    ) -> Result<bool, StoreError> {
        self.check(FailPoint::UpdateOrgUnit)?;
        let Some(unit) = self.org_units.get_mut(&org_unit_id) else {
            return Ok(false);
        };
        if let Some(name) = &changes.name {
            unit.name.clone_from(name);
        }
        if let Some(code) = &changes.code {
            unit.code.clone_from(code);
        }
        if let Some(parent_id) = changes.parent_id {
            unit.parent_id = parent_id;
        }
        if let Some(unit_type) = &changes.unit_type {
            unit.unit_type.clone_from(unit_type);
        }
        Ok(true)
    }

    fn update_position(
        &mut self,
        position_id: i64,
        changes: &PositionChanges,
    ) -> Result<bool, StoreError> {
        self.check(FailPoint::UpdatePosition)?;
        let Some(position) = self.positions.get_mut(&position_id) else {
            return Ok(false);
        };
        if let Some(name) = &changes.name {
            position.name.clone_from(name);
        }
        if let Some(code) = &changes.code {
            position.code.clone_from(code);
        }
        if let Some(level) = changes.level {
            position.level = level;
        }
        if let Some(grade) = &changes.grade {
            position.grade.clone_from(grade);
        }
        Ok(true)
    }
}

impl VersionStore for InMemoryStore {
    fn insert_version(
        &mut self,
        version: &NewVersion,
        now: OffsetDateTime,
    ) -> Result<i64, StoreError> {
        if self.versions.values().any(|v| {
            v.organization_id == version.organization_id
                && v.version_number == version.version_number
        }) {
            return Err(StoreError::Conflict(format!(
                "version number {} already exists for organization {}",
                version.version_number, version.organization_id
            )));
        }

        self.next_version_id += 1;
        let version_id: i64 = self.next_version_id;
        self.versions.insert(
            version_id,
            OrgStructureVersion {
                version_id,
                organization_id: version.organization_id,
                version_number: version.version_number,
                version_name: version.version_name.clone(),
                effective_date: version.effective_date,
                end_date: None,
                status: VersionStatus::Draft,
                structure: version.structure.clone(),
                structure_revision: 0,
                reassignments: Vec::new(),
                publish_status: PublishStatus::NotStarted,
                publish_progress: PublishProgress::initialized(),
                sk_number: version.sk_number.clone(),
                sk_date: version.sk_date,
                notes: version.notes.clone(),
                created_by: version.created_by.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(version_id)
    }

    fn find_version(&mut self, version_id: i64) -> Result<Option<OrgStructureVersion>, StoreError> {
        Ok(self.versions.get(&version_id).cloned())
    }

    fn list_versions(
        &mut self,
        organization_id: i64,
        status: Option<VersionStatus>,
    ) -> Result<Vec<OrgStructureVersion>, StoreError> {
        let mut versions: Vec<OrgStructureVersion> = self
            .versions
            .values()
            .filter(|v| v.organization_id == organization_id)
            .filter(|v| status.is_none_or(|wanted| wanted == v.status))
            .cloned()
            .collect();
        versions.sort_by_key(|v| v.version_number);
        Ok(versions)
    }

    fn list_versions_with_status(
        &mut self,
        statuses: &[VersionStatus],
    ) -> Result<Vec<OrgStructureVersion>, StoreError> {
        let mut versions: Vec<OrgStructureVersion> = self
            .versions
            .values()
            .filter(|v| statuses.contains(&v.status))
            .cloned()
            .collect();
        versions.sort_by_key(|v| (v.effective_date, v.version_number));
        Ok(versions)
    }

    fn max_version_number(&mut self, organization_id: i64) -> Result<Option<i32>, StoreError> {
        Ok(self
            .versions
            .values()
            .filter(|v| v.organization_id == organization_id)
            .map(|v| v.version_number)
            .max())
    }

    fn archive_active_versions(
        &mut self,
        organization_id: i64,
        keep_version_id: i64,
        end_date: Date,
        now: OffsetDateTime,
    ) -> Result<Vec<i64>, StoreError> {
        self.check(FailPoint::ArchiveVersions)?;
        let mut archived: Vec<i64> = Vec::new();
        for version in self.versions.values_mut() {
            if version.organization_id == organization_id
                && version.status == VersionStatus::Active
                && version.version_id != keep_version_id
            {
                version.status = VersionStatus::Archived;
                version.end_date = Some(end_date);
                version.updated_at = now;
                archived.push(version.version_id);
            }
        }
        Ok(archived)
    }

    fn activate_version(
        &mut self,
        version_id: i64,
        now: OffsetDateTime,
    ) -> Result<bool, StoreError> {
        self.check(FailPoint::ActivateVersion)?;
        let (organization_id, status) = {
            let version: &mut OrgStructureVersion = self.version_mut(version_id)?;
            (version.organization_id, version.status)
        };
        if status == VersionStatus::Active {
            return Ok(false);
        }
        if self.versions.values().any(|v| {
            v.organization_id == organization_id
                && v.status == VersionStatus::Active
                && v.version_id != version_id
        }) {
            return Err(StoreError::Conflict(format!(
                "organization {organization_id} already has an active version"
            )));
        }
        let version: &mut OrgStructureVersion = self.version_mut(version_id)?;
        version.status = VersionStatus::Active;
        version.updated_at = now;
        Ok(true)
    }

    fn update_draft(
        &mut self,
        version_id: i64,
        update: &VersionUpdate,
        now: OffsetDateTime,
    ) -> Result<bool, StoreError> {
        match self.versions.get_mut(&version_id) {
            Some(version) if version.status == VersionStatus::Draft => {
                update.apply_to(version);
                version.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn delete_draft(&mut self, version_id: i64) -> Result<bool, StoreError> {
        let is_draft: bool = self
            .versions
            .get(&version_id)
            .is_some_and(|v| v.status == VersionStatus::Draft);
        if is_draft {
            self.versions.remove(&version_id);
        }
        Ok(is_draft)
    }

    fn save_publish_state(
        &mut self,
        version_id: i64,
        status: PublishStatus,
        progress: &PublishProgress,
        now: OffsetDateTime,
    ) -> Result<(), StoreError> {
        self.check(FailPoint::SavePublishState)?;
        let version: &mut OrgStructureVersion = self.version_mut(version_id)?;
        version.publish_status = status;
        version.publish_progress = progress.clone();
        version.updated_at = now;
        Ok(())
    }

    fn replace_structure(
        &mut self,
        version_id: i64,
        expected_revision: i32,
        structure: &Snapshot,
        now: OffsetDateTime,
    ) -> Result<bool, StoreError> {
        self.check(FailPoint::ReplaceStructure)?;
        let racing: bool = self.failures.contains(&FailPoint::ConcurrentStructureWrite);
        let version: &mut OrgStructureVersion = self.version_mut(version_id)?;
        if racing {
            version.structure_revision += 1;
        }
        if version.structure_revision != expected_revision {
            return Ok(false);
        }
        version.structure = structure.clone();
        version.structure_revision += 1;
        version.updated_at = now;
        Ok(true)
    }
}

impl HistoryStore for InMemoryStore {
    fn history_entry_exists(
        &mut self,
        employee_id: i64,
        event_type: HistoryEventType,
        version_id: i64,
    ) -> Result<bool, StoreError> {
        Ok(self.history.iter().any(|h| {
            h.employee_id == employee_id
                && h.event_type == event_type
                && h.details.version_id == version_id
        }))
    }

    fn insert_history_entry_if_absent(
        &mut self,
        entry: &NewHistoryEntry,
        now: OffsetDateTime,
    ) -> Result<bool, StoreError> {
        self.check(FailPoint::HistoryInsert(entry.employee_id))?;
        if self.history_entry_exists(entry.employee_id, entry.event_type, entry.details.version_id)?
        {
            return Ok(false);
        }
        self.next_history_id += 1;
        self.history.push(EmployeeHistoryEntry {
            history_id: self.next_history_id,
            employee_id: entry.employee_id,
            event_type: entry.event_type,
            event_date: entry.event_date,
            previous_org_unit_id: entry.previous_org_unit_id,
            previous_position_id: entry.previous_position_id,
            new_org_unit_id: entry.new_org_unit_id,
            new_position_id: entry.new_position_id,
            details: entry.details.clone(),
            created_at: now,
        });
        Ok(true)
    }

    fn count_history_for_version(&mut self, version_id: i64) -> Result<usize, StoreError> {
        Ok(self
            .history
            .iter()
            .filter(|h| h.details.version_id == version_id)
            .count())
    }

    fn list_history_for_employee(
        &mut self,
        employee_id: i64,
    ) -> Result<Vec<EmployeeHistoryEntry>, StoreError> {
        Ok(self
            .history
            .iter()
            .filter(|h| h.employee_id == employee_id)
            .cloned()
            .collect())
    }
}

impl AuditSink for InMemoryStore {
    fn record_audit_entry(&mut self, entry: &AuditEntry) -> Result<i64, StoreError> {
        self.check(FailPoint::AuditInsert)?;
        self.audit.push(entry.clone());
        i64::try_from(self.audit.len()).map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn audit_entries_for_version(
        &mut self,
        version_id: i64,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        Ok(self
            .audit
            .iter()
            .filter(|a| a.version_id == version_id)
            .cloned()
            .collect())
    }
}
