// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Detection and repair of defects in stored snapshots.
//!
//! Corrections rewrite the snapshot as a whole, locating entries by
//! identifier. Snapshot writes are compare-and-set on the version's
//! `structure_revision`. Each correction appends an audit entry; a failed
//! audit write is logged and does not undo the correction.

use crate::error::VersionError;
use crate::store::{AuditSink, DirectoryStore, VersionStore};
use orgstruct_audit::{Actor, AuditEntry, EntityType, FieldChange};
use orgstruct_domain::{
    DomainError, EmploymentStatus, InconsistencyIssue, InconsistencyKind, OrgStructureVersion,
    OrgUnitChanges, PositionChanges, Snapshot, SnapshotEmployee, SnapshotOrgUnit,
    SnapshotPosition, detect_inconsistencies,
};
use serde::Serialize;
use std::collections::HashSet;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

/// Field patches for one snapshot employee. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeCorrection {
    pub full_name: Option<String>,
    pub email: Option<String>,
    /// Must name an org unit of the same snapshot.
    pub org_unit_id: Option<i64>,
    /// Must name a position of the same snapshot.
    pub position_id: Option<i64>,
    pub manager_id: Option<i64>,
    pub employment_status: Option<EmploymentStatus>,
    pub work_location: Option<String>,
}

/// Result of a snapshot correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrectionReport {
    pub version_id: i64,
    /// Revision of the snapshot after the write.
    pub structure_revision: i32,
    pub corrections: Vec<FieldChange>,
    /// Snapshot employees whose denormalized fields were rewritten.
    pub employees_updated: usize,
    /// Whether the live record was updated too. Always `false` for
    /// snapshot-only corrections.
    pub live_updated: bool,
}

/// Finds and repairs snapshot defects.
pub struct Corrector<'a, S> {
    store: &'a mut S,
    actor: Actor,
    now: OffsetDateTime,
}

impl<'a, S: DirectoryStore + VersionStore + AuditSink> Corrector<'a, S> {
    /// Creates a corrector acting as the system actor.
    pub fn new(store: &'a mut S) -> Self {
        Self::at(store, OffsetDateTime::now_utc())
    }

    pub fn at(store: &'a mut S, now: OffsetDateTime) -> Self {
        Self {
            store,
            actor: Actor::system(),
            now,
        }
    }

    /// Attributes subsequent audit entries to `actor`.
    #[must_use]
    pub fn acting_as(mut self, actor: Actor) -> Self {
        self.actor = actor;
        self
    }

    /// Reports every defect of a version's snapshot. Nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the version does not exist.
    pub fn detect_inconsistencies(
        &mut self,
        version_id: i64,
    ) -> Result<Vec<InconsistencyIssue>, VersionError> {
        let version: OrgStructureVersion = self.load(version_id)?;
        let issues: Vec<InconsistencyIssue> = detect_inconsistencies(&version.structure);
        info!(version_id, issues = issues.len(), "Checked snapshot consistency");
        Ok(issues)
    }

    /// Removes orphaned employees from the snapshot and returns how many
    /// were removed. Other defect kinds are left for manual correction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the version does not exist and
    /// `ConcurrentModification` if the snapshot changed meanwhile.
    pub fn auto_fix_inconsistencies(&mut self, version_id: i64) -> Result<usize, VersionError> {
        let version: OrgStructureVersion = self.load(version_id)?;
        let orphans: HashSet<i64> = detect_inconsistencies(&version.structure)
            .into_iter()
            .filter(|issue| issue.kind == InconsistencyKind::OrphanedEmployee)
            .filter_map(|issue| issue.employee_id)
            .collect();
        if orphans.is_empty() {
            debug!(version_id, "No auto-fixable inconsistencies");
            return Ok(0);
        }

        let mut structure: Snapshot = version.structure.clone();
        let removed: Vec<SnapshotEmployee> =
            structure.remove_employees(|e| orphans.contains(&e.identity_id));
        self.write_structure(&version, &structure)?;

        let corrections: Vec<FieldChange> = removed
            .iter()
            .map(|e| FieldChange::new("employee", Some(e.employee_number.clone()), None))
            .collect();
        info!(version_id, removed = removed.len(), "Removed orphaned employees");
        self.audit(
            "auto_fix_inconsistencies",
            EntityType::VersionSnapshot,
            version_id,
            version_id,
            corrections,
        );
        Ok(removed.len())
    }

    /// Patches one employee inside a version's snapshot. Live data is not
    /// touched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the version or employee does not exist, a
    /// domain error if a new org unit or position is not in the snapshot,
    /// and `ConcurrentModification` if the snapshot changed meanwhile.
    pub fn correct_employee_in_snapshot(
        &mut self,
        version_id: i64,
        identity_id: i64,
        correction: &EmployeeCorrection,
    ) -> Result<CorrectionReport, VersionError> {
        let version: OrgStructureVersion = self.load(version_id)?;
        let mut structure: Snapshot = version.structure.clone();
        let before: SnapshotEmployee = structure
            .find_employee(identity_id)
            .cloned()
            .ok_or_else(|| VersionError::NotFound {
                entity: "snapshot employee",
                id: identity_id.to_string(),
            })?;

        let mut after: SnapshotEmployee = before.clone();
        if let Some(name) = &correction.full_name {
            after.full_name.clone_from(name);
        }
        if let Some(email) = &correction.email {
            after.email = Some(email.clone());
        }
        if let Some(work_location) = &correction.work_location {
            after.work_location = Some(work_location.clone());
        }
        if let Some(status) = correction.employment_status {
            after.employment_status = status;
        }
        if let Some(unit_id) = correction.org_unit_id {
            let unit: &SnapshotOrgUnit = structure
                .find_org_unit(unit_id)
                .ok_or(DomainError::OrgUnitNotInSnapshot(unit_id))?;
            after.org_unit_id = Some(unit.id);
            after.org_unit_code.clone_from(&unit.code);
            after.org_unit_name.clone_from(&unit.name);
        }
        if let Some(position_id) = correction.position_id {
            let position: &SnapshotPosition = structure
                .find_position(position_id)
                .ok_or(DomainError::PositionNotInSnapshot(position_id))?;
            after.position_id = Some(position.id);
            after.position_code.clone_from(&position.code);
            after.position_name.clone_from(&position.name);
        }
        if let Some(manager_id) = correction.manager_id {
            after.manager_id = Some(manager_id);
            after.manager_name = structure.find_employee(manager_id).map(|m| m.full_name.clone());
        }

        let corrections: Vec<FieldChange> = employee_changes(&before, &after);
        if corrections.is_empty() {
            return Err(VersionError::InvalidState(format!(
                "correction of employee {identity_id} in version {version_id} changes nothing"
            )));
        }

        structure.replace_employee(after);
        let structure_revision: i32 = self.write_structure(&version, &structure)?;
        info!(
            version_id,
            identity_id,
            fields = corrections.len(),
            "Corrected snapshot employee"
        );
        self.audit(
            "correct_employee_in_snapshot",
            EntityType::SnapshotEmployee,
            identity_id,
            version_id,
            corrections.clone(),
        );

        Ok(CorrectionReport {
            version_id,
            structure_revision,
            corrections,
            employees_updated: 1,
            live_updated: false,
        })
    }

    /// Applies org unit changes to a version's snapshot and to the live
    /// unit, cascading name and code into snapshot employees.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the changes are empty or the new parent
    /// would close a cycle, a domain error if the unit or new parent is not
    /// in the snapshot, `ConcurrentModification` if the snapshot changed
    /// meanwhile, and a store error if the live write fails.
    pub fn sync_org_unit_changes(
        &mut self,
        version_id: i64,
        org_unit_id: i64,
        changes: &OrgUnitChanges,
    ) -> Result<CorrectionReport, VersionError> {
        if changes.is_empty() {
            return Err(VersionError::InvalidState(String::from(
                "no org unit changes given",
            )));
        }
        let version: OrgStructureVersion = self.load(version_id)?;
        let mut structure: Snapshot = version.structure.clone();
        let before: SnapshotOrgUnit = structure
            .find_org_unit(org_unit_id)
            .cloned()
            .ok_or(DomainError::OrgUnitNotInSnapshot(org_unit_id))?;

        if let Some(Some(parent_id)) = changes.parent_id {
            if structure.find_org_unit(parent_id).is_none() {
                return Err(DomainError::OrgUnitNotInSnapshot(parent_id).into());
            }
            if structure.would_create_cycle(org_unit_id, parent_id) {
                let cycle: DomainError = DomainError::CircularParent {
                    org_unit_id,
                    parent_id,
                };
                return Err(VersionError::InvalidState(cycle.to_string()));
            }
        }

        let mut after: SnapshotOrgUnit = before.clone();
        if let Some(name) = &changes.name {
            after.name.clone_from(name);
        }
        if let Some(code) = &changes.code {
            after.code.clone_from(code);
        }
        if let Some(parent_id) = changes.parent_id {
            after.parent_id = parent_id;
        }
        if let Some(unit_type) = &changes.unit_type {
            after.unit_type.clone_from(unit_type);
        }

        let corrections: Vec<FieldChange> = [
            FieldChange::between("name", Some(&before.name), Some(&after.name)),
            FieldChange::between("code", Some(&before.code), Some(&after.code)),
            FieldChange::between("parent_id", before.parent_id.as_ref(), after.parent_id.as_ref()),
            FieldChange::between("unit_type", Some(&before.unit_type), Some(&after.unit_type)),
        ]
        .into_iter()
        .flatten()
        .collect();

        structure.org_units = structure
            .org_units
            .into_iter()
            .map(|unit| if unit.id == org_unit_id { after.clone() } else { unit })
            .collect();

        let mut employees_updated: usize = 0;
        if changes.affects_employees() {
            for employee in &mut structure.employees {
                if employee.org_unit_id == Some(org_unit_id) {
                    employee.org_unit_code.clone_from(&after.code);
                    employee.org_unit_name.clone_from(&after.name);
                    employees_updated += 1;
                }
            }
        }

        let structure_revision: i32 = self.write_structure(&version, &structure)?;
        // The snapshot is already rewritten, so its audit entry is owed even
        // when the live write fails.
        let live_updated: bool = match self.store.update_org_unit(org_unit_id, changes) {
            Ok(updated) => updated,
            Err(err) => {
                error!(
                    org_unit_id,
                    error = %err,
                    "Live org unit write failed after snapshot correction"
                );
                self.audit(
                    "sync_org_unit_changes",
                    EntityType::OrgUnit,
                    org_unit_id,
                    version_id,
                    corrections,
                );
                return Err(err.into());
            }
        };
        if !live_updated {
            warn!(org_unit_id, "Live org unit not found, snapshot corrected only");
        }
        info!(
            version_id,
            org_unit_id,
            employees_updated,
            live_updated,
            "Synced org unit changes"
        );
        self.audit(
            "sync_org_unit_changes",
            EntityType::OrgUnit,
            org_unit_id,
            version_id,
            corrections.clone(),
        );

        Ok(CorrectionReport {
            version_id,
            structure_revision,
            corrections,
            employees_updated,
            live_updated,
        })
    }

    /// Applies position changes to a version's snapshot and to the live
    /// position, cascading name and code into snapshot employees.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` if the changes are empty, a domain error if
    /// the position is not in the snapshot, `ConcurrentModification` if the
    /// snapshot changed meanwhile, and a store error if the live write
    /// fails.
    pub fn sync_position_changes(
        &mut self,
        version_id: i64,
        position_id: i64,
        changes: &PositionChanges,
    ) -> Result<CorrectionReport, VersionError> {
        if changes.is_empty() {
            return Err(VersionError::InvalidState(String::from(
                "no position changes given",
            )));
        }
        let version: OrgStructureVersion = self.load(version_id)?;
        let mut structure: Snapshot = version.structure.clone();
        let before: SnapshotPosition = structure
            .find_position(position_id)
            .cloned()
            .ok_or(DomainError::PositionNotInSnapshot(position_id))?;

        let mut after: SnapshotPosition = before.clone();
        if let Some(name) = &changes.name {
            after.name.clone_from(name);
        }
        if let Some(code) = &changes.code {
            after.code.clone_from(code);
        }
        if let Some(level) = changes.level {
            after.level = level;
        }
        if let Some(grade) = &changes.grade {
            after.grade.clone_from(grade);
        }

        let corrections: Vec<FieldChange> = [
            FieldChange::between("name", Some(&before.name), Some(&after.name)),
            FieldChange::between("code", Some(&before.code), Some(&after.code)),
            FieldChange::between("level", Some(&before.level), Some(&after.level)),
            FieldChange::between("grade", Some(&before.grade), Some(&after.grade)),
        ]
        .into_iter()
        .flatten()
        .collect();

        structure.positions = structure
            .positions
            .into_iter()
            .map(|p| if p.id == position_id { after.clone() } else { p })
            .collect();

        let mut employees_updated: usize = 0;
        if changes.affects_employees() {
            for employee in &mut structure.employees {
                if employee.position_id == Some(position_id) {
                    employee.position_code.clone_from(&after.code);
                    employee.position_name.clone_from(&after.name);
                    employees_updated += 1;
                }
            }
        }

        let structure_revision: i32 = self.write_structure(&version, &structure)?;
        // The snapshot is already rewritten, so its audit entry is owed even
        // when the live write fails.
        let live_updated: bool = match self.store.update_position(position_id, changes) {
            Ok(updated) => updated,
            Err(err) => {
                error!(
                    position_id,
                    error = %err,
                    "Live position write failed after snapshot correction"
                );
                self.audit(
                    "sync_position_changes",
                    EntityType::Position,
                    position_id,
                    version_id,
                    corrections,
                );
                return Err(err.into());
            }
        };
        if !live_updated {
            warn!(position_id, "Live position not found, snapshot corrected only");
        }
        info!(
            version_id,
            position_id,
            employees_updated,
            live_updated,
            "Synced position changes"
        );
        self.audit(
            "sync_position_changes",
            EntityType::Position,
            position_id,
            version_id,
            corrections.clone(),
        );

        Ok(CorrectionReport {
            version_id,
            structure_revision,
            corrections,
            employees_updated,
            live_updated,
        })
    }

    fn load(&mut self, version_id: i64) -> Result<OrgStructureVersion, VersionError> {
        self.store
            .find_version(version_id)?
            .ok_or_else(|| VersionError::version_not_found(version_id))
    }

    /// Compare-and-set write; returns the new revision.
    fn write_structure(
        &mut self,
        version: &OrgStructureVersion,
        structure: &Snapshot,
    ) -> Result<i32, VersionError> {
        if !self.store.replace_structure(
            version.version_id,
            version.structure_revision,
            structure,
            self.now,
        )? {
            warn!(
                version_id = version.version_id,
                expected_revision = version.structure_revision,
                "Snapshot write lost a concurrent update"
            );
            return Err(VersionError::ConcurrentModification {
                version_id: version.version_id,
                expected_revision: version.structure_revision,
            });
        }
        Ok(version.structure_revision + 1)
    }

    fn audit(
        &mut self,
        operation: &str,
        entity_type: EntityType,
        entity_id: i64,
        version_id: i64,
        corrections: Vec<FieldChange>,
    ) {
        let entry: AuditEntry = AuditEntry::version_correction(
            self.actor.clone(),
            operation,
            entity_type,
            entity_id,
            version_id,
            corrections,
            self.now,
        );
        if let Err(e) = self.store.record_audit_entry(&entry) {
            warn!(version_id, operation, error = %e, "Failed to record audit entry");
        }
    }
}

fn employee_changes(before: &SnapshotEmployee, after: &SnapshotEmployee) -> Vec<FieldChange> {
    [
        FieldChange::between("full_name", Some(&before.full_name), Some(&after.full_name)),
        FieldChange::between("email", before.email.as_ref(), after.email.as_ref()),
        FieldChange::between(
            "org_unit_id",
            before.org_unit_id.as_ref(),
            after.org_unit_id.as_ref(),
        ),
        FieldChange::between(
            "position_id",
            before.position_id.as_ref(),
            after.position_id.as_ref(),
        ),
        FieldChange::between("manager_id", before.manager_id.as_ref(), after.manager_id.as_ref()),
        FieldChange::between(
            "employment_status",
            Some(&before.employment_status),
            Some(&after.employment_status),
        ),
        FieldChange::between(
            "work_location",
            before.work_location.as_ref(),
            after.work_location.as_ref(),
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}
