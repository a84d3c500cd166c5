// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::VersionError;
use crate::query::QueryHelper;
use crate::snapshot_builder::{SnapshotBuild, SnapshotBuilder};
use crate::store::{DirectoryStore, VersionStore};
use orgstruct_domain::{
    DomainError, NewVersion, OrgStructureVersion, Reassignment, Snapshot, SnapshotEmployee,
    VersionStatus, VersionUpdate,
};
use serde::Serialize;
use time::{Date, OffsetDateTime};
use tracing::info;

/// Input for [`VersionManager::create_version`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVersionRequest {
    pub organization_id: i64,
    pub version_name: String,
    pub effective_date: Date,
    pub notes: Option<String>,
    pub sk_number: Option<String>,
    pub sk_date: Option<Date>,
    pub created_by: String,
}

/// Outcome of [`VersionManager::create_version`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionCreated {
    pub version_id: i64,
    pub version_number: i32,
    pub employee_count: usize,
    /// Snapshot validation warnings and skipped-employee notices.
    pub warnings: Vec<String>,
}

/// A proposed move for one employee of a draft.
///
/// `None` keeps the employee's current org unit or position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReassignmentRequest {
    pub employee_number: String,
    pub new_org_unit_id: Option<i64>,
    pub new_position_id: Option<i64>,
    pub reason: String,
}

/// Creates, edits and reads organizational-structure versions.
pub struct VersionManager<'a, S> {
    store: &'a mut S,
    now: OffsetDateTime,
}

impl<'a, S: DirectoryStore + VersionStore> VersionManager<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self::at(store, OffsetDateTime::now_utc())
    }

    pub const fn at(store: &'a mut S, now: OffsetDateTime) -> Self {
        Self { store, now }
    }

    /// Creates a draft version holding a fresh snapshot of the organization.
    ///
    /// The version number is one past the organization's highest. No other
    /// version is touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank, the live data cannot be read,
    /// or the insert is rejected.
    pub fn create_version(
        &mut self,
        request: NewVersionRequest,
    ) -> Result<VersionCreated, VersionError> {
        if request.version_name.trim().is_empty() {
            return Err(DomainError::InvalidVersionName(String::from(
                "version name must not be blank",
            ))
            .into());
        }

        let version_number: i32 = self
            .store
            .max_version_number(request.organization_id)?
            .map_or(1, |max| max + 1);

        let build: SnapshotBuild =
            SnapshotBuilder::at(&mut *self.store, self.now).build(request.organization_id)?;
        let employee_count: usize = build.snapshot.employees.len();

        let mut warnings: Vec<String> = build.warnings;
        warnings.extend(build.skipped_employees.iter().map(|s| {
            format!(
                "Employee {} was left out of the snapshot: {}",
                s.employee_number, s.reason
            )
        }));

        let version_id: i64 = self.store.insert_version(
            &NewVersion {
                organization_id: request.organization_id,
                version_number,
                version_name: request.version_name,
                effective_date: request.effective_date,
                structure: build.snapshot,
                sk_number: request.sk_number,
                sk_date: request.sk_date,
                notes: request.notes,
                created_by: request.created_by,
            },
            self.now,
        )?;

        info!(
            version_id,
            organization_id = request.organization_id,
            version_number,
            employee_count,
            "Created draft version"
        );

        Ok(VersionCreated {
            version_id,
            version_number,
            employee_count,
            warnings,
        })
    }

    /// Edits a draft.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the version does not exist and `InvalidState`
    /// unless it is a draft.
    pub fn update_version(
        &mut self,
        version_id: i64,
        update: &VersionUpdate,
    ) -> Result<OrgStructureVersion, VersionError> {
        let version: OrgStructureVersion = self.require_draft(version_id, "edited")?;
        if update
            .version_name
            .as_ref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(DomainError::InvalidVersionName(String::from(
                "version name must not be blank",
            ))
            .into());
        }

        if !self.store.update_draft(version_id, update, self.now)? {
            return Err(not_a_draft(version_id, "edited"));
        }
        info!(version_id, version_number = version.version_number, "Updated draft version");
        self.get_version(version_id)
    }

    /// Deletes a draft.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the version does not exist and `InvalidState`
    /// unless it is a draft.
    pub fn delete_version(&mut self, version_id: i64) -> Result<(), VersionError> {
        self.require_draft(version_id, "deleted")?;
        if !self.store.delete_draft(version_id)? {
            return Err(not_a_draft(version_id, "deleted"));
        }
        info!(version_id, "Deleted draft version");
        Ok(())
    }

    /// Attaches a reassignment to a draft, replacing any earlier proposal
    /// for the same employee.
    ///
    /// Previous and new names are resolved from the draft's snapshot.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the version is absent, `InvalidState` unless it
    /// is a draft or if the move changes nothing, and a domain error if the
    /// employee or target is not part of the snapshot.
    pub fn propose_reassignment(
        &mut self,
        version_id: i64,
        request: ReassignmentRequest,
    ) -> Result<Reassignment, VersionError> {
        let version: OrgStructureVersion = self.require_draft(version_id, "edited")?;
        let reassignment: Reassignment = resolve_reassignment(&version.structure, request)?;

        let mut reassignments: Vec<Reassignment> = version
            .reassignments
            .into_iter()
            .filter(|r| r.employee_number != reassignment.employee_number)
            .collect();
        reassignments.push(reassignment.clone());

        let update: VersionUpdate = VersionUpdate {
            reassignments: Some(reassignments),
            ..VersionUpdate::default()
        };
        if !self.store.update_draft(version_id, &update, self.now)? {
            return Err(not_a_draft(version_id, "edited"));
        }

        info!(
            version_id,
            employee_number = %reassignment.employee_number,
            new_org_unit_id = ?reassignment.new_org_unit_id,
            new_position_id = ?reassignment.new_position_id,
            "Proposed reassignment"
        );
        Ok(reassignment)
    }

    /// Removes a draft's reassignment for one employee.
    ///
    /// Returns `false` if there was none.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the version is absent and `InvalidState` unless
    /// it is a draft.
    pub fn withdraw_reassignment(
        &mut self,
        version_id: i64,
        employee_number: &str,
    ) -> Result<bool, VersionError> {
        let version: OrgStructureVersion = self.require_draft(version_id, "edited")?;
        let before: usize = version.reassignments.len();
        let reassignments: Vec<Reassignment> = version
            .reassignments
            .into_iter()
            .filter(|r| r.employee_number != employee_number)
            .collect();
        if reassignments.len() == before {
            return Ok(false);
        }

        let update: VersionUpdate = VersionUpdate {
            reassignments: Some(reassignments),
            ..VersionUpdate::default()
        };
        if !self.store.update_draft(version_id, &update, self.now)? {
            return Err(not_a_draft(version_id, "edited"));
        }
        info!(version_id, employee_number, "Withdrew reassignment");
        Ok(true)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the version does not exist.
    pub fn get_version(&mut self, version_id: i64) -> Result<OrgStructureVersion, VersionError> {
        self.store
            .find_version(version_id)?
            .ok_or_else(|| VersionError::version_not_found(version_id))
    }

    /// The organization's active version, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn get_active_version(
        &mut self,
        organization_id: i64,
    ) -> Result<Option<OrgStructureVersion>, VersionError> {
        Ok(self
            .store
            .list_versions(organization_id, Some(VersionStatus::Active))?
            .into_iter()
            .next())
    }

    /// All versions of an organization, ordered by version number.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn get_all_versions(
        &mut self,
        organization_id: i64,
    ) -> Result<Vec<OrgStructureVersion>, VersionError> {
        Ok(self.store.list_versions(organization_id, None)?)
    }

    /// The stored snapshot of a version, verbatim.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the version does not exist.
    pub fn get_structure_at_version(&mut self, version_id: i64) -> Result<Snapshot, VersionError> {
        Ok(self.get_version(version_id)?.structure)
    }

    /// A fresh snapshot of the live structure. Nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the live data cannot be read.
    pub fn get_current_structure(
        &mut self,
        organization_id: i64,
    ) -> Result<Snapshot, VersionError> {
        Ok(SnapshotBuilder::at(&mut *self.store, self.now)
            .build(organization_id)?
            .snapshot)
    }

    /// The snapshot of the active version in force on `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn get_structure_at_date(
        &mut self,
        organization_id: i64,
        date: Date,
    ) -> Result<Option<Snapshot>, VersionError> {
        QueryHelper::new(&mut *self.store).get_org_structure_at(organization_id, date)
    }

    fn require_draft(
        &mut self,
        version_id: i64,
        verb: &str,
    ) -> Result<OrgStructureVersion, VersionError> {
        let version: OrgStructureVersion = self.get_version(version_id)?;
        if !version.status.is_editable() {
            return Err(VersionError::InvalidState(format!(
                "version {version_id} is {} and can no longer be {verb}",
                version.status
            )));
        }
        Ok(version)
    }
}

fn not_a_draft(version_id: i64, verb: &str) -> VersionError {
    VersionError::InvalidState(format!(
        "version {version_id} stopped being a draft and can no longer be {verb}"
    ))
}

fn resolve_reassignment(
    snapshot: &Snapshot,
    request: ReassignmentRequest,
) -> Result<Reassignment, VersionError> {
    let employee: &SnapshotEmployee = snapshot
        .find_employee_by_number(&request.employee_number)
        .ok_or_else(|| DomainError::EmployeeNotInSnapshot {
            employee_number: request.employee_number.clone(),
        })?;

    let new_org_unit_id: Option<i64> = request.new_org_unit_id.or(employee.org_unit_id);
    let new_position_id: Option<i64> = request.new_position_id.or(employee.position_id);

    let new_org_unit_name: String = match request.new_org_unit_id {
        Some(id) => snapshot
            .find_org_unit(id)
            .map(|u| u.name.clone())
            .ok_or(DomainError::OrgUnitNotInSnapshot(id))?,
        None => employee.org_unit_name.clone(),
    };
    let new_position_name: String = match request.new_position_id {
        Some(id) => snapshot
            .find_position(id)
            .map(|p| p.name.clone())
            .ok_or(DomainError::PositionNotInSnapshot(id))?,
        None => employee.position_name.clone(),
    };

    if new_org_unit_id == employee.org_unit_id && new_position_id == employee.position_id {
        return Err(VersionError::InvalidState(format!(
            "reassignment of employee {} does not change the assignment",
            request.employee_number
        )));
    }

    Ok(Reassignment {
        employee_number: request.employee_number,
        previous_org_unit_id: employee.org_unit_id,
        previous_org_unit_name: employee.org_unit_name.clone(),
        previous_position_id: employee.position_id,
        previous_position_name: employee.position_name.clone(),
        new_org_unit_id,
        new_org_unit_name,
        new_position_id,
        new_position_name,
        reason: request.reason,
        executed: false,
    })
}
