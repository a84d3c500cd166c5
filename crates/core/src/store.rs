// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Collaborator interfaces the versioning components are written against.
//!
//! Every write here is atomic on a single record. Components never assume
//! two writes commit together; conditional writes report whether anything
//! changed so callers can tell a no-op from a real update.

use crate::error::StoreError;
use orgstruct_audit::AuditEntry;
use orgstruct_domain::{
    Employee, EmployeeHistoryEntry, EmploymentStatus, HistoryEventType, NewHistoryEntry,
    NewVersion, OrgStructureVersion, OrgUnit, OrgUnitChanges, Position, PositionChanges,
    PublishProgress, PublishStatus, Snapshot, VersionStatus, VersionUpdate,
};
use time::{Date, OffsetDateTime};

/// Live organizational data.
pub trait DirectoryStore {
    /// All org units of an organization, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn list_org_units(&mut self, organization_id: i64) -> Result<Vec<OrgUnit>, StoreError>;

    /// All positions of an organization, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn list_positions(&mut self, organization_id: i64) -> Result<Vec<Position>, StoreError>;

    /// Employees of an organization whose status is one of `statuses`,
    /// ordered by identity id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn list_employees(
        &mut self,
        organization_id: i64,
        statuses: &[EmploymentStatus],
    ) -> Result<Vec<Employee>, StoreError>;

    /// Point lookup by identity id, regardless of status or organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn find_employee(&mut self, identity_id: i64) -> Result<Option<Employee>, StoreError>;

    /// Point lookup by employee number within an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn find_employee_by_number(
        &mut self,
        organization_id: i64,
        employee_number: &str,
    ) -> Result<Option<Employee>, StoreError>;

    /// Sets an employee's org unit and position, but only if at least one of
    /// them differs from the stored values.
    ///
    /// Returns `true` if a write happened.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn update_employee_assignment(
        &mut self,
        identity_id: i64,
        org_unit_id: Option<i64>,
        position_id: Option<i64>,
    ) -> Result<bool, StoreError>;

    /// Applies field changes to a live org unit.
    ///
    /// Returns `false` if the unit does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn update_org_unit(
        &mut self,
        org_unit_id: i64,
        changes: &OrgUnitChanges,
    ) -> Result<bool, StoreError>;

    /// Applies field changes to a live position.
    ///
    /// Returns `false` if the position does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn update_position(
        &mut self,
        position_id: i64,
        changes: &PositionChanges,
    ) -> Result<bool, StoreError>;
}

/// Persisted organizational-structure versions.
pub trait VersionStore {
    /// Inserts a new draft with `PublishProgress::initialized()` and
    /// `publish_status = not_started`, returning its id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the version number is already taken
    /// for the organization.
    fn insert_version(
        &mut self,
        version: &NewVersion,
        now: OffsetDateTime,
    ) -> Result<i64, StoreError>;

    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn find_version(&mut self, version_id: i64) -> Result<Option<OrgStructureVersion>, StoreError>;

    /// Versions of one organization ordered by version number, optionally
    /// restricted to one status.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn list_versions(
        &mut self,
        organization_id: i64,
        status: Option<VersionStatus>,
    ) -> Result<Vec<OrgStructureVersion>, StoreError>;

    /// Versions of every organization whose status is one of `statuses`,
    /// ordered by effective date then version number.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn list_versions_with_status(
        &mut self,
        statuses: &[VersionStatus],
    ) -> Result<Vec<OrgStructureVersion>, StoreError>;

    /// Highest version number used by an organization, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn max_version_number(&mut self, organization_id: i64) -> Result<Option<i32>, StoreError>;

    /// Archives every `active` version of the organization except
    /// `keep_version_id`, setting `end_date`. Returns the archived ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn archive_active_versions(
        &mut self,
        organization_id: i64,
        keep_version_id: i64,
        end_date: Date,
        now: OffsetDateTime,
    ) -> Result<Vec<i64>, StoreError>;

    /// Sets `status = active` where the version is not already active.
    ///
    /// Returns `true` if a write happened.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if another version of the organization
    /// is already active.
    fn activate_version(&mut self, version_id: i64, now: OffsetDateTime)
    -> Result<bool, StoreError>;

    /// Applies `update` where the version is still a draft.
    ///
    /// Returns `false` if the version is absent or no longer a draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn update_draft(
        &mut self,
        version_id: i64,
        update: &VersionUpdate,
        now: OffsetDateTime,
    ) -> Result<bool, StoreError>;

    /// Deletes the version where it is still a draft.
    ///
    /// Returns `false` if the version is absent or no longer a draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn delete_draft(&mut self, version_id: i64) -> Result<bool, StoreError>;

    /// Records publish status and progress.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the version does not exist.
    fn save_publish_state(
        &mut self,
        version_id: i64,
        status: PublishStatus,
        progress: &PublishProgress,
        now: OffsetDateTime,
    ) -> Result<(), StoreError>;

    /// Replaces the snapshot if `structure_revision` still equals
    /// `expected_revision`, incrementing the revision.
    ///
    /// Returns `false` when the revision has moved on.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn replace_structure(
        &mut self,
        version_id: i64,
        expected_revision: i32,
        structure: &Snapshot,
        now: OffsetDateTime,
    ) -> Result<bool, StoreError>;
}

/// Append-only employee history.
pub trait HistoryStore {
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn history_entry_exists(
        &mut self,
        employee_id: i64,
        event_type: HistoryEventType,
        version_id: i64,
    ) -> Result<bool, StoreError>;

    /// Inserts unless an entry with the same
    /// `(employee_id, event_type, version_id)` exists.
    ///
    /// Returns `true` if a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn insert_history_entry_if_absent(
        &mut self,
        entry: &NewHistoryEntry,
        now: OffsetDateTime,
    ) -> Result<bool, StoreError>;

    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn count_history_for_version(&mut self, version_id: i64) -> Result<usize, StoreError>;

    /// History of one employee, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn list_history_for_employee(
        &mut self,
        employee_id: i64,
    ) -> Result<Vec<EmployeeHistoryEntry>, StoreError>;
}

/// Append-only audit log.
pub trait AuditSink {
    /// Appends an entry and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn record_audit_entry(&mut self, entry: &AuditEntry) -> Result<i64, StoreError>;

    /// Entries recorded against a version, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn audit_entries_for_version(&mut self, version_id: i64)
    -> Result<Vec<AuditEntry>, StoreError>;
}

/// Everything the versioning engine needs from one backend.
pub trait Store: DirectoryStore + VersionStore + HistoryStore + AuditSink {}

impl<T: DirectoryStore + VersionStore + HistoryStore + AuditSink> Store for T {}
