// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Collaborator trait implementations over the `SQLite` connection.
//!
//! Each method is a thin adapter: call the query or mutation, then let `?`
//! turn the `PersistenceError` into the engine's `StoreError`.

use orgstruct::{AuditSink, DirectoryStore, HistoryStore, StoreError, VersionStore};
use orgstruct_audit::AuditEntry;
use orgstruct_domain::{
    Employee, EmployeeHistoryEntry, EmploymentStatus, HistoryEventType, NewHistoryEntry,
    NewVersion, OrgStructureVersion, OrgUnit, OrgUnitChanges, Position, PositionChanges,
    PublishProgress, PublishStatus, Snapshot, VersionStatus, VersionUpdate,
};
use time::{Date, OffsetDateTime};

use crate::Persistence;
use crate::{mutations, queries};

impl DirectoryStore for Persistence {
    fn list_org_units(&mut self, organization_id: i64) -> Result<Vec<OrgUnit>, StoreError> {
        Ok(queries::directory::list_org_units(&mut self.conn, organization_id)?)
    }

    fn list_positions(&mut self, organization_id: i64) -> Result<Vec<Position>, StoreError> {
        Ok(queries::directory::list_positions(&mut self.conn, organization_id)?)
    }

    fn list_employees(
        &mut self,
        organization_id: i64,
        statuses: &[EmploymentStatus],
    ) -> Result<Vec<Employee>, StoreError> {
        Ok(queries::directory::list_employees(
            &mut self.conn,
            organization_id,
            statuses,
        )?)
    }

    fn find_employee(&mut self, identity_id: i64) -> Result<Option<Employee>, StoreError> {
        Ok(queries::directory::find_employee(&mut self.conn, identity_id)?)
    }

    fn find_employee_by_number(
        &mut self,
        organization_id: i64,
        employee_number: &str,
    ) -> Result<Option<Employee>, StoreError> {
        Ok(queries::directory::find_employee_by_number(
            &mut self.conn,
            organization_id,
            employee_number,
        )?)
    }

    fn update_employee_assignment(
        &mut self,
        identity_id: i64,
        org_unit_id: Option<i64>,
        position_id: Option<i64>,
    ) -> Result<bool, StoreError> {
        Ok(mutations::directory::update_employee_assignment(
            &mut self.conn,
            identity_id,
            org_unit_id,
            position_id,
        )?)
    }

    fn update_org_unit(
        &mut self,
        org_unit_id: i64,
        changes: &OrgUnitChanges,
    ) -> Result<bool, StoreError> {
        Ok(mutations::directory::update_org_unit(
            &mut self.conn,
            org_unit_id,
            changes,
        )?)
    }

    fn update_position(
        &mut self,
        position_id: i64,
        changes: &PositionChanges,
    ) -> Result<bool, StoreError> {
        Ok(mutations::directory::update_position(
            &mut self.conn,
            position_id,
            changes,
        )?)
    }
}

impl VersionStore for Persistence {
    fn insert_version(
        &mut self,
        version: &NewVersion,
        now: OffsetDateTime,
    ) -> Result<i64, StoreError> {
        Ok(mutations::versions::insert_version(
            &mut self.conn,
            version,
            now,
        )?)
    }

    fn find_version(&mut self, version_id: i64) -> Result<Option<OrgStructureVersion>, StoreError> {
        Ok(queries::versions::find_version(&mut self.conn, version_id)?)
    }

    fn list_versions(
        &mut self,
        organization_id: i64,
        status: Option<VersionStatus>,
    ) -> Result<Vec<OrgStructureVersion>, StoreError> {
        Ok(queries::versions::list_versions(
            &mut self.conn,
            organization_id,
            status,
        )?)
    }

    fn list_versions_with_status(
        &mut self,
        statuses: &[VersionStatus],
    ) -> Result<Vec<OrgStructureVersion>, StoreError> {
        Ok(queries::versions::list_versions_with_status(
            &mut self.conn,
            statuses,
        )?)
    }

    fn max_version_number(&mut self, organization_id: i64) -> Result<Option<i32>, StoreError> {
        Ok(queries::versions::max_version_number(
            &mut self.conn,
            organization_id,
        )?)
    }

    fn archive_active_versions(
        &mut self,
        organization_id: i64,
        keep_version_id: i64,
        end_date: Date,
        now: OffsetDateTime,
    ) -> Result<Vec<i64>, StoreError> {
        Ok(mutations::versions::archive_active_versions(
            &mut self.conn,
            organization_id,
            keep_version_id,
            end_date,
            now,
        )?)
    }

    fn activate_version(
        &mut self,
        version_id: i64,
        now: OffsetDateTime,
    ) -> Result<bool, StoreError> {
        Ok(mutations::versions::activate_version(
            &mut self.conn,
            version_id,
            now,
        )?)
    }

    fn update_draft(
        &mut self,
        version_id: i64,
        update: &VersionUpdate,
        now: OffsetDateTime,
    ) -> Result<bool, StoreError> {
        Ok(mutations::versions::update_draft(
            &mut self.conn,
            version_id,
            update,
            now,
        )?)
    }

    fn delete_draft(&mut self, version_id: i64) -> Result<bool, StoreError> {
        Ok(mutations::versions::delete_draft(&mut self.conn, version_id)?)
    }

    fn save_publish_state(
        &mut self,
        version_id: i64,
        status: PublishStatus,
        progress: &PublishProgress,
        now: OffsetDateTime,
    ) -> Result<(), StoreError> {
        Ok(mutations::versions::save_publish_state(
            &mut self.conn,
            version_id,
            status,
            progress,
            now,
        )?)
    }

    fn replace_structure(
        &mut self,
        version_id: i64,
        expected_revision: i32,
        structure: &Snapshot,
        now: OffsetDateTime,
    ) -> Result<bool, StoreError> {
        Ok(mutations::versions::replace_structure(
            &mut self.conn,
            version_id,
            expected_revision,
            structure,
            now,
        )?)
    }
}

impl HistoryStore for Persistence {
    fn history_entry_exists(
        &mut self,
        employee_id: i64,
        event_type: HistoryEventType,
        version_id: i64,
    ) -> Result<bool, StoreError> {
        Ok(queries::history::history_entry_exists(
            &mut self.conn,
            employee_id,
            event_type,
            version_id,
        )?)
    }

    fn insert_history_entry_if_absent(
        &mut self,
        entry: &NewHistoryEntry,
        now: OffsetDateTime,
    ) -> Result<bool, StoreError> {
        Ok(mutations::history::insert_history_entry_if_absent(
            &mut self.conn,
            entry,
            now,
        )?)
    }

    fn count_history_for_version(&mut self, version_id: i64) -> Result<usize, StoreError> {
        Ok(queries::history::count_history_for_version(
            &mut self.conn,
            version_id,
        )?)
    }

    fn list_history_for_employee(
        &mut self,
        employee_id: i64,
    ) -> Result<Vec<EmployeeHistoryEntry>, StoreError> {
        Ok(queries::history::list_history_for_employee(
            &mut self.conn,
            employee_id,
        )?)
    }
}

impl AuditSink for Persistence {
    fn record_audit_entry(&mut self, entry: &AuditEntry) -> Result<i64, StoreError> {
        Ok(mutations::audit::insert_audit_entry(&mut self.conn, entry)?)
    }

    fn audit_entries_for_version(
        &mut self,
        version_id: i64,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        Ok(queries::audit::audit_entries_for_version(
            &mut self.conn,
            version_id,
        )?)
    }
}
