// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::VersionError;
use crate::store::DirectoryStore;
use orgstruct_domain::{
    Employee, EmploymentStatus, OrgUnit, Position, Snapshot, SnapshotEmployee, SnapshotOrgUnit,
    SnapshotPosition, validate_snapshot,
};
use serde::Serialize;
use std::collections::HashMap;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

/// An employee left out of a snapshot because resolving them failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEmployee {
    pub identity_id: i64,
    pub employee_number: String,
    pub reason: String,
}

/// Result of building a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotBuild {
    pub snapshot: Snapshot,
    pub skipped_employees: Vec<SkippedEmployee>,
    /// Advisory validation findings. Never block anything.
    pub warnings: Vec<String>,
}

/// Captures a denormalized snapshot of one organization's live structure.
pub struct SnapshotBuilder<'a, S> {
    store: &'a mut S,
    now: OffsetDateTime,
}

impl<'a, S: DirectoryStore> SnapshotBuilder<'a, S> {
    /// Creates a builder that stamps snapshots with the current time.
    pub fn new(store: &'a mut S) -> Self {
        Self::at(store, OffsetDateTime::now_utc())
    }

    /// Creates a builder that stamps snapshots with `now`.
    pub const fn at(store: &'a mut S, now: OffsetDateTime) -> Self {
        Self { store, now }
    }

    /// Builds a snapshot of `organization_id`.
    ///
    /// Only `active` and `probation` employees are captured. Org unit,
    /// position and manager are resolved among the fetched records; a
    /// manager outside that set costs one point lookup. Unresolvable
    /// references keep their id with empty display fields. An employee
    /// whose manager lookup fails is skipped and reported.
    ///
    /// # Errors
    ///
    /// Returns an error if the org units, positions or employees of the
    /// organization cannot be listed.
    pub fn build(&mut self, organization_id: i64) -> Result<SnapshotBuild, VersionError> {
        let units: Vec<OrgUnit> = self.store.list_org_units(organization_id)?;
        let positions: Vec<Position> = self.store.list_positions(organization_id)?;
        let employees: Vec<Employee> = self
            .store
            .list_employees(organization_id, &EmploymentStatus::SNAPSHOT_ELIGIBLE)?;

        let units_by_id: HashMap<i64, &OrgUnit> =
            units.iter().map(|u| (u.org_unit_id, u)).collect();
        let positions_by_id: HashMap<i64, &Position> =
            positions.iter().map(|p| (p.position_id, p)).collect();
        let names_by_id: HashMap<i64, &str> = employees
            .iter()
            .map(|e| (e.identity_id, e.full_name.as_str()))
            .collect();

        let mut snapshot: Snapshot = Snapshot::empty(organization_id, self.now);
        snapshot.org_units = units.iter().map(SnapshotOrgUnit::from).collect();
        snapshot.positions = positions.iter().map(SnapshotPosition::from).collect();

        let mut skipped_employees: Vec<SkippedEmployee> = Vec::new();
        for employee in &employees {
            let manager_name: Option<String> = match employee.manager_id {
                None => None,
                Some(manager_id) => {
                    if let Some(name) = names_by_id.get(&manager_id) {
                        Some((*name).to_string())
                    } else {
                        match self.store.find_employee(manager_id) {
                            Ok(manager) => manager.map(|m| m.full_name),
                            Err(e) => {
                                warn!(
                                    identity_id = employee.identity_id,
                                    manager_id,
                                    error = %e,
                                    "Skipping employee, manager lookup failed"
                                );
                                skipped_employees.push(SkippedEmployee {
                                    identity_id: employee.identity_id,
                                    employee_number: employee.employee_number.clone(),
                                    reason: e.to_string(),
                                });
                                continue;
                            }
                        }
                    }
                }
            };

            snapshot.employees.push(SnapshotEmployee::resolve(
                employee,
                &units_by_id,
                &positions_by_id,
                manager_name,
                self.now,
            ));
        }

        let warnings: Vec<String> = validate_snapshot(&snapshot);
        for warning in &warnings {
            warn!(organization_id, warning = %warning, "Snapshot validation warning");
        }

        debug!(
            organization_id,
            org_units = snapshot.org_units.len(),
            positions = snapshot.positions.len(),
            "Resolved snapshot reference data"
        );
        info!(
            organization_id,
            employees = snapshot.employees.len(),
            skipped = skipped_employees.len(),
            warnings = warnings.len(),
            "Built organization snapshot"
        );

        Ok(SnapshotBuild {
            snapshot,
            skipped_employees,
            warnings,
        })
    }
}
