// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Frozen, denormalized point-in-time copies of the directory.
//!
//! A snapshot carries the resolved display names and codes of every
//! employee's org unit, position and manager so historical queries never
//! need to join against live data. Snapshots are persisted as arrays;
//! lookups by identifier go through maps built on demand.

use crate::directory::{Employee, OrgUnit, Position};
use crate::types::{EmploymentStatus, EmploymentType};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use time::{Date, OffsetDateTime};

/// Org unit as captured in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotOrgUnit {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub parent_id: Option<i64>,
    pub unit_type: String,
    pub level: i32,
    pub sort_order: i32,
    pub head_employee_id: Option<i64>,
}

impl From<&OrgUnit> for SnapshotOrgUnit {
    fn from(unit: &OrgUnit) -> Self {
        Self {
            id: unit.org_unit_id,
            code: unit.code.clone(),
            name: unit.name.clone(),
            parent_id: unit.parent_id,
            unit_type: unit.unit_type.clone(),
            level: unit.level,
            sort_order: unit.sort_order,
            head_employee_id: unit.head_employee_id,
        }
    }
}

/// Position as captured in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPosition {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub level: i32,
    pub grade: String,
}

impl From<&Position> for SnapshotPosition {
    fn from(position: &Position) -> Self {
        Self {
            id: position.position_id,
            code: position.code.clone(),
            name: position.name.clone(),
            level: position.level,
            grade: position.grade.clone(),
        }
    }
}

/// Employee as captured in a snapshot, with unit, position and manager
/// display fields resolved at capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEmployee {
    pub identity_id: i64,
    pub employee_number: String,
    pub full_name: String,
    pub email: Option<String>,
    pub org_unit_id: Option<i64>,
    pub org_unit_code: String,
    pub org_unit_name: String,
    pub position_id: Option<i64>,
    pub position_code: String,
    pub position_name: String,
    pub manager_id: Option<i64>,
    pub manager_name: Option<String>,
    pub employment_type: EmploymentType,
    pub employment_status: EmploymentStatus,
    pub work_location: Option<String>,
    #[serde(with = "crate::iso_date")]
    pub join_date: Date,
    #[serde(with = "time::serde::rfc3339")]
    pub snapshot_date: OffsetDateTime,
}

impl SnapshotEmployee {
    /// Resolves a live employee against already-fetched units and positions.
    ///
    /// References that cannot be resolved keep their identifier and get empty
    /// display fields; the Corrector reports them later.
    ///
    /// # Arguments
    ///
    /// * `employee` - The live employee
    /// * `units` - Org units of the organization, keyed by id
    /// * `positions` - Positions of the organization, keyed by id
    /// * `manager_name` - The manager's resolved name, if any
    /// * `snapshot_date` - Capture instant
    #[must_use]
    pub fn resolve(
        employee: &Employee,
        units: &HashMap<i64, &OrgUnit>,
        positions: &HashMap<i64, &Position>,
        manager_name: Option<String>,
        snapshot_date: OffsetDateTime,
    ) -> Self {
        let unit: Option<&&OrgUnit> = employee.org_unit_id.and_then(|id| units.get(&id));
        let position: Option<&&Position> =
            employee.position_id.and_then(|id| positions.get(&id));

        Self {
            identity_id: employee.identity_id,
            employee_number: employee.employee_number.clone(),
            full_name: employee.full_name.clone(),
            email: employee.email.clone(),
            org_unit_id: employee.org_unit_id,
            org_unit_code: unit.map(|u| u.code.clone()).unwrap_or_default(),
            org_unit_name: unit.map(|u| u.name.clone()).unwrap_or_default(),
            position_id: employee.position_id,
            position_code: position.map(|p| p.code.clone()).unwrap_or_default(),
            position_name: position.map(|p| p.name.clone()).unwrap_or_default(),
            manager_id: employee.manager_id,
            manager_name,
            employment_type: employee.employment_type,
            employment_status: employee.employment_status,
            work_location: employee.work_location.clone(),
            join_date: employee.join_date,
            snapshot_date,
        }
    }
}

/// A complete, denormalized copy of one organization's structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub organization_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub captured_at: OffsetDateTime,
    pub org_units: Vec<SnapshotOrgUnit>,
    pub positions: Vec<SnapshotPosition>,
    pub employees: Vec<SnapshotEmployee>,
}

impl Snapshot {
    /// Creates an empty snapshot for an organization.
    #[must_use]
    pub const fn empty(organization_id: i64, captured_at: OffsetDateTime) -> Self {
        Self {
            organization_id,
            captured_at,
            org_units: Vec::new(),
            positions: Vec::new(),
            employees: Vec::new(),
        }
    }

    /// Org units keyed by id.
    #[must_use]
    pub fn org_units_by_id(&self) -> HashMap<i64, &SnapshotOrgUnit> {
        self.org_units.iter().map(|u| (u.id, u)).collect()
    }

    /// Positions keyed by id.
    #[must_use]
    pub fn positions_by_id(&self) -> HashMap<i64, &SnapshotPosition> {
        self.positions.iter().map(|p| (p.id, p)).collect()
    }

    /// Employees keyed by identity id.
    #[must_use]
    pub fn employees_by_id(&self) -> HashMap<i64, &SnapshotEmployee> {
        self.employees.iter().map(|e| (e.identity_id, e)).collect()
    }

    #[must_use]
    pub fn find_org_unit(&self, org_unit_id: i64) -> Option<&SnapshotOrgUnit> {
        self.org_units.iter().find(|u| u.id == org_unit_id)
    }

    #[must_use]
    pub fn find_position(&self, position_id: i64) -> Option<&SnapshotPosition> {
        self.positions.iter().find(|p| p.id == position_id)
    }

    #[must_use]
    pub fn find_employee(&self, identity_id: i64) -> Option<&SnapshotEmployee> {
        self.employees.iter().find(|e| e.identity_id == identity_id)
    }

    #[must_use]
    pub fn find_employee_by_number(&self, employee_number: &str) -> Option<&SnapshotEmployee> {
        self.employees
            .iter()
            .find(|e| e.employee_number == employee_number)
    }

    /// Employees assigned to the given org unit.
    #[must_use]
    pub fn members_of(&self, org_unit_id: i64) -> Vec<SnapshotEmployee> {
        self.employees
            .iter()
            .filter(|e| e.org_unit_id == Some(org_unit_id))
            .cloned()
            .collect()
    }

    /// Replaces the employee with the same identity id by `updated`.
    ///
    /// The employee array is rewritten as a whole, matching on identity id,
    /// so the replacement never depends on array positions.
    ///
    /// Returns `false` if no such employee exists.
    pub fn replace_employee(&mut self, updated: SnapshotEmployee) -> bool {
        let mut replaced: bool = false;
        self.employees = std::mem::take(&mut self.employees)
            .into_iter()
            .map(|existing| {
                if !replaced && existing.identity_id == updated.identity_id {
                    replaced = true;
                    updated.clone()
                } else {
                    existing
                }
            })
            .collect();
        replaced
    }

    /// Removes every employee matching `predicate` and returns them.
    pub fn remove_employees<F>(&mut self, predicate: F) -> Vec<SnapshotEmployee>
    where
        F: Fn(&SnapshotEmployee) -> bool,
    {
        let (removed, kept): (Vec<SnapshotEmployee>, Vec<SnapshotEmployee>) =
            self.employees.drain(..).partition(|e| predicate(e));
        self.employees = kept;
        removed
    }

    /// Returns whether setting `org_unit_id`'s parent to `new_parent` would
    /// make the parent graph cyclic.
    #[must_use]
    pub fn would_create_cycle(&self, org_unit_id: i64, new_parent: i64) -> bool {
        if org_unit_id == new_parent {
            return true;
        }
        let units: HashMap<i64, &SnapshotOrgUnit> = self.org_units_by_id();
        let mut visited: HashSet<i64> = HashSet::new();
        let mut cursor: Option<i64> = Some(new_parent);
        while let Some(current) = cursor {
            if current == org_unit_id {
                return true;
            }
            if !visited.insert(current) {
                // Pre-existing cycle not involving `org_unit_id`.
                return false;
            }
            cursor = units.get(&current).and_then(|u| u.parent_id);
        }
        false
    }
}
