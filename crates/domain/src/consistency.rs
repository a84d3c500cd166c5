// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Referential and structural checks over a snapshot.
//!
//! Problems are reported as data. Nothing in this module fails.

use crate::snapshot::{Snapshot, SnapshotEmployee, SnapshotOrgUnit};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Kind of snapshot defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InconsistencyKind {
    /// An employee's org unit id does not resolve within the snapshot.
    MissingOrgUnit,
    /// An employee's position id does not resolve within the snapshot.
    MissingPosition,
    /// An org unit's parent chain loops back on itself.
    CircularReference,
    /// An employee has neither an org unit nor a position.
    OrphanedEmployee,
}

impl InconsistencyKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingOrgUnit => "missing_org_unit",
            Self::MissingPosition => "missing_position",
            Self::CircularReference => "circular_reference",
            Self::OrphanedEmployee => "orphaned_employee",
        }
    }

    /// Only orphaned employees have an unambiguous fix (removal).
    #[must_use]
    pub const fn is_auto_fixable(&self) -> bool {
        matches!(self, Self::OrphanedEmployee)
    }
}

impl std::fmt::Display for InconsistencyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One detected defect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InconsistencyIssue {
    pub kind: InconsistencyKind,
    /// Identity id of the affected employee, for employee-level issues.
    pub employee_id: Option<i64>,
    pub employee_number: Option<String>,
    /// The org unit involved (dangling reference or cycle member).
    pub org_unit_id: Option<i64>,
    /// The dangling position reference.
    pub position_id: Option<i64>,
    pub message: String,
}

impl InconsistencyIssue {
    fn for_employee(kind: InconsistencyKind, employee: &SnapshotEmployee, message: String) -> Self {
        Self {
            kind,
            employee_id: Some(employee.identity_id),
            employee_number: Some(employee.employee_number.clone()),
            org_unit_id: None,
            position_id: None,
            message,
        }
    }
}

/// Scans a snapshot for the four defect kinds.
///
/// Employee issues come first, in snapshot order; cycle issues follow,
/// one per org unit lying on a cycle, ordered by unit id.
#[must_use]
pub fn detect_inconsistencies(snapshot: &Snapshot) -> Vec<InconsistencyIssue> {
    let units: HashMap<i64, &SnapshotOrgUnit> = snapshot.org_units_by_id();
    let position_ids: HashSet<i64> = snapshot.positions.iter().map(|p| p.id).collect();
    let mut issues: Vec<InconsistencyIssue> = Vec::new();

    for employee in &snapshot.employees {
        if employee.org_unit_id.is_none() && employee.position_id.is_none() {
            issues.push(InconsistencyIssue::for_employee(
                InconsistencyKind::OrphanedEmployee,
                employee,
                format!(
                    "Employee {} has neither an org unit nor a position",
                    employee.employee_number
                ),
            ));
            continue;
        }

        if let Some(unit_id) = employee.org_unit_id.filter(|id| !units.contains_key(id)) {
            let mut issue: InconsistencyIssue = InconsistencyIssue::for_employee(
                InconsistencyKind::MissingOrgUnit,
                employee,
                format!(
                    "Employee {} references org unit {unit_id} which is not in the snapshot",
                    employee.employee_number
                ),
            );
            issue.org_unit_id = Some(unit_id);
            issues.push(issue);
        }

        if let Some(position_id) = employee
            .position_id
            .filter(|id| !position_ids.contains(id))
        {
            let mut issue: InconsistencyIssue = InconsistencyIssue::for_employee(
                InconsistencyKind::MissingPosition,
                employee,
                format!(
                    "Employee {} references position {position_id} which is not in the snapshot",
                    employee.employee_number
                ),
            );
            issue.position_id = Some(position_id);
            issues.push(issue);
        }
    }

    for unit_id in units_on_cycles(&units) {
        issues.push(InconsistencyIssue {
            kind: InconsistencyKind::CircularReference,
            employee_id: None,
            employee_number: None,
            org_unit_id: Some(unit_id),
            position_id: None,
            message: format!("Org unit {unit_id} is part of a circular parent chain"),
        });
    }

    issues
}

/// Returns the ids of every org unit that lies on a parent cycle.
fn units_on_cycles(units: &HashMap<i64, &SnapshotOrgUnit>) -> BTreeSet<i64> {
    let mut on_cycle: BTreeSet<i64> = BTreeSet::new();
    let mut settled: HashSet<i64> = HashSet::new();

    let mut starts: Vec<i64> = units.keys().copied().collect();
    starts.sort_unstable();

    for start in starts {
        if settled.contains(&start) {
            continue;
        }
        let mut path: Vec<i64> = Vec::new();
        let mut on_path: HashSet<i64> = HashSet::new();
        let mut cursor: Option<i64> = Some(start);

        while let Some(current) = cursor {
            if settled.contains(&current) {
                break;
            }
            if !on_path.insert(current) {
                // Revisited: everything from the first occurrence onward loops.
                if let Some(pos) = path.iter().position(|id| *id == current) {
                    on_cycle.extend(path[pos..].iter().copied());
                }
                break;
            }
            path.push(current);
            cursor = units.get(&current).and_then(|u| u.parent_id);
        }

        settled.extend(path);
    }

    on_cycle
}

/// Advisory validation run after a snapshot is built.
///
/// Returns human-readable warnings; an empty list means the snapshot is
/// internally consistent. Never blocks version creation.
#[must_use]
pub fn validate_snapshot(snapshot: &Snapshot) -> Vec<String> {
    let mut warnings: Vec<String> = Vec::new();

    let mut seen_units: HashSet<i64> = HashSet::new();
    for unit in &snapshot.org_units {
        if !seen_units.insert(unit.id) {
            warnings.push(format!("Duplicate org unit id {} in snapshot", unit.id));
        }
    }
    let mut seen_positions: HashSet<i64> = HashSet::new();
    for position in &snapshot.positions {
        if !seen_positions.insert(position.id) {
            warnings.push(format!("Duplicate position id {} in snapshot", position.id));
        }
    }
    let mut seen_employees: HashSet<i64> = HashSet::new();
    for employee in &snapshot.employees {
        if !seen_employees.insert(employee.identity_id) {
            warnings.push(format!(
                "Duplicate employee identity {} in snapshot",
                employee.identity_id
            ));
        }
    }

    for unit in &snapshot.org_units {
        if let Some(parent_id) = unit.parent_id.filter(|id| !seen_units.contains(id)) {
            warnings.push(format!(
                "Org unit {} ({}) has parent {parent_id} which is not in the snapshot",
                unit.code, unit.id
            ));
        }
    }

    warnings.extend(
        detect_inconsistencies(snapshot)
            .into_iter()
            .map(|issue| format!("{}: {}", issue.kind, issue.message)),
    );

    warnings
}
