// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Three-way structural diff between two snapshots.
//!
//! Entities are matched by stable identifier through hash maps, so a diff is
//! linear in the size of the two snapshots.

use crate::snapshot::{Snapshot, SnapshotEmployee, SnapshotOrgUnit, SnapshotPosition};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A before/after pair for an entity present in both snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change<T> {
    pub before: T,
    pub after: T,
}

/// Added, removed and modified entities of one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDiff<T> {
    pub added: Vec<T>,
    pub removed: Vec<T>,
    pub modified: Vec<Change<T>>,
}

impl<T> EntityDiff<T> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// An employee whose org unit or position differs between the snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeReassignment {
    pub identity_id: i64,
    pub employee_number: String,
    pub full_name: String,
    pub old_org_unit_id: Option<i64>,
    pub old_org_unit_name: String,
    pub new_org_unit_id: Option<i64>,
    pub new_org_unit_name: String,
    pub old_position_id: Option<i64>,
    pub old_position_name: String,
    pub new_position_id: Option<i64>,
    pub new_position_name: String,
}

impl EmployeeReassignment {
    fn between(before: &SnapshotEmployee, after: &SnapshotEmployee) -> Self {
        Self {
            identity_id: after.identity_id,
            employee_number: after.employee_number.clone(),
            full_name: after.full_name.clone(),
            old_org_unit_id: before.org_unit_id,
            old_org_unit_name: before.org_unit_name.clone(),
            new_org_unit_id: after.org_unit_id,
            new_org_unit_name: after.org_unit_name.clone(),
            old_position_id: before.position_id,
            old_position_name: before.position_name.clone(),
            new_position_id: after.position_id,
            new_position_name: after.position_name.clone(),
        }
    }
}

/// Employee-level differences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDiff {
    pub added: Vec<SnapshotEmployee>,
    pub removed: Vec<SnapshotEmployee>,
    pub reassigned: Vec<EmployeeReassignment>,
}

/// Full structural difference from one snapshot to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureDiff {
    pub org_units: EntityDiff<SnapshotOrgUnit>,
    pub positions: EntityDiff<SnapshotPosition>,
    pub employees: EmployeeDiff,
}

impl StructureDiff {
    /// Returns `true` if the two snapshots are structurally identical.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.org_units.is_empty()
            && self.positions.is_empty()
            && self.employees.added.is_empty()
            && self.employees.removed.is_empty()
            && self.employees.reassigned.is_empty()
    }
}

fn unit_changed(before: &SnapshotOrgUnit, after: &SnapshotOrgUnit) -> bool {
    before.name != after.name || before.code != after.code || before.parent_id != after.parent_id
}

fn position_changed(before: &SnapshotPosition, after: &SnapshotPosition) -> bool {
    before.name != after.name
        || before.code != after.code
        || before.level != after.level
        || before.grade != after.grade
}

fn employee_moved(before: &SnapshotEmployee, after: &SnapshotEmployee) -> bool {
    before.org_unit_id != after.org_unit_id || before.position_id != after.position_id
}

/// Generic keyed diff. `added`/`modified` follow `to` order, `removed`
/// follows `from` order.
fn keyed_diff<T, K, C>(from: &[T], to: &[T], key: K, changed: C) -> EntityDiff<T>
where
    T: Clone,
    K: Fn(&T) -> i64,
    C: Fn(&T, &T) -> bool,
{
    let from_by_key: HashMap<i64, &T> = from.iter().map(|item| (key(item), item)).collect();
    let to_by_key: HashMap<i64, &T> = to.iter().map(|item| (key(item), item)).collect();

    let mut added: Vec<T> = Vec::new();
    let mut modified: Vec<Change<T>> = Vec::new();
    for item in to {
        match from_by_key.get(&key(item)) {
            None => added.push(item.clone()),
            Some(before) if changed(before, item) => modified.push(Change {
                before: (*before).clone(),
                after: item.clone(),
            }),
            Some(_) => {}
        }
    }

    let removed: Vec<T> = from
        .iter()
        .filter(|item| !to_by_key.contains_key(&key(item)))
        .cloned()
        .collect();

    EntityDiff {
        added,
        removed,
        modified,
    }
}

/// Computes the structural difference from `from` to `to`.
#[must_use]
pub fn compare_snapshots(from: &Snapshot, to: &Snapshot) -> StructureDiff {
    let org_units: EntityDiff<SnapshotOrgUnit> =
        keyed_diff(&from.org_units, &to.org_units, |u| u.id, unit_changed);
    let positions: EntityDiff<SnapshotPosition> =
        keyed_diff(&from.positions, &to.positions, |p| p.id, position_changed);
    let raw: EntityDiff<SnapshotEmployee> = keyed_diff(
        &from.employees,
        &to.employees,
        |e| e.identity_id,
        employee_moved,
    );

    StructureDiff {
        org_units,
        positions,
        employees: EmployeeDiff {
            added: raw.added,
            removed: raw.removed,
            reassigned: raw
                .modified
                .iter()
                .map(|change| EmployeeReassignment::between(&change.before, &change.after))
                .collect(),
        },
    }
}
