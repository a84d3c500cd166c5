// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Headcount for one org unit or position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    /// `None` groups employees without an org unit / position.
    pub id: Option<i64>,
    pub name: String,
    pub count: usize,
}

/// Aggregate headcounts of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotStats {
    pub employee_count: usize,
    pub org_unit_count: usize,
    pub position_count: usize,
    /// Sorted by descending count, then name.
    pub by_org_unit: Vec<GroupCount>,
    /// Sorted by descending count, then name.
    pub by_position: Vec<GroupCount>,
    pub by_employment_status: BTreeMap<String, usize>,
    /// Distinct org units that have at least one employee.
    pub units_with_employees: usize,
    /// `employee_count / units_with_employees`, one decimal, 0 if none.
    pub average_team_size: f64,
}

fn into_sorted(groups: HashMap<Option<i64>, (String, usize)>) -> Vec<GroupCount> {
    let mut counts: Vec<GroupCount> = groups
        .into_iter()
        .map(|(id, (name, count))| GroupCount { id, name, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    counts
}

/// Rounds to one decimal place.
#[must_use]
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Computes headcount aggregates over a snapshot's employees.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_stats(snapshot: &Snapshot) -> SnapshotStats {
    let mut by_unit: HashMap<Option<i64>, (String, usize)> = HashMap::new();
    let mut by_position: HashMap<Option<i64>, (String, usize)> = HashMap::new();
    let mut by_status: BTreeMap<String, usize> = BTreeMap::new();

    for employee in &snapshot.employees {
        by_unit
            .entry(employee.org_unit_id)
            .or_insert_with(|| (employee.org_unit_name.clone(), 0))
            .1 += 1;
        by_position
            .entry(employee.position_id)
            .or_insert_with(|| (employee.position_name.clone(), 0))
            .1 += 1;
        *by_status
            .entry(employee.employment_status.as_str().to_string())
            .or_insert(0) += 1;
    }

    let units_with_employees: usize = by_unit.keys().filter(|id| id.is_some()).count();
    let employee_count: usize = snapshot.employees.len();
    let average_team_size: f64 = if units_with_employees == 0 {
        0.0
    } else {
        round_one_decimal(employee_count as f64 / units_with_employees as f64)
    };

    SnapshotStats {
        employee_count,
        org_unit_count: snapshot.org_units.len(),
        position_count: snapshot.positions.len(),
        by_org_unit: into_sorted(by_unit),
        by_position: into_sorted(by_position),
        by_employment_status: by_status,
        units_with_employees,
        average_team_size,
    }
}
