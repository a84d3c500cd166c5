// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    EmploymentStatus, EmploymentType, Snapshot, SnapshotEmployee, SnapshotOrgUnit,
    SnapshotPosition,
};
use time::macros::{date, datetime};
use time::OffsetDateTime;

pub const CAPTURED_AT: OffsetDateTime = datetime!(2026-01-15 09:00 UTC);

pub fn unit(id: i64, code: &str, name: &str, parent_id: Option<i64>) -> SnapshotOrgUnit {
    SnapshotOrgUnit {
        id,
        code: String::from(code),
        name: String::from(name),
        parent_id,
        unit_type: String::from("department"),
        level: if parent_id.is_some() { 2 } else { 1 },
        sort_order: 0,
        head_employee_id: None,
    }
}

pub fn position(id: i64, code: &str, name: &str) -> SnapshotPosition {
    SnapshotPosition {
        id,
        code: String::from(code),
        name: String::from(name),
        level: 3,
        grade: String::from("G3"),
    }
}

pub fn employee(
    identity_id: i64,
    number: &str,
    org_unit: Option<&SnapshotOrgUnit>,
    position: Option<&SnapshotPosition>,
) -> SnapshotEmployee {
    SnapshotEmployee {
        identity_id,
        employee_number: String::from(number),
        full_name: format!("Employee {number}"),
        email: None,
        org_unit_id: org_unit.map(|u| u.id),
        org_unit_code: org_unit.map(|u| u.code.clone()).unwrap_or_default(),
        org_unit_name: org_unit.map(|u| u.name.clone()).unwrap_or_default(),
        position_id: position.map(|p| p.id),
        position_code: position.map(|p| p.code.clone()).unwrap_or_default(),
        position_name: position.map(|p| p.name.clone()).unwrap_or_default(),
        manager_id: None,
        manager_name: None,
        employment_type: EmploymentType::Permanent,
        employment_status: EmploymentStatus::Active,
        work_location: None,
        join_date: date!(2020 - 03 - 01),
        snapshot_date: CAPTURED_AT,
    }
}

/// Two departments (IT, HR) under a head office, two positions and three
/// employees: E1 and E2 in IT, E3 in HR.
pub fn sample_snapshot() -> Snapshot {
    let head: SnapshotOrgUnit = unit(1, "HQ", "Head Office", None);
    let it: SnapshotOrgUnit = unit(2, "IT", "Information Technology", Some(1));
    let hr: SnapshotOrgUnit = unit(3, "HR", "Human Resources", Some(1));
    let engineer: SnapshotPosition = position(10, "ENG", "Engineer");
    let officer: SnapshotPosition = position(11, "OFF", "Officer");

    let employees: Vec<SnapshotEmployee> = vec![
        employee(100, "E1", Some(&it), Some(&engineer)),
        employee(101, "E2", Some(&it), Some(&engineer)),
        employee(102, "E3", Some(&hr), Some(&officer)),
    ];

    Snapshot {
        organization_id: 1,
        captured_at: CAPTURED_AT,
        org_units: vec![head, it, hr],
        positions: vec![engineer, officer],
        employees,
    }
}
