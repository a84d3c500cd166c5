// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::memory::InMemoryStore;
use crate::{NewVersionRequest, ReassignmentRequest, VersionManager};
use orgstruct_domain::{Employee, EmploymentStatus, EmploymentType, OrgUnit, Position};
use time::macros::{date, datetime};
use time::{Date, OffsetDateTime};

pub const ORG: i64 = 1;
pub const OTHER_ORG: i64 = 2;
pub const NOW: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);

pub const HQ: i64 = 1;
pub const IT: i64 = 2;
pub const HR: i64 = 3;
pub const ENGINEER: i64 = 10;
pub const OFFICER: i64 = 11;

pub fn create_test_unit(
    org_unit_id: i64,
    organization_id: i64,
    code: &str,
    name: &str,
    parent_id: Option<i64>,
) -> OrgUnit {
    OrgUnit {
        org_unit_id,
        organization_id,
        code: String::from(code),
        name: String::from(name),
        parent_id,
        unit_type: String::from("department"),
        level: if parent_id.is_some() { 2 } else { 1 },
        sort_order: 0,
        head_employee_id: None,
    }
}

pub fn create_test_position(
    position_id: i64,
    organization_id: i64,
    code: &str,
    name: &str,
) -> Position {
    Position {
        position_id,
        organization_id,
        code: String::from(code),
        name: String::from(name),
        level: 3,
        grade: String::from("G3"),
    }
}

pub fn create_test_employee(
    identity_id: i64,
    organization_id: i64,
    number: &str,
    org_unit_id: Option<i64>,
    position_id: Option<i64>,
) -> Employee {
    Employee {
        identity_id,
        organization_id,
        employee_number: String::from(number),
        full_name: format!("Employee {number}"),
        email: Some(format!("{}@example.com", number.to_lowercase())),
        org_unit_id,
        position_id,
        manager_id: None,
        employment_type: EmploymentType::Permanent,
        employment_status: EmploymentStatus::Active,
        work_location: None,
        join_date: date!(2020 - 01 - 06),
    }
}

/// Organization 1: head office with IT and HR below it, an engineer and an
/// officer position, E1/E2 in IT (E2 reports to E1), E3 in HR and a
/// resigned E4. Organization 2 holds a single employee numbered E1 too.
pub fn create_test_store() -> InMemoryStore {
    let mut store: InMemoryStore = InMemoryStore::new();
    store.add_org_unit(create_test_unit(HQ, ORG, "HQ", "Head Office", None));
    store.add_org_unit(create_test_unit(IT, ORG, "IT", "Information Technology", Some(HQ)));
    store.add_org_unit(create_test_unit(HR, ORG, "HR", "Human Resources", Some(HQ)));
    store.add_position(create_test_position(ENGINEER, ORG, "ENG", "Engineer"));
    store.add_position(create_test_position(OFFICER, ORG, "OFF", "Officer"));

    store.add_employee(create_test_employee(100, ORG, "E1", Some(IT), Some(ENGINEER)));
    let mut e2: Employee = create_test_employee(101, ORG, "E2", Some(IT), Some(ENGINEER));
    e2.manager_id = Some(100);
    e2.employment_status = EmploymentStatus::Probation;
    store.add_employee(e2);
    store.add_employee(create_test_employee(102, ORG, "E3", Some(HR), Some(OFFICER)));
    let mut e4: Employee = create_test_employee(103, ORG, "E4", Some(HR), Some(OFFICER));
    e4.employment_status = EmploymentStatus::Resigned;
    store.add_employee(e4);

    store.add_org_unit(create_test_unit(20, OTHER_ORG, "OPS", "Operations", None));
    store.add_position(create_test_position(30, OTHER_ORG, "TECH", "Technician"));
    store.add_employee(create_test_employee(200, OTHER_ORG, "E1", Some(20), Some(30)));

    store
}

pub fn create_test_request(
    organization_id: i64,
    name: &str,
    effective_date: Date,
) -> NewVersionRequest {
    NewVersionRequest {
        organization_id,
        version_name: String::from(name),
        effective_date,
        notes: None,
        sk_number: Some(String::from("SK-2026-001")),
        sk_date: Some(date!(2026 - 02 - 20)),
        created_by: String::from("admin"),
    }
}

/// Creates a draft for organization 1 and returns its id.
pub fn create_draft(store: &mut InMemoryStore, name: &str, effective_date: Date) -> i64 {
    VersionManager::at(store, NOW)
        .create_version(create_test_request(ORG, name, effective_date))
        .unwrap()
        .version_id
}

/// Creates a draft that moves E1 to HR and E3 to IT.
pub fn create_draft_with_moves(store: &mut InMemoryStore) -> i64 {
    let version_id: i64 = create_draft(store, "Q2 restructure", date!(2026 - 04 - 01));
    let mut manager = VersionManager::at(store, NOW);
    manager
        .propose_reassignment(version_id, move_request("E1", HR, None))
        .unwrap();
    manager
        .propose_reassignment(version_id, move_request("E3", IT, Some(ENGINEER)))
        .unwrap();
    version_id
}

pub fn move_request(
    number: &str,
    org_unit_id: i64,
    position_id: Option<i64>,
) -> ReassignmentRequest {
    ReassignmentRequest {
        employee_number: String::from(number),
        new_org_unit_id: Some(org_unit_id),
        new_position_id: position_id,
        reason: String::from("Restructure"),
    }
}
