// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live directory writes.
//!
//! The versioning engine only ever writes employee assignments and the
//! org unit / position fields named by a correction. The `insert_*`
//! functions seed the directory; they stand in for the directory's own CRUD
//! service.

use diesel::SqliteConnection;
use diesel::prelude::*;
use orgstruct_domain::{
    Employee, OrgUnit, OrgUnitChanges, Position, PositionChanges, format_iso_date,
};
use tracing::{debug, info};

use crate::data_models::Organization;
use crate::diesel_schema::{employees, org_units, organizations, positions};
use crate::error::PersistenceError;

#[derive(AsChangeset)]
#[diesel(table_name = org_units)]
struct OrgUnitChangeset<'a> {
    name: Option<&'a str>,
    code: Option<&'a str>,
    parent_id: Option<Option<i64>>,
    unit_type: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = positions)]
struct PositionChangeset<'a> {
    name: Option<&'a str>,
    code: Option<&'a str>,
    level: Option<i32>,
    grade: Option<&'a str>,
}

/// Inserts an organization with the id it carries.
///
/// # Errors
///
/// Returns `UniqueViolation` if the id or code is taken.
pub fn insert_organization(
    conn: &mut SqliteConnection,
    organization: &Organization,
) -> Result<(), PersistenceError> {
    diesel::insert_into(organizations::table)
        .values((
            organizations::organization_id.eq(organization.organization_id),
            organizations::code.eq(&organization.code),
            organizations::name.eq(&organization.name),
        ))
        .execute(conn)?;
    info!(
        organization_id = organization.organization_id,
        code = %organization.code,
        "Created organization"
    );
    Ok(())
}

/// Inserts an org unit with the id it carries.
///
/// # Errors
///
/// Returns an error if the insert violates a constraint.
pub fn insert_org_unit(
    conn: &mut SqliteConnection,
    unit: &OrgUnit,
) -> Result<(), PersistenceError> {
    diesel::insert_into(org_units::table)
        .values((
            org_units::org_unit_id.eq(unit.org_unit_id),
            org_units::organization_id.eq(unit.organization_id),
            org_units::code.eq(&unit.code),
            org_units::name.eq(&unit.name),
            org_units::parent_id.eq(unit.parent_id),
            org_units::unit_type.eq(&unit.unit_type),
            org_units::level.eq(unit.level),
            org_units::sort_order.eq(unit.sort_order),
            org_units::head_employee_id.eq(unit.head_employee_id),
        ))
        .execute(conn)?;
    debug!(org_unit_id = unit.org_unit_id, code = %unit.code, "Inserted org unit");
    Ok(())
}

/// Inserts a position with the id it carries.
///
/// # Errors
///
/// Returns an error if the insert violates a constraint.
pub fn insert_position(
    conn: &mut SqliteConnection,
    position: &Position,
) -> Result<(), PersistenceError> {
    diesel::insert_into(positions::table)
        .values((
            positions::position_id.eq(position.position_id),
            positions::organization_id.eq(position.organization_id),
            positions::code.eq(&position.code),
            positions::name.eq(&position.name),
            positions::level.eq(position.level),
            positions::grade.eq(&position.grade),
        ))
        .execute(conn)?;
    debug!(position_id = position.position_id, code = %position.code, "Inserted position");
    Ok(())
}

/// Inserts an employee with the id it carries.
///
/// # Errors
///
/// Returns an error if the insert violates a constraint.
pub fn insert_employee(
    conn: &mut SqliteConnection,
    employee: &Employee,
) -> Result<(), PersistenceError> {
    diesel::insert_into(employees::table)
        .values((
            employees::identity_id.eq(employee.identity_id),
            employees::organization_id.eq(employee.organization_id),
            employees::employee_number.eq(&employee.employee_number),
            employees::full_name.eq(&employee.full_name),
            employees::email.eq(employee.email.as_deref()),
            employees::org_unit_id.eq(employee.org_unit_id),
            employees::position_id.eq(employee.position_id),
            employees::manager_id.eq(employee.manager_id),
            employees::employment_type.eq(employee.employment_type.as_str()),
            employees::employment_status.eq(employee.employment_status.as_str()),
            employees::work_location.eq(employee.work_location.as_deref()),
            employees::join_date.eq(format_iso_date(employee.join_date)),
        ))
        .execute(conn)?;
    debug!(
        identity_id = employee.identity_id,
        employee_number = %employee.employee_number,
        "Inserted employee"
    );
    Ok(())
}

/// Sets an employee's org unit and position unless they already hold
/// them. Returns whether a row changed.
///
/// The "already holds" check is part of the `WHERE` clause, so concurrent
/// callers count one change between them.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_employee_assignment(
    conn: &mut SqliteConnection,
    identity_id: i64,
    org_unit_id: Option<i64>,
    position_id: Option<i64>,
) -> Result<bool, PersistenceError> {
    let rows: usize = diesel::update(employees::table)
        .filter(employees::identity_id.eq(identity_id))
        .filter(
            employees::org_unit_id
                .is_not(org_unit_id)
                .or(employees::position_id.is_not(position_id)),
        )
        .set((
            employees::org_unit_id.eq(org_unit_id),
            employees::position_id.eq(position_id),
        ))
        .execute(conn)?;
    Ok(rows == 1)
}

/// Applies org unit changes. Returns whether the unit exists.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_org_unit(
    conn: &mut SqliteConnection,
    org_unit_id: i64,
    changes: &OrgUnitChanges,
) -> Result<bool, PersistenceError> {
    if changes.is_empty() {
        let count: i64 = org_units::table
            .filter(org_units::org_unit_id.eq(org_unit_id))
            .count()
            .get_result(conn)?;
        return Ok(count > 0);
    }

    let changeset: OrgUnitChangeset<'_> = OrgUnitChangeset {
        name: changes.name.as_deref(),
        code: changes.code.as_deref(),
        parent_id: changes.parent_id,
        unit_type: changes.unit_type.as_deref(),
    };
    let rows: usize = diesel::update(org_units::table)
        .filter(org_units::org_unit_id.eq(org_unit_id))
        .set(&changeset)
        .execute(conn)?;
    Ok(rows == 1)
}

/// Applies position changes. Returns whether the position exists.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_position(
    conn: &mut SqliteConnection,
    position_id: i64,
    changes: &PositionChanges,
) -> Result<bool, PersistenceError> {
    if changes.is_empty() {
        let count: i64 = positions::table
            .filter(positions::position_id.eq(position_id))
            .count()
            .get_result(conn)?;
        return Ok(count > 0);
    }

    let changeset: PositionChangeset<'_> = PositionChangeset {
        name: changes.name.as_deref(),
        code: changes.code.as_deref(),
        level: changes.level,
        grade: changes.grade.as_deref(),
    };
    let rows: usize = diesel::update(positions::table)
        .filter(positions::position_id.eq(position_id))
        .set(&changeset)
        .execute(conn)?;
    Ok(rows == 1)
}

/// Points an employee at their manager.
///
/// # Errors
///
/// Returns an error if the manager does not exist or the update fails.
pub fn update_employee_manager(
    conn: &mut SqliteConnection,
    identity_id: i64,
    manager_id: Option<i64>,
) -> Result<bool, PersistenceError> {
    let rows: usize = diesel::update(employees::table)
        .filter(employees::identity_id.eq(identity_id))
        .set(employees::manager_id.eq(manager_id))
        .execute(conn)?;
    Ok(rows == 1)
}
