// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live directory reads.

use diesel::SqliteConnection;
use diesel::prelude::*;
use orgstruct_domain::{Employee, EmploymentStatus, OrgUnit, Position};
use tracing::debug;

use crate::data_models::{EmployeeRow, OrgUnitRow, PositionRow};
use crate::diesel_schema::{employees, org_units, positions};
use crate::error::PersistenceError;

/// Lists an organization's org units by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_org_units(
    conn: &mut SqliteConnection,
    organization_id: i64,
) -> Result<Vec<OrgUnit>, PersistenceError> {
    let rows: Vec<OrgUnitRow> = org_units::table
        .filter(org_units::organization_id.eq(organization_id))
        .order(org_units::org_unit_id.asc())
        .select(OrgUnitRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(OrgUnit::from).collect())
}

/// Lists an organization's positions by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_positions(
    conn: &mut SqliteConnection,
    organization_id: i64,
) -> Result<Vec<Position>, PersistenceError> {
    let rows: Vec<PositionRow> = positions::table
        .filter(positions::organization_id.eq(organization_id))
        .order(positions::position_id.asc())
        .select(PositionRow::as_select())
        .load(conn)?;
    Ok(rows.into_iter().map(Position::from).collect())
}

/// Lists an organization's employees holding one of `statuses`, by id.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be mapped.
pub fn list_employees(
    conn: &mut SqliteConnection,
    organization_id: i64,
    statuses: &[EmploymentStatus],
) -> Result<Vec<Employee>, PersistenceError> {
    let wanted: Vec<&str> = statuses.iter().map(EmploymentStatus::as_str).collect();
    debug!(organization_id, statuses = ?wanted, "Listing employees");

    employees::table
        .filter(employees::organization_id.eq(organization_id))
        .filter(employees::employment_status.eq_any(wanted))
        .order(employees::identity_id.asc())
        .select(EmployeeRow::as_select())
        .load(conn)?
        .into_iter()
        .map(Employee::try_from)
        .collect()
}

/// Finds an employee by identity id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be mapped.
pub fn find_employee(
    conn: &mut SqliteConnection,
    identity_id: i64,
) -> Result<Option<Employee>, PersistenceError> {
    employees::table
        .filter(employees::identity_id.eq(identity_id))
        .select(EmployeeRow::as_select())
        .first(conn)
        .optional()?
        .map(Employee::try_from)
        .transpose()
}

/// Finds an employee by number within an organization.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be mapped.
pub fn find_employee_by_number(
    conn: &mut SqliteConnection,
    organization_id: i64,
    employee_number: &str,
) -> Result<Option<Employee>, PersistenceError> {
    employees::table
        .filter(employees::organization_id.eq(organization_id))
        .filter(employees::employee_number.eq(employee_number))
        .select(EmployeeRow::as_select())
        .first(conn)
        .optional()?
        .map(Employee::try_from)
        .transpose()
}
