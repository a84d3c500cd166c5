// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bulk directory seeding.
//!
//! The live directory is owned by another service; this loads a JSON dump
//! of it so versions can be built against real rows.

use diesel::SqliteConnection;
use orgstruct_domain::{Employee, OrgUnit, Position};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::data_models::Organization;
use crate::error::PersistenceError;
use crate::mutations::directory::{
    insert_employee, insert_org_unit, insert_organization, insert_position,
    update_employee_manager,
};

/// A directory dump.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryImport {
    #[serde(default)]
    pub organizations: Vec<Organization>,
    #[serde(default)]
    pub org_units: Vec<OrgUnit>,
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub employees: Vec<Employee>,
}

/// Row counts written by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub organizations: usize,
    pub org_units: usize,
    pub positions: usize,
    pub employees: usize,
}

/// Writes a dump in foreign-key order.
///
/// Units are inserted shallowest first so parents precede children.
/// Employees go in without managers, then managers are linked once every
/// employee row exists.
///
/// # Errors
///
/// Returns an error on the first row that violates a constraint. Rows
/// written before it stay written.
pub fn import_directory(
    conn: &mut SqliteConnection,
    import: &DirectoryImport,
) -> Result<ImportSummary, PersistenceError> {
    for organization in &import.organizations {
        insert_organization(conn, organization)?;
    }

    let mut units: Vec<&OrgUnit> = import.org_units.iter().collect();
    units.sort_by_key(|u| (u.level, u.org_unit_id));
    for unit in units {
        insert_org_unit(conn, unit)?;
    }

    for position in &import.positions {
        insert_position(conn, position)?;
    }

    for employee in &import.employees {
        let unlinked: Employee = Employee {
            manager_id: None,
            ..employee.clone()
        };
        insert_employee(conn, &unlinked)?;
    }
    for employee in import.employees.iter().filter(|e| e.manager_id.is_some()) {
        update_employee_manager(conn, employee.identity_id, employee.manager_id)?;
    }

    let summary: ImportSummary = ImportSummary {
        organizations: import.organizations.len(),
        org_units: import.org_units.len(),
        positions: import.positions.len(),
        employees: import.employees.len(),
    };
    info!(?summary, "Imported directory");
    Ok(summary)
}
