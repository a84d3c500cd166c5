// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use orgstruct_domain::{EmployeeHistoryEntry, HistoryEventType};

use crate::data_models::HistoryRow;
use crate::diesel_schema::employee_history;
use crate::error::PersistenceError;

/// Returns whether the `(employee, event type, version)` entry exists.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn history_entry_exists(
    conn: &mut SqliteConnection,
    employee_id: i64,
    event_type: HistoryEventType,
    version_id: i64,
) -> Result<bool, PersistenceError> {
    let count: i64 = employee_history::table
        .filter(employee_history::employee_id.eq(employee_id))
        .filter(employee_history::event_type.eq(event_type.as_str()))
        .filter(employee_history::version_id.eq(version_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_history_for_version(
    conn: &mut SqliteConnection,
    version_id: i64,
) -> Result<usize, PersistenceError> {
    let count: i64 = employee_history::table
        .filter(employee_history::version_id.eq(version_id))
        .count()
        .get_result(conn)?;
    usize::try_from(count).map_err(|e| PersistenceError::QueryFailed(e.to_string()))
}

/// An employee's history entries in insertion order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be mapped.
pub fn list_history_for_employee(
    conn: &mut SqliteConnection,
    employee_id: i64,
) -> Result<Vec<EmployeeHistoryEntry>, PersistenceError> {
    employee_history::table
        .filter(employee_history::employee_id.eq(employee_id))
        .order(employee_history::history_id.asc())
        .select(HistoryRow::as_select())
        .load(conn)?
        .into_iter()
        .map(EmployeeHistoryEntry::try_from)
        .collect()
}
