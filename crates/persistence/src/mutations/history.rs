// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use orgstruct_domain::{NewHistoryEntry, format_iso_date};
use time::OffsetDateTime;
use tracing::debug;

use crate::data_models::format_timestamp;
use crate::diesel_schema::employee_history;
use crate::error::PersistenceError;

/// Inserts a history entry unless its `(employee, event type, version)` key
/// already exists. Returns whether a row was written.
///
/// The unique index decides, so two publishers racing on the same employee
/// produce one row.
///
/// # Errors
///
/// Returns an error if serialization or the insert fails.
pub fn insert_history_entry_if_absent(
    conn: &mut SqliteConnection,
    entry: &NewHistoryEntry,
    now: OffsetDateTime,
) -> Result<bool, PersistenceError> {
    let details_json: String = serde_json::to_string(&entry.details)?;

    let rows: usize = diesel::insert_or_ignore_into(employee_history::table)
        .values((
            employee_history::employee_id.eq(entry.employee_id),
            employee_history::event_type.eq(entry.event_type.as_str()),
            employee_history::event_date.eq(format_iso_date(entry.event_date)),
            employee_history::previous_org_unit_id.eq(entry.previous_org_unit_id),
            employee_history::previous_position_id.eq(entry.previous_position_id),
            employee_history::new_org_unit_id.eq(entry.new_org_unit_id),
            employee_history::new_position_id.eq(entry.new_position_id),
            employee_history::version_id.eq(entry.details.version_id),
            employee_history::details_json.eq(details_json),
            employee_history::created_at.eq(format_timestamp(now)?),
        ))
        .execute(conn)?;

    if rows == 0 {
        debug!(
            employee_id = entry.employee_id,
            version_id = entry.details.version_id,
            "History entry already present"
        );
    }
    Ok(rows == 1)
}
