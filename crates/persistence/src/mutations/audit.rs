// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit log persistence.

use diesel::SqliteConnection;
use diesel::prelude::*;
use orgstruct_audit::AuditEntry;
use tracing::debug;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::format_timestamp;
use crate::diesel_schema::audit_log;
use crate::error::PersistenceError;

/// Appends an audit entry.
///
/// # Returns
///
/// The id assigned by the database.
///
/// # Errors
///
/// Returns an error if serialization or the insert fails.
pub fn insert_audit_entry(
    conn: &mut SqliteConnection,
    entry: &AuditEntry,
) -> Result<i64, PersistenceError> {
    let corrections_json: String = serde_json::to_string(&entry.corrections)?;

    diesel::insert_into(audit_log::table)
        .values((
            audit_log::actor_id.eq(&entry.actor.id),
            audit_log::actor_type.eq(&entry.actor.actor_type),
            audit_log::action_name.eq(&entry.action.name),
            audit_log::action_details.eq(entry.action.details.as_deref()),
            audit_log::entity_type.eq(entry.entity_type.as_str()),
            audit_log::entity_id.eq(entry.entity_id),
            audit_log::version_id.eq(entry.version_id),
            audit_log::corrections_json.eq(corrections_json),
            audit_log::created_at.eq(format_timestamp(entry.created_at)?),
        ))
        .execute(conn)?;

    let audit_id: i64 = get_last_insert_rowid(conn)?;
    debug!(
        audit_id,
        version_id = entry.version_id,
        entity_type = entry.entity_type.as_str(),
        entity_id = entry.entity_id,
        "Persisted audit entry"
    );
    Ok(audit_id)
}
