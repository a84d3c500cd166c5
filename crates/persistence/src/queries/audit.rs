// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use orgstruct_audit::AuditEntry;

use crate::data_models::AuditRow;
use crate::diesel_schema::audit_log;
use crate::error::PersistenceError;

/// Audit entries recorded against a version, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be mapped.
pub fn audit_entries_for_version(
    conn: &mut SqliteConnection,
    version_id: i64,
) -> Result<Vec<AuditEntry>, PersistenceError> {
    audit_log::table
        .filter(audit_log::version_id.eq(version_id))
        .order(audit_log::audit_id.asc())
        .select(AuditRow::as_select())
        .load(conn)?
        .into_iter()
        .map(AuditEntry::try_from)
        .collect()
}
