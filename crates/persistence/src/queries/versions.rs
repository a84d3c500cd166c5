// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Version reads.

use diesel::SqliteConnection;
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use orgstruct_domain::{OrgStructureVersion, VersionStatus};
use tracing::debug;

use crate::data_models::VersionRow;
use crate::diesel_schema::org_structure_versions as versions;
use crate::error::PersistenceError;

fn to_versions(rows: Vec<VersionRow>) -> Result<Vec<OrgStructureVersion>, PersistenceError> {
    rows.into_iter().map(OrgStructureVersion::try_from).collect()
}

/// Finds a version by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be mapped.
pub fn find_version(
    conn: &mut SqliteConnection,
    version_id: i64,
) -> Result<Option<OrgStructureVersion>, PersistenceError> {
    versions::table
        .filter(versions::version_id.eq(version_id))
        .select(VersionRow::as_select())
        .first(conn)
        .optional()?
        .map(OrgStructureVersion::try_from)
        .transpose()
}

/// Lists an organization's versions by ascending version number,
/// optionally restricted to one status.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be mapped.
pub fn list_versions(
    conn: &mut SqliteConnection,
    organization_id: i64,
    status: Option<VersionStatus>,
) -> Result<Vec<OrgStructureVersion>, PersistenceError> {
    let mut query = versions::table
        .filter(versions::organization_id.eq(organization_id))
        .into_boxed::<Sqlite>();
    if let Some(status) = status {
        query = query.filter(versions::status.eq(status.as_str()));
    }

    let rows: Vec<VersionRow> = query
        .order(versions::version_number.asc())
        .select(VersionRow::as_select())
        .load(conn)?;
    to_versions(rows)
}

/// Lists versions of every organization holding one of `statuses`, by
/// effective date then version number.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be mapped.
pub fn list_versions_with_status(
    conn: &mut SqliteConnection,
    statuses: &[VersionStatus],
) -> Result<Vec<OrgStructureVersion>, PersistenceError> {
    let wanted: Vec<&str> = statuses.iter().map(VersionStatus::as_str).collect();
    debug!(statuses = ?wanted, "Listing versions by status");

    let rows: Vec<VersionRow> = versions::table
        .filter(versions::status.eq_any(wanted))
        .order((
            versions::effective_date.asc(),
            versions::version_number.asc(),
        ))
        .select(VersionRow::as_select())
        .load(conn)?;
    to_versions(rows)
}

/// Highest version number of an organization, if it has any version.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn max_version_number(
    conn: &mut SqliteConnection,
    organization_id: i64,
) -> Result<Option<i32>, PersistenceError> {
    Ok(versions::table
        .filter(versions::organization_id.eq(organization_id))
        .select(max(versions::version_number))
        .first::<Option<i32>>(conn)?)
}
