// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Version writes.
//!
//! Every statement here touches one row or one set of rows in a single
//! statement. Status guards live in the `WHERE` clause so a stale caller
//! cannot overwrite a version that has moved on.

use diesel::SqliteConnection;
use diesel::prelude::*;
use orgstruct_domain::{
    NewVersion, PublishProgress, PublishStatus, Snapshot, VersionStatus, VersionUpdate,
    format_iso_date,
};
use time::{Date, OffsetDateTime};
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::format_timestamp;
use crate::diesel_schema::org_structure_versions as versions;
use crate::error::PersistenceError;

#[derive(AsChangeset)]
#[diesel(table_name = versions)]
struct DraftChangeset<'a> {
    version_name: Option<&'a str>,
    effective_date: Option<String>,
    notes: Option<&'a str>,
    sk_number: Option<&'a str>,
    sk_date: Option<String>,
    reassignments_json: Option<String>,
    updated_at: String,
}

fn version_exists(conn: &mut SqliteConnection, version_id: i64) -> Result<bool, PersistenceError> {
    let count: i64 = versions::table
        .filter(versions::version_id.eq(version_id))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Inserts a draft and returns its id.
///
/// # Errors
///
/// Returns `UniqueViolation` if the version number is taken for the
/// organization.
pub fn insert_version(
    conn: &mut SqliteConnection,
    version: &NewVersion,
    now: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    let structure_json: String = serde_json::to_string(&version.structure)?;
    let progress_json: String = serde_json::to_string(&PublishProgress::initialized())?;
    let timestamp: String = format_timestamp(now)?;

    diesel::insert_into(versions::table)
        .values((
            versions::organization_id.eq(version.organization_id),
            versions::version_number.eq(version.version_number),
            versions::version_name.eq(&version.version_name),
            versions::effective_date.eq(format_iso_date(version.effective_date)),
            versions::status.eq(VersionStatus::Draft.as_str()),
            versions::structure_json.eq(structure_json),
            versions::structure_revision.eq(0),
            versions::reassignments_json.eq("[]"),
            versions::publish_status.eq(PublishStatus::NotStarted.as_str()),
            versions::publish_progress_json.eq(progress_json),
            versions::sk_number.eq(version.sk_number.as_deref()),
            versions::sk_date.eq(version.sk_date.map(format_iso_date)),
            versions::notes.eq(version.notes.as_deref()),
            versions::created_by.eq(&version.created_by),
            versions::created_at.eq(&timestamp),
            versions::updated_at.eq(&timestamp),
        ))
        .execute(conn)?;

    let version_id: i64 = get_last_insert_rowid(conn)?;
    info!(
        version_id,
        organization_id = version.organization_id,
        version_number = version.version_number,
        "Inserted draft version"
    );
    Ok(version_id)
}

/// Archives the organization's active versions other than
/// `keep_version_id`. Returns the ids that changed.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn archive_active_versions(
    conn: &mut SqliteConnection,
    organization_id: i64,
    keep_version_id: i64,
    end_date: Date,
    now: OffsetDateTime,
) -> Result<Vec<i64>, PersistenceError> {
    let archived: Vec<i64> = diesel::update(versions::table)
        .filter(versions::organization_id.eq(organization_id))
        .filter(versions::status.eq(VersionStatus::Active.as_str()))
        .filter(versions::version_id.ne(keep_version_id))
        .set((
            versions::status.eq(VersionStatus::Archived.as_str()),
            versions::end_date.eq(format_iso_date(end_date)),
            versions::updated_at.eq(format_timestamp(now)?),
        ))
        .returning(versions::version_id)
        .get_results(conn)?;

    debug!(organization_id, ?archived, "Archived active versions");
    Ok(archived)
}

/// Marks a version active unless it already is.
///
/// # Errors
///
/// Returns `UniqueViolation` if another version of the organization is
/// active, or `VersionNotFound` if the version does not exist.
pub fn activate_version(
    conn: &mut SqliteConnection,
    version_id: i64,
    now: OffsetDateTime,
) -> Result<bool, PersistenceError> {
    let rows: usize = diesel::update(versions::table)
        .filter(versions::version_id.eq(version_id))
        .filter(versions::status.ne(VersionStatus::Active.as_str()))
        .set((
            versions::status.eq(VersionStatus::Active.as_str()),
            versions::updated_at.eq(format_timestamp(now)?),
        ))
        .execute(conn)?;

    if rows == 0 && !version_exists(conn, version_id)? {
        return Err(PersistenceError::VersionNotFound(version_id));
    }
    Ok(rows == 1)
}

/// Applies an update to a draft.
///
/// # Errors
///
/// Returns an error if serialization or the database update fails.
pub fn update_draft(
    conn: &mut SqliteConnection,
    version_id: i64,
    update: &VersionUpdate,
    now: OffsetDateTime,
) -> Result<bool, PersistenceError> {
    let reassignments_json: Option<String> = update
        .reassignments
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let changeset: DraftChangeset<'_> = DraftChangeset {
        version_name: update.version_name.as_deref(),
        effective_date: update.effective_date.map(format_iso_date),
        notes: update.notes.as_deref(),
        sk_number: update.sk_number.as_deref(),
        sk_date: update.sk_date.map(format_iso_date),
        reassignments_json,
        updated_at: format_timestamp(now)?,
    };

    let rows: usize = diesel::update(versions::table)
        .filter(versions::version_id.eq(version_id))
        .filter(versions::status.eq(VersionStatus::Draft.as_str()))
        .set(&changeset)
        .execute(conn)?;
    Ok(rows == 1)
}

/// Deletes a draft.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_draft(conn: &mut SqliteConnection, version_id: i64) -> Result<bool, PersistenceError> {
    let rows: usize = diesel::delete(
        versions::table
            .filter(versions::version_id.eq(version_id))
            .filter(versions::status.eq(VersionStatus::Draft.as_str())),
    )
    .execute(conn)?;
    if rows == 1 {
        info!(version_id, "Deleted draft version");
    }
    Ok(rows == 1)
}

/// Records publish status and progress.
///
/// # Errors
///
/// Returns `VersionNotFound` if the version does not exist.
pub fn save_publish_state(
    conn: &mut SqliteConnection,
    version_id: i64,
    status: PublishStatus,
    progress: &PublishProgress,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    let rows: usize = diesel::update(versions::table)
        .filter(versions::version_id.eq(version_id))
        .set((
            versions::publish_status.eq(status.as_str()),
            versions::publish_progress_json.eq(serde_json::to_string(progress)?),
            versions::updated_at.eq(format_timestamp(now)?),
        ))
        .execute(conn)?;
    if rows == 0 {
        return Err(PersistenceError::VersionNotFound(version_id));
    }
    Ok(())
}

/// Swaps in a new snapshot if the revision is unchanged.
///
/// # Errors
///
/// Returns `VersionNotFound` if the version does not exist, or an error if
/// the database update fails.
pub fn replace_structure(
    conn: &mut SqliteConnection,
    version_id: i64,
    expected_revision: i32,
    structure: &Snapshot,
    now: OffsetDateTime,
) -> Result<bool, PersistenceError> {
    let rows: usize = diesel::update(versions::table)
        .filter(versions::version_id.eq(version_id))
        .filter(versions::structure_revision.eq(expected_revision))
        .set((
            versions::structure_json.eq(serde_json::to_string(structure)?),
            versions::structure_revision.eq(expected_revision + 1),
            versions::updated_at.eq(format_timestamp(now)?),
        ))
        .execute(conn)?;

    if rows == 0 && !version_exists(conn, version_id)? {
        return Err(PersistenceError::VersionNotFound(version_id));
    }
    Ok(rows == 1)
}
