// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `SQLite` persistence for organizational-structure versions.
//!
//! [`Persistence`] implements every collaborator trait of the versioning
//! engine, so the same `VersionManager`, `Publisher` and `Corrector` that
//! run against the in-memory store run against a database file.
//!
//! ## Consistency model
//!
//! Writes are single-statement and commit on their own. Nothing here opens
//! a multi-statement transaction:
//!
//! - at most one active version per organization is a partial unique index
//! - history idempotency is a unique index on
//!   `(employee_id, event_type, version_id)` plus `INSERT OR IGNORE`
//! - snapshot replacement is a compare-and-set on `structure_revision`
//!
//! ## Testing
//!
//! `new_in_memory()` gives every caller its own shared-cache in-memory
//! database, so tests never see each other's rows.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use orgstruct_domain::{Employee, OrgUnit, Position};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod import;
mod mutations;
mod queries;
mod store;

#[cfg(test)]
mod tests;

pub use data_models::Organization;
pub use error::PersistenceError;
pub use import::{DirectoryImport, ImportSummary};

/// Atomic counter for unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A `SQLite`-backed store.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Opens a fresh in-memory database with migrations applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Opens (or creates) a database file with migrations applied and WAL
    /// enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if enforcement is off or the pragma cannot be read.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Directory seeding
    // ========================================================================

    /// # Errors
    ///
    /// Returns `UniqueViolation` if the id or code is taken.
    pub fn create_organization(
        &mut self,
        organization: &Organization,
    ) -> Result<(), PersistenceError> {
        mutations::directory::insert_organization(&mut self.conn, organization)
    }

    /// # Errors
    ///
    /// Returns an error if the insert violates a constraint.
    pub fn insert_org_unit(&mut self, unit: &OrgUnit) -> Result<(), PersistenceError> {
        mutations::directory::insert_org_unit(&mut self.conn, unit)
    }

    /// # Errors
    ///
    /// Returns an error if the insert violates a constraint.
    pub fn insert_position(&mut self, position: &Position) -> Result<(), PersistenceError> {
        mutations::directory::insert_position(&mut self.conn, position)
    }

    /// # Errors
    ///
    /// Returns an error if the insert violates a constraint.
    pub fn insert_employee(&mut self, employee: &Employee) -> Result<(), PersistenceError> {
        mutations::directory::insert_employee(&mut self.conn, employee)
    }

    /// Loads a directory dump.
    ///
    /// # Errors
    ///
    /// Returns an error on the first row that violates a constraint.
    pub fn import_directory(
        &mut self,
        import: &DirectoryImport,
    ) -> Result<ImportSummary, PersistenceError> {
        import::import_directory(&mut self.conn, import)
    }
}
