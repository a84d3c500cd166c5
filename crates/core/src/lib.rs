// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

//! Versioning engine for organizational structures.
//!
//! Components are short-lived structs borrowing a store:
//!
//! - [`SnapshotBuilder`] captures the live structure of an organization.
//! - [`VersionManager`] creates, edits and reads versions.
//! - [`Publisher`] runs the resumable publish saga.
//! - [`QueryHelper`] answers historical questions from stored snapshots.
//! - [`Corrector`] detects and repairs snapshot defects.

mod corrector;
mod error;
mod manager;
pub mod memory;
mod publisher;
mod query;
mod snapshot_builder;
pub mod store;

#[cfg(test)]
mod tests;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

pub use corrector::{CorrectionReport, Corrector, EmployeeCorrection};
pub use error::{StoreError, VersionError};
pub use manager::{NewVersionRequest, ReassignmentRequest, VersionCreated, VersionManager};
pub use publisher::{
    PublishOutcome, PublishReport, Publisher, assignment_is_current, needs_activation,
    needs_archive,
};
pub use query::{
    EmployeeAssignment, EmployeeHistoryFilter, EmployeeHistoryRecord, QueryHelper,
    UnitTimelineEntry, VersionComparison, VersionStats,
};
pub use snapshot_builder::{SkippedEmployee, SnapshotBuild, SnapshotBuilder};
pub use store::{AuditSink, DirectoryStore, HistoryStore, Store, VersionStore};
